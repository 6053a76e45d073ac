use serde::Serialize;

use super::platform::Node;
use super::types::{AttrValue, ElementInfo, Point};

/// One search hit: the element's attributes plus its center, if known
#[derive(Debug, Clone, Serialize)]
pub struct FoundElement {
    #[serde(flatten)]
    pub info: ElementInfo,
    pub center: Option<Point>,
}

impl FoundElement {
    pub fn from_node(node: &Node) -> Self {
        let info = node.info();
        let center = info.center();
        Self { info, center }
    }
}

/// Format an element for log lines
///
/// Example output:
/// ```text
/// AXButton "Start Recording" value="Idle" [disabled]
/// ```
pub fn format_element(info: &ElementInfo) -> String {
    let mut parts = Vec::new();

    parts.push(info.role.clone().unwrap_or_else(|| "?".to_string()));

    if let Some(ref title) = info.title {
        if !title.is_empty() {
            parts.push(format!("\"{}\"", truncate_str(title, 40)));
        }
    }

    if let AttrValue::Text(ref value) = info.value {
        if !value.is_empty() {
            parts.push(format!("value=\"{}\"", truncate_str(value, 30)));
        }
    }

    if let Some(ref description) = info.description {
        if !description.is_empty() {
            parts.push(format!("- {}", truncate_str(description, 50)));
        }
    }

    if info.enabled == Some(false) {
        parts.push("[disabled]".to_string());
    }

    parts.join(" ")
}

/// Truncate to `max_len` characters, appending "..." when cut
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}
