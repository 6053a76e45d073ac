use std::fmt;
use std::rc::Rc;

use super::types::{AttrValue, ElementInfo, MatchCriteria, Point, Size};
use crate::error::{HarnessError, Result};

#[cfg(target_os = "macos")]
pub mod macos;

pub mod fake;

/// Accessibility attribute and action names used across the harness
pub mod attrs {
    pub const ROLE: &str = "AXRole";
    pub const SUBROLE: &str = "AXSubrole";
    pub const TITLE: &str = "AXTitle";
    pub const VALUE: &str = "AXValue";
    pub const DESCRIPTION: &str = "AXDescription";
    pub const ROLE_DESCRIPTION: &str = "AXRoleDescription";
    pub const ENABLED: &str = "AXEnabled";
    pub const FOCUSED: &str = "AXFocused";
    pub const POSITION: &str = "AXPosition";
    pub const SIZE: &str = "AXSize";
    pub const CHILDREN: &str = "AXChildren";
    pub const MENU_BAR: &str = "AXMenuBar";
    pub const EXTRAS_MENU_BAR: &str = "AXExtrasMenuBar";

    pub const ROLE_APPLICATION: &str = "AXApplication";
    pub const ROLE_WINDOW: &str = "AXWindow";
    pub const ROLE_MENU_ITEM: &str = "AXMenuItem";

    pub const ACTION_PRESS: &str = "AXPress";
}

/// Capability set of one node in an accessibility tree.
///
/// Every query is live. Platform errors collapse to "absent": `None`, an
/// empty list or `false`. A handle whose element has gone away must keep
/// answering that way instead of panicking.
pub trait Element {
    fn attribute(&self, name: &str) -> Option<AttrValue>;

    /// Children in platform order
    fn children(&self) -> Vec<Node>;

    /// Attribute whose value is itself an element (menu bars, focused window)
    fn element_attribute(&self, name: &str) -> Option<Node>;

    fn action_names(&self) -> Vec<String>;

    /// Returns true iff the platform accepted the action
    fn perform_action(&self, name: &str) -> bool;
}

/// Cloneable handle to a live element
#[derive(Clone)]
pub struct Node(Rc<dyn Element>);

impl Node {
    pub fn new(element: impl Element + 'static) -> Self {
        Self(Rc::new(element))
    }

    pub fn attribute(&self, name: &str) -> Option<AttrValue> {
        self.0.attribute(name)
    }

    pub fn children(&self) -> Vec<Node> {
        self.0.children()
    }

    pub fn element_attribute(&self, name: &str) -> Option<Node> {
        self.0.element_attribute(name)
    }

    pub fn action_names(&self) -> Vec<String> {
        self.0.action_names()
    }

    pub fn perform_action(&self, name: &str) -> bool {
        self.0.perform_action(name)
    }

    fn text(&self, name: &str) -> Option<String> {
        match self.attribute(name)? {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }

    fn flag(&self, name: &str) -> Option<bool> {
        self.attribute(name)?.as_bool()
    }

    pub fn role(&self) -> Option<String> {
        self.text(attrs::ROLE)
    }

    pub fn title(&self) -> Option<String> {
        self.text(attrs::TITLE)
    }

    pub fn description(&self) -> Option<String> {
        self.text(attrs::DESCRIPTION)
    }

    pub fn value(&self) -> AttrValue {
        self.attribute(attrs::VALUE).unwrap_or_default()
    }

    pub fn enabled(&self) -> Option<bool> {
        self.flag(attrs::ENABLED)
    }

    pub fn position(&self) -> Option<Point> {
        self.attribute(attrs::POSITION)?.as_point()
    }

    pub fn size(&self) -> Option<Size> {
        self.attribute(attrs::SIZE)?.as_size()
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.role().as_deref() == Some(role)
    }

    /// Read the full attribute set at this instant
    pub fn info(&self) -> ElementInfo {
        ElementInfo {
            role: self.role(),
            subrole: self.text(attrs::SUBROLE),
            title: self.title(),
            value: self.value(),
            description: self.description(),
            role_description: self.text(attrs::ROLE_DESCRIPTION),
            enabled: self.enabled(),
            focused: self.flag(attrs::FOCUSED),
            position: self.position(),
            size: self.size(),
            actions: self.action_names(),
        }
    }

    pub fn matches(&self, criteria: &MatchCriteria) -> bool {
        let field_ok = |expected: &Option<String>, attr: &str| match expected {
            Some(want) => self.text(attr).as_deref() == Some(want.as_str()),
            None => true,
        };
        field_ok(&criteria.role, attrs::ROLE)
            && field_ok(&criteria.title, attrs::TITLE)
            && field_ok(&criteria.description, attrs::DESCRIPTION)
    }

    /// Press via `AXPress`, failing when the element refuses it
    pub fn press(&self) -> Result<()> {
        if self.perform_action(attrs::ACTION_PRESS) {
            Ok(())
        } else {
            Err(HarnessError::Internal(anyhow::anyhow!(
                "{} rejected {}",
                self,
                attrs::ACTION_PRESS
            )))
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let role = self.role().unwrap_or_else(|| "?".to_string());
        match self.title() {
            Some(title) if !title.is_empty() => write!(f, "{role} '{title}'"),
            _ => write!(f, "{role}"),
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({self})")
    }
}

/// Source of application roots
pub trait TreeAccessor {
    /// Root element of the application with this pid. Never fails; a
    /// missing process yields a root that answers "absent" everywhere.
    fn application(&self, pid: u32) -> Node;
}

impl<T: TreeAccessor + ?Sized> TreeAccessor for Rc<T> {
    fn application(&self, pid: u32) -> Node {
        (**self).application(pid)
    }
}

/// Create the platform accessibility accessor
pub fn create_accessor() -> Result<Box<dyn TreeAccessor>> {
    #[cfg(target_os = "macos")]
    {
        Ok(Box::new(macos::MacAccessor::new()))
    }

    #[cfg(not(target_os = "macos"))]
    {
        Err(HarnessError::Unsupported(
            "accessibility tree access requires macOS".to_string(),
        ))
    }
}

/// Whether this process is trusted to read other apps' accessibility trees
pub fn check_accessibility_permissions() -> bool {
    #[cfg(target_os = "macos")]
    {
        macos::is_process_trusted()
    }

    #[cfg(not(target_os = "macos"))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::fake::FakeElement;
    use super::*;

    #[test]
    fn test_node_info_reads_all_attributes() {
        let node = FakeElement::new("AXButton")
            .title("Record")
            .description("start")
            .enabled(true)
            .frame(10.0, 20.0, 100.0, 40.0)
            .action("AXPress")
            .into_node();

        let info = node.info();
        assert_eq!(info.role.as_deref(), Some("AXButton"));
        assert_eq!(info.title.as_deref(), Some("Record"));
        assert_eq!(info.enabled, Some(true));
        assert_eq!(info.center(), Some(Point::new(60.0, 40.0)));
        assert_eq!(info.actions, vec!["AXPress".to_string()]);
        assert_eq!(node.to_string(), "AXButton 'Record'");
    }

    #[test]
    fn test_matches_requires_every_present_field() {
        let node = FakeElement::new("AXButton").title("OK").into_node();
        assert!(node.matches(&MatchCriteria::any()));
        assert!(node.matches(&MatchCriteria::role("AXButton").with_title("OK")));
        assert!(!node.matches(&MatchCriteria::role("AXButton").with_title("Cancel")));
        assert!(!node.matches(&MatchCriteria::role("AXButton").with_description("x")));
    }

    #[test]
    fn test_press_reports_rejection() {
        let node = FakeElement::new("AXStaticText").into_node();
        assert!(node.press().is_err());
    }
}
