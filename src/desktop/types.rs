use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Screen coordinates of an element's top-left corner
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Element extent in points
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub w: f64,
    pub h: f64,
}

impl Size {
    pub fn new(w: f64, h: f64) -> Self {
        Self { w, h }
    }
}

/// Bounding rectangle in screen coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn from_parts(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.w, size.h)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Value of an accessibility attribute.
///
/// The platform hands back loosely typed values; everything the harness does
/// not model explicitly lands in `Unsupported` with a short description.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum AttrValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Point(Point),
    Size(Size),
    Unsupported(String),
}

impl AttrValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_point(&self) -> Option<Point> {
        match self {
            Self::Point(p) => Some(*p),
            _ => None,
        }
    }

    pub fn as_size(&self) -> Option<Size> {
        match self {
            Self::Size(s) => Some(*s),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::{json, Value};
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(n) => json!(n),
            Self::Text(s) => Value::String(s.clone()),
            Self::Point(p) => json!({ "x": p.x, "y": p.y }),
            Self::Size(s) => json!({ "w": s.w, "h": s.h }),
            Self::Unsupported(desc) => Value::String(desc.clone()),
        }
    }

    pub fn from_json(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => n.as_f64().map(Self::Number).unwrap_or_default(),
            Value::String(s) => Self::Text(s),
            Value::Object(ref map) => {
                let num = |key: &str| map.get(key).and_then(Value::as_f64);
                if let (Some(x), Some(y)) = (num("x"), num("y")) {
                    Self::Point(Point::new(x, y))
                } else if let (Some(w), Some(h)) = (num("w"), num("h")) {
                    Self::Size(Size::new(w, h))
                } else {
                    Self::Unsupported(value.to_string())
                }
            }
            Value::Array(_) => Self::Unsupported(value.to_string()),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl Serialize for AttrValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AttrValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Self::from_json)
    }
}

/// Partial-field filter used to locate elements.
///
/// Every field that is set must equal the element's attribute exactly; a
/// criteria with nothing set matches every element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCriteria {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl MatchCriteria {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn role(role: impl Into<String>) -> Self {
        Self {
            role: Some(role.into()),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl fmt::Display for MatchCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = [
            ("role", &self.role),
            ("title", &self.title),
            ("description", &self.description),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_ref().map(|v| format!("{name}='{v}'")))
        .collect();

        if parts.is_empty() {
            write!(f, "(no criteria)")
        } else {
            write!(f, "{}", parts.join(", "))
        }
    }
}

/// Attribute values of one element, read at a single instant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementInfo {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub subrole: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub value: AttrValue,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub role_description: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub focused: Option<bool>,
    #[serde(default)]
    pub position: Option<Point>,
    #[serde(default)]
    pub size: Option<Size>,
    #[serde(default)]
    pub actions: Vec<String>,
}

impl ElementInfo {
    pub fn bounds(&self) -> Option<Rect> {
        Some(Rect::from_parts(self.position?, self.size?))
    }

    pub fn center(&self) -> Option<Point> {
        self.bounds().map(|b| b.center())
    }
}

/// Immutable capture of a subtree; child order is the accessor's order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(flatten)]
    pub info: ElementInfo,
    #[serde(default)]
    pub children: Vec<Snapshot>,
}

impl Snapshot {
    /// Number of nodes in this subtree, including itself
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Snapshot::node_count).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_center() {
        let rect = Rect::new(100.0, 200.0, 50.0, 30.0);
        assert_eq!(rect.center(), Point::new(125.0, 215.0));
    }

    #[test]
    fn test_attr_value_json_shapes() {
        assert_eq!(AttrValue::Point(Point::new(1.0, 2.0)).to_json(), serde_json::json!({"x": 1.0, "y": 2.0}));
        assert_eq!(
            AttrValue::from_json(serde_json::json!({"w": 10.0, "h": 4.0})),
            AttrValue::Size(Size::new(10.0, 4.0))
        );
        assert_eq!(
            AttrValue::from_json(serde_json::json!([1, 2])),
            AttrValue::Unsupported("[1,2]".to_string())
        );
        assert_eq!(AttrValue::from("Idle").to_string(), "\"Idle\"");
    }

    #[test]
    fn test_criteria_display() {
        assert_eq!(MatchCriteria::any().to_string(), "(no criteria)");
        let criteria = MatchCriteria::role("AXButton").with_title("OK");
        assert_eq!(criteria.to_string(), "role='AXButton', title='OK'");
    }

    #[test]
    fn test_snapshot_json_roundtrip_keeps_children_order() {
        let json = serde_json::json!({
            "role": "AXWindow",
            "title": "Main",
            "enabled": true,
            "position": {"x": 0.0, "y": 0.0},
            "children": [
                {"role": "AXButton", "title": "A", "children": []},
                {"role": "AXButton", "title": "B"}
            ]
        });
        let snapshot: Snapshot = serde_json::from_value(json).unwrap();
        assert_eq!(snapshot.node_count(), 3);
        assert_eq!(snapshot.children[1].info.title.as_deref(), Some("B"));
        assert_eq!(snapshot.info.value, AttrValue::Null);

        let back: Snapshot = serde_json::from_str(&serde_json::to_string(&snapshot).unwrap()).unwrap();
        assert_eq!(back, snapshot);
    }
}
