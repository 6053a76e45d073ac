//! In-memory stand-ins for the desktop: accessibility tree, input sink,
//! processes, clipboard and logs.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use super::{attrs, Element, Node, TreeAccessor};
use crate::desktop::input::{InputSynthesizer, Modifiers, MouseButton, PointerKind};
use crate::desktop::types::{AttrValue, Point, Size};
use crate::error::Result;
use crate::host::{Clipboard, LogSource, ProcessInspector};

/// Shared record of performed actions, as `"<element> <action>"` entries
pub type ActionLog = Rc<RefCell<Vec<String>>>;

/// Builder for a fixed element; becomes a [`Node`] via [`FakeElement::into_node`]
#[derive(Clone, Default)]
pub struct FakeElement {
    attributes: HashMap<String, AttrValue>,
    children: Vec<Node>,
    satellites: HashMap<String, Node>,
    actions: Vec<String>,
    log: Option<ActionLog>,
}

impl FakeElement {
    pub fn new(role: &str) -> Self {
        Self::default().attr(attrs::ROLE, role)
    }

    pub fn attr(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    pub fn title(self, title: &str) -> Self {
        self.attr(attrs::TITLE, title)
    }

    pub fn description(self, description: &str) -> Self {
        self.attr(attrs::DESCRIPTION, description)
    }

    pub fn value(self, value: impl Into<AttrValue>) -> Self {
        self.attr(attrs::VALUE, value)
    }

    pub fn enabled(self, enabled: bool) -> Self {
        self.attr(attrs::ENABLED, enabled)
    }

    pub fn frame(self, x: f64, y: f64, w: f64, h: f64) -> Self {
        self.attr(attrs::POSITION, AttrValue::Point(Point::new(x, y)))
            .attr(attrs::SIZE, AttrValue::Size(Size::new(w, h)))
    }

    pub fn action(mut self, name: &str) -> Self {
        self.actions.push(name.to_string());
        self
    }

    pub fn pressable(self) -> Self {
        self.action(attrs::ACTION_PRESS)
    }

    pub fn child(mut self, child: FakeElement) -> Self {
        self.children.push(child.into_node());
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = FakeElement>) -> Self {
        self.children
            .extend(children.into_iter().map(FakeElement::into_node));
        self
    }

    /// Element-valued attribute, e.g. `AXExtrasMenuBar`
    pub fn satellite(mut self, name: &str, element: FakeElement) -> Self {
        self.satellites.insert(name.to_string(), element.into_node());
        self
    }

    pub fn logging_to(mut self, log: &ActionLog) -> Self {
        self.log = Some(Rc::clone(log));
        self
    }

    pub fn into_node(self) -> Node {
        Node::new(self)
    }

    fn label(&self) -> String {
        let text = |name: &str| {
            self.attributes
                .get(name)
                .and_then(AttrValue::as_str)
                .map(str::to_string)
        };
        text(attrs::TITLE)
            .filter(|t| !t.is_empty())
            .or_else(|| text(attrs::ROLE))
            .unwrap_or_default()
    }
}

impl Element for FakeElement {
    fn attribute(&self, name: &str) -> Option<AttrValue> {
        self.attributes.get(name).cloned()
    }

    fn children(&self) -> Vec<Node> {
        self.children.clone()
    }

    fn element_attribute(&self, name: &str) -> Option<Node> {
        self.satellites.get(name).cloned()
    }

    fn action_names(&self) -> Vec<String> {
        self.actions.clone()
    }

    fn perform_action(&self, name: &str) -> bool {
        if !self.actions.iter().any(|a| a == name) {
            return false;
        }
        if let Some(log) = &self.log {
            log.borrow_mut().push(format!("{} {}", self.label(), name));
        }
        true
    }
}

/// Accessor that hands out one frame per `application` call.
///
/// The last frame repeats once the sequence is exhausted, so a single frame
/// behaves like a static tree and several frames model a UI that changes
/// between polls.
#[derive(Default)]
pub struct FakeAccessor {
    frames: Vec<Node>,
    cursor: Cell<usize>,
    requested: RefCell<Vec<u32>>,
}

impl FakeAccessor {
    pub fn new(root: FakeElement) -> Self {
        Self::frames(vec![root])
    }

    pub fn frames(frames: Vec<FakeElement>) -> Self {
        Self {
            frames: frames.into_iter().map(FakeElement::into_node).collect(),
            ..Self::default()
        }
    }

    /// Pids passed to `application`, in call order
    pub fn requested_pids(&self) -> Vec<u32> {
        self.requested.borrow().clone()
    }
}

impl TreeAccessor for FakeAccessor {
    fn application(&self, pid: u32) -> Node {
        self.requested.borrow_mut().push(pid);
        let index = self.cursor.get();
        self.cursor.set(index + 1);
        match self.frames.get(index).or_else(|| self.frames.last()) {
            Some(frame) => frame.clone(),
            None => FakeElement::default().into_node(),
        }
    }
}

/// Input sink that records events as short strings instead of posting them
#[derive(Clone, Default)]
pub struct RecordingInput {
    events: Rc<RefCell<Vec<String>>>,
}

impl RecordingInput {
    pub fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }
}

impl InputSynthesizer for RecordingInput {
    fn post_pointer(&self, kind: PointerKind, at: Point, button: MouseButton) -> Result<()> {
        let kind = match kind {
            PointerKind::Move => "move",
            PointerKind::Down => "down",
            PointerKind::Up => "up",
        };
        self.events
            .borrow_mut()
            .push(format!("{} {},{} {:?}", kind, at.x, at.y, button));
        Ok(())
    }

    fn post_key(&self, keycode: u16, down: bool, modifiers: Modifiers) -> Result<()> {
        let state = if down { "down" } else { "up" };
        self.events
            .borrow_mut()
            .push(format!("key {} {} {}", keycode, state, modifiers.label()));
        Ok(())
    }
}

/// Fixed process table
#[derive(Clone, Default)]
pub struct FakeProcesses {
    pids: HashMap<String, u32>,
    memory_mb: HashMap<u32, f64>,
}

impl FakeProcesses {
    pub fn with_process(mut self, name: &str, pid: u32, memory_mb: f64) -> Self {
        self.pids.insert(name.to_string(), pid);
        self.memory_mb.insert(pid, memory_mb);
        self
    }
}

impl ProcessInspector for FakeProcesses {
    fn find_pid(&self, name: &str) -> Result<Option<u32>> {
        Ok(self.pids.get(name).copied())
    }

    fn memory_mb(&self, pid: u32) -> Result<Option<f64>> {
        Ok(self.memory_mb.get(&pid).copied())
    }

    fn cpu_percent(&self, pid: u32) -> Result<Option<f64>> {
        Ok(self.memory_mb.contains_key(&pid).then_some(0.0))
    }
}

/// Shared in-memory pasteboard; clones see the same contents
#[derive(Clone, Default)]
pub struct FakeClipboard {
    text: Rc<RefCell<String>>,
}

impl FakeClipboard {
    pub fn contents(&self) -> String {
        self.text.borrow().clone()
    }
}

impl Clipboard for FakeClipboard {
    fn read(&self) -> Result<String> {
        Ok(self.contents())
    }

    fn write(&self, text: &str) -> Result<()> {
        *self.text.borrow_mut() = text.to_string();
        Ok(())
    }
}

/// Log source returning canned lines
#[derive(Clone, Default)]
pub struct FakeLogs {
    lines: Vec<String>,
}

impl FakeLogs {
    pub fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|l| l.to_string()).collect(),
        }
    }
}

impl LogSource for FakeLogs {
    fn capture(&self, _subsystem: &str, _level: &str, _duration: Duration) -> Result<Vec<String>> {
        Ok(self.lines.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_advance_then_repeat() {
        let accessor = FakeAccessor::frames(vec![
            FakeElement::new("AXApplication").title("first"),
            FakeElement::new("AXApplication").title("second"),
        ]);
        assert_eq!(accessor.application(7).title().as_deref(), Some("first"));
        assert_eq!(accessor.application(7).title().as_deref(), Some("second"));
        assert_eq!(accessor.application(7).title().as_deref(), Some("second"));
        assert_eq!(accessor.requested_pids(), vec![7, 7, 7]);
    }

    #[test]
    fn test_actions_are_logged() {
        let log = ActionLog::default();
        let node = FakeElement::new("AXMenuItem")
            .title("Settings...")
            .pressable()
            .logging_to(&log)
            .into_node();

        assert!(node.perform_action("AXPress"));
        assert!(!node.perform_action("AXCancel"));
        assert_eq!(log.borrow().as_slice(), ["Settings... AXPress"]);
    }

    #[test]
    fn test_empty_accessor_yields_blank_root() {
        let root = FakeAccessor::default().application(1);
        assert!(root.role().is_none());
        assert!(root.children().is_empty());
    }

    #[test]
    fn test_clipboard_clones_share_contents() {
        let clipboard = FakeClipboard::default();
        let handle = clipboard.clone();
        clipboard.write("hello").unwrap();
        assert_eq!(handle.read().unwrap(), "hello");
    }
}
