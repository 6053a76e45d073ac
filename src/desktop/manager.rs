use std::time::Duration;
use tracing::{info, warn};

use super::input::{EnigoSynthesizer, InputDriver, InputSynthesizer, Modifiers, MouseButton};
use super::platform::{check_accessibility_permissions, create_accessor, Node, TreeAccessor};
use super::serializer::format_element;
use super::types::{MatchCriteria, Point, Snapshot};
use super::walker;
use crate::config::Config;
use crate::error::{HarnessError, Result};
use crate::host::{Clipboard, LogSource, ProcessInspector, SystemClipboard, SystemLogs, SystemProcesses};

/// Desktop automation handle
///
/// Coordinates the accessibility accessor, input synthesis, process lookup,
/// clipboard and log capture under one run configuration. Every CLI command
/// and test body goes through this.
pub struct Desktop {
    config: Config,
    accessor: Box<dyn TreeAccessor>,
    input: InputDriver,
    processes: Box<dyn ProcessInspector>,
    clipboard: Box<dyn Clipboard>,
    logs: Box<dyn LogSource>,
}

impl Desktop {
    /// Desktop over the given accessor and input sink, with system host collaborators
    pub fn new(config: Config, accessor: Box<dyn TreeAccessor>, input: Box<dyn InputSynthesizer>) -> Self {
        let input = InputDriver::new(input, config.input_delay);
        Self {
            config,
            accessor,
            input,
            processes: Box::new(SystemProcesses),
            clipboard: Box::new(SystemClipboard),
            logs: Box::new(SystemLogs),
        }
    }

    /// Desktop backed by the real platform APIs
    pub fn system(config: Config) -> Result<Self> {
        if !check_accessibility_permissions() {
            warn!("Accessibility access is not granted; the tree will look empty");
        }
        let accessor = create_accessor()?;
        let input = EnigoSynthesizer::new()?;
        Ok(Self::new(config, accessor, Box::new(input)))
    }

    pub fn with_processes(mut self, processes: impl ProcessInspector + 'static) -> Self {
        self.processes = Box::new(processes);
        self
    }

    pub fn with_clipboard(mut self, clipboard: impl Clipboard + 'static) -> Self {
        self.clipboard = Box::new(clipboard);
        self
    }

    pub fn with_logs(mut self, logs: impl LogSource + 'static) -> Self {
        self.logs = Box::new(logs);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn input(&self) -> &InputDriver {
        &self.input
    }

    pub fn processes(&self) -> &dyn ProcessInspector {
        self.processes.as_ref()
    }

    pub fn clipboard(&self) -> &dyn Clipboard {
        self.clipboard.as_ref()
    }

    // ============ Tree access ============

    /// Fresh application root; handles from earlier calls may be stale
    pub fn app_root(&self, pid: u32) -> Node {
        self.accessor.application(pid)
    }

    /// First pid of a process named exactly `name`
    pub fn resolve_pid(&self, name: &str) -> Result<u32> {
        self.processes
            .find_pid(name)?
            .ok_or_else(|| HarnessError::not_found(format!("could not find running process '{name}'")))
    }

    pub fn find(&self, pid: u32, criteria: &MatchCriteria) -> Option<Node> {
        walker::find_first(&self.app_root(pid), criteria, self.config.max_depth)
    }

    pub fn find_all(&self, pid: u32, criteria: &MatchCriteria) -> Vec<Node> {
        walker::find_all(&self.app_root(pid), criteria, self.config.max_depth)
    }

    pub fn snapshot(&self, pid: u32) -> Snapshot {
        walker::snapshot(&self.app_root(pid), self.config.max_depth)
    }

    // ============ Input ============

    pub fn click_at(&self, at: Point, button: MouseButton, double: bool) -> Result<()> {
        self.input.click(at, button, double)
    }

    pub fn move_mouse(&self, at: Point) -> Result<()> {
        self.input.move_mouse(at)
    }

    pub fn press_key(&self, name: &str, modifiers: Modifiers) -> Result<()> {
        self.input.press_key(name, modifiers)
    }

    pub fn type_text(&self, text: &str, delay: Option<Duration>) -> Result<usize> {
        self.input.type_text(text, delay)
    }

    /// Find an element and click its center with real pointer events
    pub fn click_element(&self, pid: u32, criteria: &MatchCriteria) -> Result<Point> {
        let node = self
            .find(pid, criteria)
            .ok_or_else(|| HarnessError::not_found(format!("element not found ({criteria})")))?;
        let center = walker::center(&node).ok_or_else(|| {
            HarnessError::not_found(format!("no frame for {}", format_element(&node.info())))
        })?;
        info!("Found element at center ({:.0}, {:.0}), clicking", center.x, center.y);
        self.input.click(center, MouseButton::Left, false)?;
        Ok(center)
    }

    // ============ Host ============

    pub fn capture_logs(&self, duration: Duration) -> Result<Vec<String>> {
        self.logs.capture(&self.config.log_subsystem, "default", duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desktop::platform::fake::{FakeAccessor, FakeElement, FakeProcesses, RecordingInput};

    fn desktop(input: &RecordingInput) -> Desktop {
        let root = FakeElement::new("AXApplication").child(
            FakeElement::new("AXWindow")
                .title("Main")
                .child(FakeElement::new("AXButton").title("Go").frame(10.0, 10.0, 20.0, 20.0))
                .child(FakeElement::new("AXButton").title("Ghost")),
        );
        Desktop::new(Config::immediate(), Box::new(FakeAccessor::new(root)), Box::new(input.clone()))
            .with_processes(FakeProcesses::default().with_process("Demo", 42, 80.0))
    }

    #[test]
    fn test_click_element_clicks_center() {
        let input = RecordingInput::default();
        let desktop = desktop(&input);
        let center = desktop
            .click_element(42, &MatchCriteria::role("AXButton").with_title("Go"))
            .unwrap();
        assert_eq!(center, Point::new(20.0, 20.0));
        assert_eq!(input.events(), ["move 20,20 Left", "down 20,20 Left", "up 20,20 Left"]);
    }

    #[test]
    fn test_click_element_errors() {
        let input = RecordingInput::default();
        let desktop = desktop(&input);
        let missing = desktop.click_element(42, &MatchCriteria::role("AXSlider")).unwrap_err();
        assert_eq!(missing.kind(), "not_found");
        let frameless = desktop
            .click_element(42, &MatchCriteria::any().with_title("Ghost"))
            .unwrap_err();
        assert!(frameless.to_string().contains("no frame"));
        assert!(input.events().is_empty());
    }

    #[test]
    fn test_resolve_pid() {
        let desktop = desktop(&RecordingInput::default());
        assert_eq!(desktop.resolve_pid("Demo").unwrap(), 42);
        let err = desktop.resolve_pid("Other").unwrap_err();
        assert!(err.to_string().contains("'Other'"));
    }
}
