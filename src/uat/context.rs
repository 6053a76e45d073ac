use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;
use std::thread;
use tracing::{debug, info, warn};

use crate::desktop::serializer::truncate_str;
use crate::desktop::types::MatchCriteria;
use crate::desktop::{walker, Desktop, Modifiers, MouseButton, Node};
use crate::error::{HarnessError, Result};

type Cleanup<'a> = Box<dyn FnOnce(&TestContext<'a>) -> Result<()> + 'a>;

/// Per-test state handed to a test body.
///
/// Created fresh for every test and dropped after its cleanups have run.
pub struct TestContext<'a> {
    pub pid: u32,
    pub app_name: String,
    pub verbose: bool,
    desktop: &'a Desktop,
    cleanups: Vec<Cleanup<'a>>,
}

impl<'a> TestContext<'a> {
    pub fn new(desktop: &'a Desktop, pid: u32, app_name: impl Into<String>, verbose: bool) -> Self {
        Self {
            pid,
            app_name: app_name.into(),
            verbose,
            desktop,
            cleanups: Vec::new(),
        }
    }

    pub fn desktop(&self) -> &'a Desktop {
        self.desktop
    }

    /// Progress note, shown at info level when the run is verbose
    pub fn log(&self, message: &str) {
        if self.verbose {
            info!("  [UAT] {}", message);
        } else {
            debug!("  [UAT] {}", message);
        }
    }

    // ============ Cleanup ============

    /// Register an action to run after the body, in reverse registration order
    pub fn on_cleanup(&mut self, action: impl FnOnce(&TestContext<'a>) -> Result<()> + 'a) {
        self.cleanups.push(Box::new(action));
    }

    pub fn pending_cleanups(&self) -> usize {
        self.cleanups.len()
    }

    /// Run every registered cleanup once, newest first. Failures and panics
    /// are logged and do not stop the remaining cleanups.
    pub fn run_cleanup(&mut self) {
        let cleanups = mem::take(&mut self.cleanups);
        for (i, action) in cleanups.into_iter().enumerate().rev() {
            match panic::catch_unwind(AssertUnwindSafe(|| action(self))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("  [CLEANUP ERROR] #{}: {}", i, e),
                Err(_) => warn!("  [CLEANUP ERROR] #{}: cleanup panicked", i),
            }
        }
    }

    // ============ Tree ============

    pub fn app_root(&self) -> Node {
        self.desktop.app_root(self.pid)
    }

    pub fn find(&self, criteria: &MatchCriteria) -> Option<Node> {
        self.desktop.find(self.pid, criteria)
    }

    pub fn find_all(&self, criteria: &MatchCriteria) -> Vec<Node> {
        self.desktop.find_all(self.pid, criteria)
    }

    // ============ Input ============

    pub fn press(&self, key: &str, modifiers: Modifiers) -> Result<()> {
        self.log(&format!("Pressing {}{}", modifiers.label(), key));
        self.desktop.press_key(key, modifiers)
    }

    /// Find an element and click its center with real pointer events
    pub fn click_element(&self, criteria: &MatchCriteria) -> Result<()> {
        let node = self.find(criteria).ok_or_else(|| {
            HarnessError::assertion(format!("Cannot click: element not found ({criteria})"))
        })?;
        let center = walker::center(&node).ok_or_else(|| {
            HarnessError::assertion(format!("Cannot click: no center coords ({criteria})"))
        })?;
        self.log(&format!("Clicking {} at ({:.0}, {:.0})", criteria, center.x, center.y));
        self.desktop.click_at(center, MouseButton::Left, false)
    }

    /// Fixed settle wait, scaled by the configured settle factor
    pub fn wait(&self, duration: Duration) {
        let scaled = duration.mul_f64(self.desktop.config().settle_scale.max(0.0));
        if !scaled.is_zero() {
            self.log(&format!("Waiting {:.1}s", scaled.as_secs_f64()));
            thread::sleep(scaled);
        }
    }

    // ============ Host ============

    pub fn set_clipboard(&self, text: &str) -> Result<()> {
        self.desktop.clipboard().write(text)?;
        self.log(&format!("Set clipboard to: {:?}", truncate_str(text, 50)));
        Ok(())
    }

    pub fn clear_clipboard(&self) -> Result<()> {
        self.desktop.clipboard().write("")?;
        self.log("Cleared clipboard");
        Ok(())
    }

    pub fn clipboard(&self) -> Result<String> {
        self.desktop.clipboard().read()
    }

    pub fn memory_mb(&self) -> Result<Option<f64>> {
        self.desktop.processes().memory_mb(self.pid)
    }

    pub fn cpu_percent(&self) -> Result<Option<f64>> {
        self.desktop.processes().cpu_percent(self.pid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::desktop::platform::fake::{FakeAccessor, FakeClipboard, FakeElement, RecordingInput};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn desktop() -> Desktop {
        Desktop::new(
            Config::immediate(),
            Box::new(FakeAccessor::new(FakeElement::new("AXApplication"))),
            Box::new(RecordingInput::default()),
        )
        .with_clipboard(FakeClipboard::default())
    }

    #[test]
    fn test_cleanups_run_lifo_and_survive_failures() {
        let desktop = desktop();
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut ctx = TestContext::new(&desktop, 1, "Demo", false);

        let o = Rc::clone(&order);
        ctx.on_cleanup(move |_| {
            o.borrow_mut().push("c1");
            Ok(())
        });
        let o = Rc::clone(&order);
        ctx.on_cleanup(move |_| {
            o.borrow_mut().push("c2");
            Err(HarnessError::assertion("c2 failed"))
        });
        let o = Rc::clone(&order);
        ctx.on_cleanup(move |_| {
            o.borrow_mut().push("c3");
            Ok(())
        });

        ctx.run_cleanup();
        assert_eq!(order.borrow().as_slice(), ["c3", "c2", "c1"]);
        assert_eq!(ctx.pending_cleanups(), 0);

        ctx.run_cleanup();
        assert_eq!(order.borrow().len(), 3);
    }

    #[test]
    fn test_cleanup_panic_is_contained() {
        let desktop = desktop();
        let ran = Rc::new(RefCell::new(false));
        let mut ctx = TestContext::new(&desktop, 1, "Demo", false);

        let r = Rc::clone(&ran);
        ctx.on_cleanup(move |_| {
            *r.borrow_mut() = true;
            Ok(())
        });
        ctx.on_cleanup(|_| panic!("boom"));

        ctx.run_cleanup();
        assert!(*ran.borrow());
    }

    #[test]
    fn test_click_missing_element_is_assertion() {
        let desktop = desktop();
        let ctx = TestContext::new(&desktop, 1, "Demo", false);
        let err = ctx.click_element(&MatchCriteria::role("AXButton")).unwrap_err();
        assert!(err.is_assertion());
        assert_eq!(err.to_string(), "Cannot click: element not found (role='AXButton')");
    }

    #[test]
    fn test_clipboard_helpers() {
        let desktop = desktop();
        let ctx = TestContext::new(&desktop, 1, "Demo", false);
        ctx.set_clipboard("sentinel").unwrap();
        assert_eq!(ctx.clipboard().unwrap(), "sentinel");
        ctx.clear_clipboard().unwrap();
        assert_eq!(ctx.clipboard().unwrap(), "");
    }
}
