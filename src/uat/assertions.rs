//! Assertion helpers for test bodies.
//!
//! Each helper returns `HarnessError::Assertion` with a descriptive message
//! when its condition does not hold, so the runner classifies it as FAIL.
//! Collaborator failures (clipboard, `ps`, `log`) propagate unchanged and
//! classify as ERROR.

use std::time::Duration;

use super::context::TestContext;
use crate::desktop::platform::attrs;
use crate::desktop::serializer::truncate_str;
use crate::desktop::types::{AttrValue, MatchCriteria};
use crate::desktop::Node;
use crate::error::{HarnessError, Result};
use crate::host::logs_match;
use crate::wait;

/// Replace an assertion's message while leaving other errors untouched
pub trait AssertionExt<T> {
    fn or_fail_with(self, message: impl Into<String>) -> Result<T>;
}

impl<T> AssertionExt<T> for Result<T> {
    fn or_fail_with(self, message: impl Into<String>) -> Result<T> {
        match self {
            Err(e) if e.is_assertion() => Err(HarnessError::assertion(message)),
            other => other,
        }
    }
}

fn secs(d: Duration) -> String {
    format!("{:.1}", d.as_secs_f64())
}

// ============ Elements ============

pub fn element_exists(ctx: &TestContext, criteria: &MatchCriteria) -> Result<Node> {
    ctx.find(criteria)
        .ok_or_else(|| HarnessError::assertion(format!("Element not found: {criteria}")))
}

pub fn element_not_exists(ctx: &TestContext, criteria: &MatchCriteria) -> Result<()> {
    match ctx.find(criteria) {
        Some(_) => Err(HarnessError::assertion(format!("Element unexpectedly found: {criteria}"))),
        None => Ok(()),
    }
}

pub fn element_appears(ctx: &TestContext, criteria: &MatchCriteria, timeout: Duration) -> Result<Node> {
    let outcome = wait::wait_for_element(ctx.desktop(), ctx.pid, criteria, timeout);
    match outcome.value {
        Some(node) if outcome.success => Ok(node),
        _ => Err(HarnessError::assertion(format!(
            "Element did not appear within {}s: {}",
            secs(timeout),
            criteria
        ))),
    }
}

pub fn element_disappears(ctx: &TestContext, criteria: &MatchCriteria, timeout: Duration) -> Result<()> {
    let outcome = wait::wait_for_element_gone(ctx.desktop(), ctx.pid, criteria, timeout);
    if outcome.success {
        Ok(())
    } else {
        Err(HarnessError::assertion(format!(
            "Element did not disappear within {}s: {}",
            secs(timeout),
            criteria
        )))
    }
}

pub fn element_enabled(ctx: &TestContext, criteria: &MatchCriteria) -> Result<Node> {
    let node = element_exists(ctx, criteria)?;
    if node.enabled() != Some(true) {
        return Err(HarnessError::assertion(format!("Element is not enabled: {criteria}")));
    }
    Ok(node)
}

pub fn element_disabled(ctx: &TestContext, criteria: &MatchCriteria) -> Result<Node> {
    let node = element_exists(ctx, criteria)?;
    if node.enabled() != Some(false) {
        return Err(HarnessError::assertion(format!("Element is not disabled: {criteria}")));
    }
    Ok(node)
}

// ============ Values ============

/// `AXValue` of the matching element reaches `expected` within `timeout`
pub fn value_becomes(
    ctx: &TestContext,
    criteria: &MatchCriteria,
    expected: impl Into<AttrValue>,
    timeout: Duration,
) -> Result<AttrValue> {
    attr_becomes(ctx, criteria, attrs::VALUE, expected.into(), timeout)
}

pub fn attr_becomes(
    ctx: &TestContext,
    criteria: &MatchCriteria,
    attr: &str,
    expected: AttrValue,
    timeout: Duration,
) -> Result<AttrValue> {
    let outcome = wait::wait_for_value(
        ctx.desktop(),
        ctx.pid,
        criteria,
        attr,
        Some(expected.clone()),
        None,
        timeout,
    )?;
    if outcome.success {
        return Ok(outcome.value.unwrap_or_default());
    }
    let actual = outcome.value.unwrap_or_default();
    Err(HarnessError::assertion(format!(
        "Value did not become {} within {}s (stuck at {}) for {}",
        expected,
        secs(timeout),
        actual,
        criteria
    )))
}

/// `AXValue` of the matching element stops being `not_expected` within `timeout`
pub fn value_leaves(
    ctx: &TestContext,
    criteria: &MatchCriteria,
    not_expected: impl Into<AttrValue>,
    timeout: Duration,
) -> Result<AttrValue> {
    let not_expected = not_expected.into();
    let outcome = wait::wait_for_value(
        ctx.desktop(),
        ctx.pid,
        criteria,
        attrs::VALUE,
        None,
        Some(not_expected.clone()),
        timeout,
    )?;
    if outcome.success {
        return Ok(outcome.value.unwrap_or_default());
    }
    Err(HarnessError::assertion(format!(
        "Value did not leave {} within {}s for {}",
        not_expected,
        secs(timeout),
        criteria
    )))
}

// ============ Clipboard ============

pub fn clipboard_contains(ctx: &TestContext, needle: &str) -> Result<()> {
    let text = ctx.clipboard()?;
    if text.is_empty() {
        return Err(HarnessError::assertion("Clipboard is empty"));
    }
    if !text.contains(needle) {
        return Err(HarnessError::assertion(format!(
            "Clipboard does not contain {:?}. Actual: {:?}",
            needle,
            truncate_str(&text, 200)
        )));
    }
    Ok(())
}

pub fn clipboard_empty(ctx: &TestContext) -> Result<()> {
    let text = ctx.clipboard()?;
    if !text.trim().is_empty() {
        return Err(HarnessError::assertion(format!(
            "Clipboard is not empty: {:?}",
            truncate_str(&text, 200)
        )));
    }
    Ok(())
}

// ============ Process ============

pub fn process_running(ctx: &TestContext, app_name: &str) -> Result<()> {
    if ctx.desktop().processes().is_running(app_name) {
        Ok(())
    } else {
        Err(HarnessError::assertion(format!("Process '{app_name}' is not running")))
    }
}

pub fn memory_below(ctx: &TestContext, max_mb: f64) -> Result<f64> {
    let mem = ctx
        .memory_mb()?
        .ok_or_else(|| HarnessError::assertion(format!("Could not read memory for PID {}", ctx.pid)))?;
    if mem > max_mb {
        return Err(HarnessError::assertion(format!(
            "Memory {:.0}MB exceeds limit {:.0}MB",
            mem, max_mb
        )));
    }
    Ok(mem)
}

/// Capture the app's log stream for `duration` and require a line matching `pattern`
pub fn logs_contain(ctx: &TestContext, pattern: &str, duration: Duration) -> Result<()> {
    let lines = ctx.desktop().capture_logs(duration)?;
    if logs_match(&lines, pattern)? {
        Ok(())
    } else {
        Err(HarnessError::assertion(format!(
            "No log line matching {:?} in {} captured line(s)",
            pattern,
            lines.len()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::desktop::platform::fake::{
        FakeAccessor, FakeClipboard, FakeElement, FakeLogs, FakeProcesses, RecordingInput,
    };
    use crate::desktop::Desktop;

    fn desktop(accessor: FakeAccessor) -> Desktop {
        Desktop::new(Config::immediate(), Box::new(accessor), Box::new(RecordingInput::default()))
            .with_processes(FakeProcesses::default().with_process("Demo", 7, 120.0))
            .with_clipboard(FakeClipboard::default())
            .with_logs(FakeLogs::new(&["demo: Pipeline state -> recording"]))
    }

    fn tree() -> FakeElement {
        FakeElement::new("AXApplication").child(
            FakeElement::new("AXWindow")
                .title("Main")
                .child(FakeElement::new("AXButton").title("Record").enabled(true))
                .child(FakeElement::new("AXButton").title("Stop").enabled(false))
                .child(FakeElement::new("AXStaticText").description("status").value("Idle")),
        )
    }

    #[test]
    fn test_element_presence() {
        let desktop = desktop(FakeAccessor::new(tree()));
        let ctx = TestContext::new(&desktop, 7, "Demo", false);
        assert!(element_exists(&ctx, &MatchCriteria::role("AXWindow")).is_ok());

        let err = element_exists(&ctx, &MatchCriteria::role("AXSheet")).unwrap_err();
        assert!(err.is_assertion());
        assert_eq!(err.to_string(), "Element not found: role='AXSheet'");

        let err = element_not_exists(&ctx, &MatchCriteria::role("AXWindow").with_title("Main")).unwrap_err();
        assert_eq!(err.to_string(), "Element unexpectedly found: role='AXWindow', title='Main'");
    }

    #[test]
    fn test_enabled_and_disabled() {
        let desktop = desktop(FakeAccessor::new(tree()));
        let ctx = TestContext::new(&desktop, 7, "Demo", false);
        let record = MatchCriteria::role("AXButton").with_title("Record");
        let stop = MatchCriteria::role("AXButton").with_title("Stop");

        assert!(element_enabled(&ctx, &record).is_ok());
        assert!(element_disabled(&ctx, &stop).is_ok());
        assert!(element_enabled(&ctx, &stop).unwrap_err().is_assertion());
        assert!(element_disabled(&ctx, &record).unwrap_err().is_assertion());
    }

    #[test]
    fn test_value_becomes_across_frames() {
        let status = |v: &str| {
            FakeElement::new("AXApplication")
                .child(FakeElement::new("AXStaticText").description("status").value(v))
        };
        let desktop = desktop(FakeAccessor::frames(vec![status("Idle"), status("Idle"), status("Recording")]));
        let ctx = TestContext::new(&desktop, 7, "Demo", false);
        let criteria = MatchCriteria::role("AXStaticText").with_description("status");

        let value = value_becomes(&ctx, &criteria, "Recording", Duration::from_secs(2)).unwrap();
        assert_eq!(value, AttrValue::text("Recording"));
    }

    #[test]
    fn test_value_stuck_reports_last_value() {
        let desktop = desktop(FakeAccessor::new(tree()));
        let ctx = TestContext::new(&desktop, 7, "Demo", false);
        let criteria = MatchCriteria::role("AXStaticText").with_description("status");

        let err = value_becomes(&ctx, &criteria, "Recording", Duration::from_millis(30)).unwrap_err();
        assert!(err.is_assertion());
        let message = err.to_string();
        assert!(message.starts_with("Value did not become \"Recording\""));
        assert!(message.contains("(stuck at \"Idle\")"));

        let err = value_leaves(&ctx, &criteria, "Idle", Duration::from_millis(30)).unwrap_err();
        assert!(err.to_string().starts_with("Value did not leave \"Idle\""));
    }

    #[test]
    fn test_clipboard_assertions() {
        let desktop = desktop(FakeAccessor::new(tree()));
        let ctx = TestContext::new(&desktop, 7, "Demo", false);
        assert!(clipboard_empty(&ctx).is_ok());
        assert_eq!(clipboard_contains(&ctx, "x").unwrap_err().to_string(), "Clipboard is empty");

        ctx.set_clipboard("hello world").unwrap();
        assert!(clipboard_contains(&ctx, "world").is_ok());
        assert!(clipboard_contains(&ctx, "mars").unwrap_err().is_assertion());
        assert!(clipboard_empty(&ctx).unwrap_err().is_assertion());
    }

    #[test]
    fn test_process_and_memory() {
        let desktop = desktop(FakeAccessor::new(tree()));
        let ctx = TestContext::new(&desktop, 7, "Demo", false);
        assert!(process_running(&ctx, "Demo").is_ok());
        assert_eq!(
            process_running(&ctx, "Other").unwrap_err().to_string(),
            "Process 'Other' is not running"
        );
        assert_eq!(memory_below(&ctx, 500.0).unwrap(), 120.0);
        assert_eq!(
            memory_below(&ctx, 100.0).unwrap_err().to_string(),
            "Memory 120MB exceeds limit 100MB"
        );

        let gone = TestContext::new(&desktop, 99, "Demo", false);
        assert!(memory_below(&gone, 100.0).unwrap_err().to_string().contains("PID 99"));
    }

    #[test]
    fn test_logs_contain() {
        let desktop = desktop(FakeAccessor::new(tree()));
        let ctx = TestContext::new(&desktop, 7, "Demo", false);
        assert!(logs_contain(&ctx, "STATE -> RECORDING", Duration::ZERO).is_ok());
        assert!(logs_contain(&ctx, "transcrib", Duration::ZERO).unwrap_err().is_assertion());
        assert_eq!(logs_contain(&ctx, "[", Duration::ZERO).unwrap_err().kind(), "configuration");
    }

    #[test]
    fn test_or_fail_with_rewords_assertions_only() {
        let reworded: Result<()> = Err(HarnessError::assertion("raw")).or_fail_with("Settings window did not appear");
        assert_eq!(reworded.unwrap_err().to_string(), "Settings window did not appear");

        let untouched: Result<()> = Err(HarnessError::not_found("x")).or_fail_with("nope");
        assert_eq!(untouched.unwrap_err().kind(), "not_found");
    }
}
