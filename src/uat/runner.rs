use std::any::Any;
use std::error::Error as _;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use super::context::TestContext;
use super::registry::{Selection, TestRegistry};
use super::report::{TestResult, TestStatus};
use crate::desktop::Desktop;
use crate::error::{HarnessError, Result};

/// Executes registered tests one at a time against a single app process.
pub struct Runner<'a> {
    registry: &'a TestRegistry,
    desktop: &'a Desktop,
    verbose: bool,
}

impl<'a> Runner<'a> {
    pub fn new(registry: &'a TestRegistry, desktop: &'a Desktop) -> Self {
        Self {
            registry,
            desktop,
            verbose: false,
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn run_selection(&self, selection: &Selection) -> Result<Vec<TestResult>> {
        let names = self.registry.select(selection)?;
        Ok(self.run(&names))
    }

    /// Run `names` in order.
    ///
    /// The target process is resolved once up front; when that fails the run
    /// yields a single `setup` ERROR and nothing executes.
    pub fn run(&self, names: &[String]) -> Vec<TestResult> {
        let app_name = self.desktop.config().app_name.clone();
        let pid = match self.desktop.resolve_pid(&app_name) {
            Ok(pid) => pid,
            Err(e) => {
                error!("{} is not running. Launch it first. ({})", app_name, e);
                return vec![TestResult::new(
                    "setup",
                    TestStatus::Error,
                    format!("{app_name} not running"),
                    Duration::ZERO,
                )];
            }
        };
        info!("Running {} test(s) against {} (pid {})", names.len(), app_name, pid);

        names
            .iter()
            .map(|name| self.run_one(name, pid, &app_name))
            .collect()
    }

    fn run_one(&self, name: &str, pid: u32, app_name: &str) -> TestResult {
        let Some(case) = self.registry.get(name) else {
            debug!("{}: PENDING -> SKIP", name);
            return TestResult::new(name, TestStatus::Skip, format!("Unknown test: {name}"), Duration::ZERO);
        };

        if self.verbose {
            info!("{}", "=".repeat(60));
            info!("  Running: {}", name);
            info!("{}", "=".repeat(60));
        }
        debug!("{}: PENDING -> RUNNING", name);

        let mut ctx = TestContext::new(self.desktop, pid, app_name, self.verbose);
        let start = Instant::now();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| case.run(&mut ctx)));
        let elapsed = start.elapsed();

        let result = match outcome {
            Ok(Ok(())) => TestResult::new(name, TestStatus::Pass, "", elapsed),
            Ok(Err(e)) if e.is_assertion() => TestResult::new(name, TestStatus::Fail, e.to_string(), elapsed),
            Ok(Err(e)) => TestResult::new(name, TestStatus::Error, e.to_string(), elapsed)
                .with_details(serde_json::json!({ "trace": error_trace(&e) })),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                TestResult::new(name, TestStatus::Error, message.clone(), elapsed)
                    .with_details(serde_json::json!({ "trace": format!("panicked: {message}") }))
            }
        };

        let summary = if result.message.is_empty() {
            format!("{} ({:.1}s)", result.status, elapsed.as_secs_f64())
        } else {
            format!("{} ({:.1}s): {}", result.status, elapsed.as_secs_f64(), result.message)
        };
        if self.verbose {
            info!("  {}", summary);
        }
        debug!("{}: RUNNING -> {}", name, result.status);

        ctx.run_cleanup();
        debug!("{}: {} -> CLEANED_UP", name, result.status);
        result
    }
}

/// Error message followed by its source chain, one cause per line
fn error_trace(err: &HarnessError) -> String {
    let mut trace = format!("{}: {}", err.kind(), err);
    let mut source = err.source();
    while let Some(cause) = source {
        trace.push_str(&format!("\ncaused by: {cause}"));
        source = cause.source();
    }
    trace
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "test panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::desktop::platform::fake::{FakeAccessor, FakeElement, FakeProcesses, RecordingInput};

    #[test]
    fn test_setup_error_when_app_missing() {
        let desktop = Desktop::new(
            Config::immediate(),
            Box::new(FakeAccessor::new(FakeElement::new("AXApplication"))),
            Box::new(RecordingInput::default()),
        )
        .with_processes(FakeProcesses::default());

        let mut registry = TestRegistry::new();
        registry.register("t1", "s1", |_| Ok(())).unwrap();

        let results = Runner::new(&registry, &desktop).run(&["t1".to_string()]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "setup");
        assert_eq!(results[0].status, TestStatus::Error);
        assert_eq!(results[0].message, format!("{} not running", Config::immediate().app_name));
    }

    #[test]
    fn test_error_trace_includes_sources() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "pbpaste missing");
        let trace = error_trace(&HarnessError::Io(io));
        assert!(trace.starts_with("io: I/O error: pbpaste missing"));
    }

    #[test]
    fn test_panic_message_variants() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42_u8), "test panicked");
    }
}
