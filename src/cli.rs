//! Shared plumbing for the command-line tools: tracing setup, target
//! resolution, and the JSON output contract (stdout carries JSON, stderr
//! carries diagnostics, exit code 1 on any failure).

use clap::Args;
use serde::Serialize;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::desktop::Desktop;
use crate::error::{HarnessError, Result};

/// Install the stderr subscriber. `RUST_LOG` wins; otherwise `info`, or
/// `debug` when verbose.
pub fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

/// `.env` then `UAT_*` variables
pub fn load_config() -> Config {
    dotenvy::dotenv().ok();
    Config::from_env()
}

/// Which process a command targets
#[derive(Debug, Clone, Default, Args)]
pub struct TargetArgs {
    /// Process name to attach to (defaults to UAT_APP_NAME)
    #[arg(long, global = true)]
    pub app: Option<String>,
    /// Attach to this pid directly
    #[arg(long, global = true, conflicts_with = "app")]
    pub pid: Option<u32>,
}

impl TargetArgs {
    pub fn resolve(&self, desktop: &Desktop) -> Result<u32> {
        if let Some(pid) = self.pid {
            return Ok(pid);
        }
        let name = self.app.as_deref().unwrap_or(&desktop.config().app_name);
        let pid = desktop.resolve_pid(name)?;
        info!("Found {} with PID {}", name, pid);
        Ok(pid)
    }
}

/// Seconds given on the command line; negatives clamp to zero
pub fn seconds(value: f64, flag: &str) -> Result<Duration> {
    Duration::try_from_secs_f64(value.max(0.0))
        .map_err(|e| HarnessError::configuration(format!("invalid {flag} {value}: {e}")))
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print the JSON error envelope on stdout and return exit code 1
pub fn report_error(err: &HarnessError) -> ExitCode {
    error!("{}", err);
    match serde_json::to_string_pretty(&err.to_body()) {
        Ok(body) => println!("{body}"),
        Err(_) => println!("{{\"error\": \"{}\"}}", err.kind()),
    }
    ExitCode::FAILURE
}

/// Map a command outcome to the process exit code
pub fn finish(outcome: Result<bool>) -> ExitCode {
    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => report_error(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desktop::platform::fake::{FakeAccessor, FakeElement, FakeProcesses, RecordingInput};

    fn desktop() -> Desktop {
        Desktop::new(
            Config::immediate(),
            Box::new(FakeAccessor::new(FakeElement::new("AXApplication"))),
            Box::new(RecordingInput::default()),
        )
        .with_processes(
            FakeProcesses::default()
                .with_process("EnviousWispr", 11, 90.0)
                .with_process("Finder", 22, 60.0),
        )
    }

    #[test]
    fn test_target_resolution() {
        let desktop = desktop();
        assert_eq!(TargetArgs::default().resolve(&desktop).unwrap(), 11);

        let finder = TargetArgs {
            app: Some("Finder".into()),
            pid: None,
        };
        assert_eq!(finder.resolve(&desktop).unwrap(), 22);

        let explicit = TargetArgs { app: None, pid: Some(5) };
        assert_eq!(explicit.resolve(&desktop).unwrap(), 5);

        let missing = TargetArgs {
            app: Some("Ghost".into()),
            pid: None,
        };
        assert_eq!(missing.resolve(&desktop).unwrap_err().kind(), "not_found");
    }

    #[test]
    fn test_seconds_rejects_unrepresentable_values() {
        assert_eq!(seconds(1.5, "--timeout").unwrap(), Duration::from_millis(1500));
        assert_eq!(seconds(-3.0, "--timeout").unwrap(), Duration::ZERO);

        let inf = seconds(f64::INFINITY, "--timeout").unwrap_err();
        assert_eq!(inf.kind(), "configuration");
        assert!(inf.to_string().contains("--timeout"));
        assert_eq!(seconds(1e300, "--delay").unwrap_err().kind(), "configuration");
    }

    #[test]
    fn test_finish_exit_codes() {
        assert_eq!(finish(Ok(true)), ExitCode::SUCCESS);
        assert_eq!(finish(Ok(false)), ExitCode::FAILURE);
        assert_eq!(finish(Err(HarnessError::not_found("baseline"))), ExitCode::FAILURE);
    }
}
