use regex::RegexBuilder;
use std::io::{BufRead, BufReader};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::error::{HarnessError, Result};

/// How long a terminated stream gets to flush and exit before it is killed
const TERMINATE_GRACE: Duration = Duration::from_secs(2);

/// Source of the target app's unified log lines
pub trait LogSource {
    /// Stream `subsystem` at `level` for `duration` and return the non-empty lines
    fn capture(&self, subsystem: &str, level: &str, duration: Duration) -> Result<Vec<String>>;
}

/// `log stream` backed capture
#[derive(Debug, Default)]
pub struct SystemLogs;

impl LogSource for SystemLogs {
    fn capture(&self, subsystem: &str, level: &str, duration: Duration) -> Result<Vec<String>> {
        let predicate = format!("subsystem == \"{subsystem}\"");
        debug!("log stream --predicate '{}' for {:?}", predicate, duration);
        let mut command = Command::new("log");
        command
            .args(["stream", "--predicate", &predicate])
            .args(["--level", level, "--style", "compact"]);
        stream_lines(command, duration)
    }
}

/// Run `command` for `duration`, reading its stdout the whole time, then
/// stop it with SIGTERM so it can flush. Returns the non-empty lines.
pub fn stream_lines(mut command: Command, duration: Duration) -> Result<Vec<String>> {
    let mut child = command.stdout(Stdio::piped()).stderr(Stdio::null()).spawn()?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow::anyhow!("log stream has no stdout"))?;

    let reader = thread::spawn(move || {
        BufReader::new(stdout)
            .lines()
            .map_while(std::io::Result::ok)
            .filter(|line| !line.trim().is_empty())
            .collect::<Vec<String>>()
    });

    thread::sleep(duration);
    terminate(&mut child)?;

    reader
        .join()
        .map_err(|_| HarnessError::from(anyhow::anyhow!("log reader thread panicked")))
}

#[cfg(unix)]
fn send_sigterm(child: &Child) -> Result<()> {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let pid = i32::try_from(child.id()).map_err(|e| anyhow::anyhow!("pid out of range: {e}"))?;
    match kill(Pid::from_raw(pid), Signal::SIGTERM) {
        // Exited between try_wait and kill.
        Ok(()) | Err(nix::errno::Errno::ESRCH) => Ok(()),
        Err(e) => Err(anyhow::anyhow!("SIGTERM to {pid} failed: {e}").into()),
    }
}

#[cfg(not(unix))]
fn send_sigterm(_child: &Child) -> Result<()> {
    Ok(())
}

/// SIGTERM, then SIGKILL if the child is still alive after the grace period
fn terminate(child: &mut Child) -> Result<()> {
    if child.try_wait()?.is_some() {
        return Ok(());
    }
    send_sigterm(child)?;

    let deadline = Instant::now() + TERMINATE_GRACE;
    while Instant::now() < deadline {
        if child.try_wait()?.is_some() {
            return Ok(());
        }
        thread::sleep(Duration::from_millis(50));
    }

    warn!("log stream {} ignored SIGTERM, killing it", child.id());
    // Already-exited is fine; we only need it stopped.
    let _ = child.kill();
    child.wait()?;
    Ok(())
}

/// Case-insensitive regex search over captured lines
pub fn logs_match(lines: &[String], pattern: &str) -> Result<bool> {
    let regex = RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| HarnessError::configuration(format!("invalid log pattern: {e}")))?;
    Ok(lines.iter().any(|line| regex.is_match(line)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logs_match_ignores_case() {
        let lines = vec![
            "2026-01-01 12:00:00 EnviousWispr: Recording STARTED".to_string(),
            "2026-01-01 12:00:02 EnviousWispr: idle".to_string(),
        ];
        assert!(logs_match(&lines, "recording started").unwrap());
        assert!(logs_match(&lines, r"recording\s+\w+").unwrap());
        assert!(!logs_match(&lines, "transcribed").unwrap());
    }

    #[test]
    fn test_invalid_pattern_is_configuration_error() {
        let err = logs_match(&[], "(").unwrap_err();
        assert_eq!(err.kind(), "configuration");
    }

    #[cfg(unix)]
    #[test]
    fn test_stream_keeps_reading_past_pipe_buffer() {
        let mut command = Command::new("sh");
        command.args(["-c", "yes filler | head -n 20000; echo done-marker; exec sleep 30"]);
        let lines = stream_lines(command, Duration::from_millis(500)).unwrap();
        assert_eq!(lines.len(), 20001);
        assert_eq!(lines.last().map(String::as_str), Some("done-marker"));
    }

    #[cfg(unix)]
    #[test]
    fn test_stream_is_stopped_with_sigterm() {
        let mut command = Command::new("sh");
        command.args([
            "-c",
            "trap 'echo flushed-on-term; exit 0' TERM; echo started; while :; do sleep 0.05; done",
        ]);
        let started = Instant::now();
        let lines = stream_lines(command, Duration::from_millis(200)).unwrap();
        assert_eq!(lines, ["started", "flushed-on-term"]);
        assert!(started.elapsed() < TERMINATE_GRACE);
    }
}
