use std::process::Command;
use tracing::debug;

use crate::error::Result;

/// Process resolution and resource metrics
pub trait ProcessInspector {
    /// First pid whose process name is exactly `name`
    fn find_pid(&self, name: &str) -> Result<Option<u32>>;

    fn is_running(&self, name: &str) -> bool {
        matches!(self.find_pid(name), Ok(Some(_)))
    }

    /// Resident memory in MB, `None` when the process is gone
    fn memory_mb(&self, pid: u32) -> Result<Option<f64>>;

    fn cpu_percent(&self, pid: u32) -> Result<Option<f64>>;
}

/// `pgrep` / `ps` backed inspector
#[derive(Debug, Default)]
pub struct SystemProcesses;

impl SystemProcesses {
    fn ps_field(&self, pid: u32, field: &str) -> Result<Option<String>> {
        let output = Command::new("ps")
            .args(["-o", field, "-p", &pid.to_string()])
            .output()?;
        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !output.status.success() || text.is_empty() {
            return Ok(None);
        }
        Ok(Some(text))
    }
}

impl ProcessInspector for SystemProcesses {
    fn find_pid(&self, name: &str) -> Result<Option<u32>> {
        let output = Command::new("pgrep").args(["-x", name]).output()?;
        let pid = parse_first_pid(&String::from_utf8_lossy(&output.stdout));
        debug!("pgrep -x {} -> {:?}", name, pid);
        Ok(pid)
    }

    fn memory_mb(&self, pid: u32) -> Result<Option<f64>> {
        Ok(self
            .ps_field(pid, "rss=")?
            .and_then(|kb| kb.parse::<f64>().ok())
            .map(|kb| kb / 1024.0))
    }

    fn cpu_percent(&self, pid: u32) -> Result<Option<f64>> {
        Ok(self
            .ps_field(pid, "%cpu=")?
            .and_then(|cpu| cpu.parse::<f64>().ok()))
    }
}

/// `pgrep` may print several pids; the first one wins.
pub fn parse_first_pid(stdout: &str) -> Option<u32> {
    stdout.lines().next()?.trim().parse().ok()
}
