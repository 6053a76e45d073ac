use std::io::Write;
use std::process::{Command, Stdio};

use crate::error::Result;

/// Plain-text system pasteboard
pub trait Clipboard {
    fn read(&self) -> Result<String>;
    fn write(&self, text: &str) -> Result<()>;
}

/// `pbpaste` / `pbcopy` backed clipboard
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn read(&self) -> Result<String> {
        let output = Command::new("pbpaste").output()?;
        if !output.status.success() {
            return Err(anyhow::anyhow!("pbpaste exited with {}", output.status).into());
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn write(&self, text: &str) -> Result<()> {
        let mut child = Command::new("pbcopy").stdin(Stdio::piped()).spawn()?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes())?;
        }
        let status = child.wait()?;
        if !status.success() {
            return Err(anyhow::anyhow!("pbcopy exited with {}", status).into());
        }
        Ok(())
    }
}
