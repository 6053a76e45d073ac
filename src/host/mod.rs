//! Host-side collaborators: process lookup and metrics, clipboard, unified logs.

pub mod clipboard;
pub mod logs;
pub mod process;

pub use clipboard::{Clipboard, SystemClipboard};
pub use logs::{logs_match, LogSource, SystemLogs};
pub use process::{ProcessInspector, SystemProcesses};
