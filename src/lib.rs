//! Accessibility-driven UI acceptance testing for macOS applications.
//!
//! The harness observes a running app through its accessibility tree, drives
//! it with synthetic HID input and asserts on what it can see: AX attributes,
//! the clipboard, process metrics, screenshots and logs.
//!
//! - [`desktop`] - tree access, search, input, screenshots
//! - [`wait`] - bounded polling primitives
//! - [`diff`] - snapshot comparison
//! - [`uat`] - test registry, runner and built-in suites
//! - [`host`] - process, clipboard and log collaborators

pub mod cli;
pub mod config;
pub mod desktop;
pub mod diff;
pub mod error;
pub mod host;
pub mod uat;
pub mod wait;

pub use config::Config;
pub use error::{HarnessError, Result};
