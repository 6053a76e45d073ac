//! Desktop automation module
//!
//! Reads a running app through the macOS accessibility API and drives it with
//! synthetic HID input.
//!
//! ## Architecture
//!
//! - `Desktop` - the handle tests and tools talk to
//! - `Element` / `Node` - live accessibility elements behind a `TreeAccessor`
//! - `walker` - depth-bounded snapshot and search
//! - `InputSynthesizer` / `InputDriver` - raw events and the clicks and keys built from them
//! - `ScreenCapture` / `imagediff` - screenshots and baseline comparison
//!
//! `platform::fake` provides in-memory stand-ins for everything above, so the
//! harness can run without a desktop session.
//!
//! ## Example
//!
//! ```rust,ignore
//! use ax_uat::desktop::{Desktop, MatchCriteria};
//!
//! let desktop = Desktop::system(Config::from_env())?;
//! let pid = desktop.resolve_pid("EnviousWispr")?;
//!
//! let button = desktop.find(pid, &MatchCriteria::role("AXButton").with_title("Record"));
//! desktop.click_element(pid, &MatchCriteria::role("AXButton").with_title("Record"))?;
//! desktop.press_key("escape", Modifiers::NONE)?;
//! ```

pub mod imagediff;
pub mod input;
pub mod manager;
pub mod platform;
pub mod screenshot;
pub mod serializer;
pub mod types;
pub mod walker;

// Re-export main types
pub use input::{InputDriver, InputSynthesizer, Modifiers, MouseButton};
pub use manager::Desktop;
pub use platform::{check_accessibility_permissions, create_accessor, Element, Node, TreeAccessor};
pub use screenshot::{ArtifactStore, CaptureTarget, ScreenCapture};
pub use types::{AttrValue, ElementInfo, MatchCriteria, Point, Rect, Size, Snapshot};
