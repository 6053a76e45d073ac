//! Behavioral acceptance tests against a running app.
//!
//! Tests are registered by name into a [`TestRegistry`], grouped into suites,
//! and executed sequentially by a [`Runner`]. Each test gets a fresh
//! [`TestContext`]; cleanups registered on it run newest-first once the body
//! finishes, whatever the outcome.
//!
//! ```rust,ignore
//! let mut registry = TestRegistry::new();
//! uat::suites::register_all(&mut registry)?;
//! let results = Runner::new(&registry, &desktop)
//!     .verbose(true)
//!     .run_selection(&Selection::Suite("settings".into()))?;
//! println!("{}", RunSummary::from_results(results).render_table());
//! ```

pub mod assertions;
pub mod context;
pub mod menu;
pub mod registry;
pub mod report;
pub mod runner;
pub mod suites;

pub use context::TestContext;
pub use registry::{Selection, TestBody, TestCase, TestRegistry};
pub use report::{RunSummary, TestResult, TestStatus};
pub use runner::Runner;
