use std::collections::{BTreeMap, HashMap};
use std::fmt;

use super::context::TestContext;
use crate::error::{HarnessError, Result};

pub type TestBody = Box<dyn Fn(&mut TestContext) -> Result<()>>;

/// One named acceptance test
pub struct TestCase {
    pub name: String,
    pub suite: String,
    /// One-line description shown by `list`
    pub summary: String,
    body: TestBody,
}

impl TestCase {
    pub fn new(
        name: impl Into<String>,
        suite: impl Into<String>,
        body: impl Fn(&mut TestContext) -> Result<()> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            suite: suite.into(),
            summary: String::new(),
            body: Box::new(body),
        }
    }

    pub fn describe(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn run(&self, ctx: &mut TestContext) -> Result<()> {
        (self.body)(ctx)
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("suite", &self.suite)
            .finish()
    }
}

/// Which tests a run should execute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Suite(String),
    Test(String),
}

/// Registered tests in registration order, with a per-suite index.
///
/// Names are unique across suites; registering a name twice is rejected.
#[derive(Default)]
pub struct TestRegistry {
    cases: Vec<TestCase>,
    by_name: HashMap<String, usize>,
    suites: BTreeMap<String, Vec<String>>,
}

impl TestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, case: TestCase) -> Result<()> {
        if self.by_name.contains_key(&case.name) {
            return Err(HarnessError::configuration(format!(
                "test '{}' is already registered",
                case.name
            )));
        }
        self.by_name.insert(case.name.clone(), self.cases.len());
        self.suites
            .entry(case.suite.clone())
            .or_default()
            .push(case.name.clone());
        self.cases.push(case);
        Ok(())
    }

    pub fn register(
        &mut self,
        name: &str,
        suite: &str,
        body: impl Fn(&mut TestContext) -> Result<()> + 'static,
    ) -> Result<()> {
        self.add(TestCase::new(name, suite, body))
    }

    pub fn get(&self, name: &str) -> Option<&TestCase> {
        self.by_name.get(name).map(|&i| &self.cases[i])
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// All test names in registration order
    pub fn names(&self) -> Vec<String> {
        self.cases.iter().map(|c| c.name.clone()).collect()
    }

    /// Suites sorted by name, each with its tests in registration order
    pub fn suites(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.suites.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Expand a selection into test names. An explicit test name is passed
    /// through even when unregistered so the run can report it as skipped.
    pub fn select(&self, selection: &Selection) -> Result<Vec<String>> {
        match selection {
            Selection::All => Ok(self.names()),
            Selection::Test(name) => Ok(vec![name.clone()]),
            Selection::Suite(suite) => self.suites.get(suite).cloned().ok_or_else(|| {
                let available: Vec<&str> = self.suites.keys().map(String::as_str).collect();
                HarnessError::not_found(format!(
                    "unknown suite '{}' (available: {})",
                    suite,
                    available.join(", ")
                ))
            }),
        }
    }
}
