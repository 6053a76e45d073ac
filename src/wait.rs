//! Bounded polling for UI state that settles asynchronously.
//!
//! Every waiter re-resolves the application root on each tick, so handles
//! never go stale between polls.

use std::fmt;
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::desktop::types::{AttrValue, MatchCriteria};
use crate::desktop::{Desktop, Node};
use crate::error::{HarnessError, Result};

/// Outcome of a bounded poll
#[derive(Debug, Clone)]
pub struct WaitOutcome<T> {
    pub success: bool,
    /// Value seen by the satisfying probe, or the last one observed on timeout
    pub value: Option<T>,
    pub elapsed: Duration,
}

impl<T: fmt::Display> WaitOutcome<T> {
    /// `Timeout` carrying the last observed value when the poll failed
    pub fn into_result(self, what: impl Into<String>) -> Result<Option<T>> {
        if self.success {
            return Ok(self.value);
        }
        Err(HarnessError::Timeout {
            what: what.into(),
            last: self
                .value
                .map(|v| v.to_string())
                .unwrap_or_else(|| "none".to_string()),
            elapsed: self.elapsed,
        })
    }
}

/// Run `probe` until it reports success or `timeout` passes.
///
/// The probe runs immediately, then after each sleep of
/// `min(interval, remaining)`. A probe landing exactly on the deadline still
/// counts. The probe returns whether it was satisfied plus what it observed.
pub fn poll<T>(
    timeout: Duration,
    interval: Duration,
    mut probe: impl FnMut() -> (bool, Option<T>),
) -> WaitOutcome<T> {
    let start = Instant::now();
    let mut last = None;
    loop {
        let (satisfied, observed) = probe();
        if satisfied {
            return WaitOutcome {
                success: true,
                value: observed,
                elapsed: start.elapsed(),
            };
        }
        if observed.is_some() {
            last = observed;
        }

        let elapsed = start.elapsed();
        if elapsed >= timeout {
            return WaitOutcome {
                success: false,
                value: last,
                elapsed,
            };
        }
        thread::sleep(interval.min(timeout - elapsed));
    }
}

/// Wait until an element matching `criteria` exists
pub fn wait_for_element(
    desktop: &Desktop,
    pid: u32,
    criteria: &MatchCriteria,
    timeout: Duration,
) -> WaitOutcome<Node> {
    let outcome = poll(timeout, desktop.config().poll_interval, || {
        let found = desktop.find(pid, criteria);
        (found.is_some(), found)
    });
    debug!("wait_for_element({}) -> {} in {:?}", criteria, outcome.success, outcome.elapsed);
    outcome
}

/// Wait until no element matches `criteria`; on timeout the value is the one still present
pub fn wait_for_element_gone(
    desktop: &Desktop,
    pid: u32,
    criteria: &MatchCriteria,
    timeout: Duration,
) -> WaitOutcome<Node> {
    let outcome = poll(timeout, desktop.config().poll_interval, || {
        let found = desktop.find(pid, criteria);
        (found.is_none(), found)
    });
    debug!("wait_for_element_gone({}) -> {} in {:?}", criteria, outcome.success, outcome.elapsed);
    outcome
}

/// What an attribute wait is looking for
#[derive(Debug, Clone, PartialEq)]
pub enum ValueTarget {
    Equals(AttrValue),
    NotEquals(AttrValue),
}

impl ValueTarget {
    /// Exactly one of `expected` / `not_expected` must be given
    pub fn from_options(expected: Option<AttrValue>, not_expected: Option<AttrValue>) -> Result<Self> {
        match (expected, not_expected) {
            (Some(want), None) => Ok(Self::Equals(want)),
            (None, Some(avoid)) => Ok(Self::NotEquals(avoid)),
            (None, None) => Err(HarnessError::configuration(
                "wait_for_value needs one of expected or not_expected",
            )),
            (Some(_), Some(_)) => Err(HarnessError::configuration(
                "wait_for_value takes expected or not_expected, not both",
            )),
        }
    }

    fn satisfied_by(&self, value: &AttrValue) -> bool {
        match self {
            Self::Equals(want) => value == want,
            Self::NotEquals(avoid) => value != avoid,
        }
    }
}

/// Wait until `attr` of the first element matching `criteria` equals
/// `expected` (or stops equalling `not_expected`). A missing element never
/// satisfies the wait. Supplying neither or both targets is a configuration
/// error raised before any polling.
pub fn wait_for_value(
    desktop: &Desktop,
    pid: u32,
    criteria: &MatchCriteria,
    attr: &str,
    expected: Option<AttrValue>,
    not_expected: Option<AttrValue>,
    timeout: Duration,
) -> Result<WaitOutcome<AttrValue>> {
    let target = ValueTarget::from_options(expected, not_expected)?;
    let outcome = poll(timeout, desktop.config().poll_interval, || {
        match desktop.find(pid, criteria) {
            Some(node) => {
                let value = node.attribute(attr).unwrap_or_default();
                (target.satisfied_by(&value), Some(value))
            }
            None => (false, None),
        }
    });
    debug!(
        "wait_for_value({}, {}) -> {} in {:?}",
        criteria, attr, outcome.success, outcome.elapsed
    );
    Ok(outcome)
}
