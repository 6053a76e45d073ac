use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestStatus {
    Pass,
    Fail,
    Error,
    Skip,
}

impl TestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::Error => "ERROR",
            Self::Skip => "SKIP",
        }
    }

    fn icon(&self) -> char {
        match self {
            Self::Pass => '+',
            Self::Fail => 'X',
            Self::Error => '!',
            Self::Skip => '-',
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Outcome of one test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub status: TestStatus,
    pub message: String,
    pub duration_s: f64,
    pub details: serde_json::Value,
}

impl TestResult {
    pub fn new(name: impl Into<String>, status: TestStatus, message: impl Into<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            status,
            message: message.into(),
            duration_s: (duration.as_secs_f64() * 1000.0).round() / 1000.0,
            details: serde_json::json!({}),
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }
}

/// Aggregate of a run, printed as the JSON summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub skipped: usize,
    pub all_passed: bool,
    pub tests: Vec<TestResult>,
}

impl RunSummary {
    pub fn from_results(results: Vec<TestResult>) -> Self {
        let count = |status| results.iter().filter(|r| r.status == status).count();
        let passed = count(TestStatus::Pass);
        let failed = count(TestStatus::Fail);
        let errors = count(TestStatus::Error);
        let skipped = count(TestStatus::Skip);
        Self {
            total: results.len(),
            passed,
            failed,
            errors,
            skipped,
            all_passed: failed == 0 && errors == 0,
            tests: results,
        }
    }

    /// Human-readable results table
    pub fn render_table(&self) -> String {
        let rule = "=".repeat(70);
        let mut out = String::new();
        let _ = writeln!(out, "\n{rule}");
        let _ = writeln!(
            out,
            "  UAT Results: {} passed, {} failed, {} errors, {} skipped / {} total",
            self.passed, self.failed, self.errors, self.skipped, self.total
        );
        let _ = writeln!(out, "{rule}\n");

        for r in &self.tests {
            let _ = write!(out, "  [{}] {:<5}  {}", r.status.icon(), r.status, r.name);
            if !r.message.is_empty() {
                let _ = write!(out, "  -- {}", r.message);
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results() -> Vec<TestResult> {
        vec![
            TestResult::new("t1", TestStatus::Pass, "", Duration::from_millis(1234)),
            TestResult::new("t2", TestStatus::Fail, "Element not found: role='AXWindow'", Duration::ZERO),
            TestResult::new("t3", TestStatus::Skip, "Unknown test: t3", Duration::ZERO),
        ]
    }

    #[test]
    fn test_summary_counts() {
        let summary = RunSummary::from_results(results());
        assert_eq!(summary.total, 3);
        assert_eq!((summary.passed, summary.failed, summary.errors, summary.skipped), (1, 1, 0, 1));
        assert!(!summary.all_passed);
        assert_eq!(summary.tests[0].duration_s, 1.234);
    }

    #[test]
    fn test_skips_do_not_fail_the_run() {
        let summary = RunSummary::from_results(vec![TestResult::new(
            "nope",
            TestStatus::Skip,
            "Unknown test: nope",
            Duration::ZERO,
        )]);
        assert!(summary.all_passed);
    }

    #[test]
    fn test_table_rows() {
        let table = RunSummary::from_results(results()).render_table();
        assert!(table.contains("UAT Results: 1 passed, 1 failed, 0 errors, 1 skipped / 3 total"));
        assert!(table.contains("  [+] PASS   t1\n"));
        assert!(table.contains("  [X] FAIL   t2  -- Element not found: role='AXWindow'"));
        assert!(table.contains("  [-] SKIP   t3  -- Unknown test: t3"));
    }

    #[test]
    fn test_status_serializes_upper_case() {
        let json = serde_json::to_value(&results()[0]).unwrap();
        assert_eq!(json["status"], "PASS");
        assert_eq!(json["details"], serde_json::json!({}));
    }
}
