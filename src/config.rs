use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Harness settings, read from `UAT_*` environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Process name of the application under test (exact `pgrep -x` match)
    pub app_name: String,
    /// Unified logging subsystem the app writes to
    pub log_subsystem: String,
    pub poll_interval: Duration,
    pub default_timeout: Duration,
    /// Settle delay after every synthesized input event
    pub input_delay: Duration,
    pub max_depth: usize,
    /// Multiplier for fixed UI settle waits in test bodies; 0 disables them
    pub settle_scale: f64,
    /// Root for `screenshots/` and `baselines/`
    pub artifact_dir: PathBuf,
    /// Allowed fraction of changed pixels for visual comparisons
    pub tolerance: f64,
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            app_name: env::var("UAT_APP_NAME").unwrap_or(defaults.app_name),
            log_subsystem: env::var("UAT_LOG_SUBSYSTEM").unwrap_or(defaults.log_subsystem),
            poll_interval: env_millis("UAT_POLL_INTERVAL_MS").unwrap_or(defaults.poll_interval),
            default_timeout: env_millis("UAT_TIMEOUT_MS").unwrap_or(defaults.default_timeout),
            input_delay: env_millis("UAT_INPUT_DELAY_MS").unwrap_or(defaults.input_delay),
            max_depth: env::var("UAT_MAX_DEPTH")
                .ok()
                .and_then(|d| d.parse().ok())
                .unwrap_or(defaults.max_depth),
            settle_scale: env::var("UAT_SETTLE_SCALE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.settle_scale),
            artifact_dir: env::var("UAT_ARTIFACT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.artifact_dir),
            tolerance: env::var("UAT_TOLERANCE")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(defaults.tolerance),
        }
    }

    pub fn screenshots_dir(&self) -> PathBuf {
        self.artifact_dir.join("screenshots")
    }

    pub fn baselines_dir(&self) -> PathBuf {
        self.artifact_dir.join("baselines")
    }

    /// Same settings with no settle or poll delays, for in-memory runs.
    pub fn immediate() -> Self {
        Self {
            poll_interval: Duration::from_millis(10),
            input_delay: Duration::ZERO,
            settle_scale: 0.0,
            ..Self::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "EnviousWispr".to_string(),
            log_subsystem: "com.enviouswispr.app".to_string(),
            poll_interval: Duration::from_millis(300),
            default_timeout: Duration::from_secs(5),
            input_delay: Duration::from_millis(100),
            max_depth: 10,
            settle_scale: 1.0,
            artifact_dir: PathBuf::from("uat-artifacts"),
            tolerance: 0.02,
        }
    }
}

fn env_millis(key: &str) -> Option<Duration> {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_millis)
}
