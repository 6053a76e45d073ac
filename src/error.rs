use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Timed out after {:.1}s waiting for {what} (last value: {last})", elapsed.as_secs_f64())]
    Timeout {
        what: String,
        last: String,
        elapsed: Duration,
    },

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("{0}")]
    Assertion(String),

    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl HarnessError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn assertion(message: impl Into<String>) -> Self {
        Self::Assertion(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Assertion failures are the only errors classified as FAIL.
    pub fn is_assertion(&self) -> bool {
        matches!(self, Self::Assertion(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Timeout { .. } => "timeout",
            Self::Configuration(_) => "configuration",
            Self::Assertion(_) => "assertion",
            Self::Unsupported(_) => "unsupported",
            Self::Io(_) => "io",
            Self::Image(_) => "image",
            Self::Json(_) => "json",
            Self::Internal(_) => "internal",
        }
    }

    /// JSON envelope printed by the command-line tools on the error path.
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            error: self.kind().to_string(),
            detail: self.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub detail: String,
}

pub type Result<T> = std::result::Result<T, HarnessError>;
