//! Error types for Cardforge

use thiserror::Error;

/// The main error type for Cardforge operations
#[derive(Debug, Error)]
pub enum ForgeError {
    #[error("Submission error: {0}")]
    Submission(String),

    #[error("Job timed out after {0} seconds")]
    Timeout(u64),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Fatal failure in {stage} stage: {message}")]
    FatalStage { stage: String, message: String },

    #[error("Checkpoint write error: {0}")]
    Checkpoint(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ForgeError {
    /// Build a fatal stage error
    pub fn fatal(stage: &str, message: impl Into<String>) -> Self {
        ForgeError::FatalStage {
            stage: stage.to_string(),
            message: message.into(),
        }
    }

    /// Whether the error is transient and worth retrying within an
    /// art-commissioning attempt budget.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ForgeError::Submission(_)
                | ForgeError::Timeout(_)
                | ForgeError::Fetch(_)
                | ForgeError::Backend(_)
        )
    }
}

/// Result type alias for Cardforge operations
pub type Result<T> = std::result::Result<T, ForgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(ForgeError::Submission("no job id".to_string()).is_retryable());
        assert!(ForgeError::Timeout(300).is_retryable());
        assert!(ForgeError::Fetch("404".to_string()).is_retryable());
        assert!(!ForgeError::fatal("synthesis", "bad JSON").is_retryable());
        assert!(!ForgeError::Checkpoint("disk full".to_string()).is_retryable());
    }

    #[test]
    fn test_json_errors_convert() {
        fn parse(input: &str) -> Result<serde_json::Value> {
            Ok(serde_json::from_str(input)?)
        }
        assert!(parse("not json").is_err());
        assert!(matches!(parse("{oops").unwrap_err(), ForgeError::Json(_)));
    }
}
