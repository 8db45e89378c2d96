//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Job failed: {0}")]
    JobFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Input not found: {0}")]
    InputNotFound(String),

    #[error("Highlight composition failed: {0}")]
    CompositionFailed(String),

    #[error("Media error: {0}")]
    Media(#[from] lagskill_media::MediaError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn job_failed(msg: impl Into<String>) -> Self {
        Self::JobFailed(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn input_not_found(msg: impl Into<String>) -> Self {
        Self::InputNotFound(msg.into())
    }

    pub fn composition_failed(msg: impl Into<String>) -> Self {
        Self::CompositionFailed(msg.into())
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            WorkerError::JobFailed(_) => "job_failed",
            WorkerError::ConfigError(_) => "config",
            WorkerError::InputNotFound(_) => "input_not_found",
            WorkerError::CompositionFailed(_) => "composition",
            WorkerError::Media(_) => "media",
            WorkerError::Json(_) => "json",
            WorkerError::Io(_) => "io",
        }
    }

    /// Whether the input itself is unusable, so re-running cannot help.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            WorkerError::InputNotFound(_)
                | WorkerError::Media(lagskill_media::MediaError::EmptySource)
                | WorkerError::Media(lagskill_media::MediaError::InvalidVideo(_))
                | WorkerError::Media(lagskill_media::MediaError::FileNotFound(_))
                | WorkerError::Media(lagskill_media::MediaError::InvalidDetectionLog(_))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lagskill_media::MediaError;

    #[test]
    fn test_input_errors() {
        assert!(WorkerError::from(MediaError::EmptySource).is_input_error());
        assert!(WorkerError::input_not_found("x.mp4").is_input_error());
        assert!(!WorkerError::job_failed("boom").is_input_error());
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(WorkerError::config_error("bad").kind(), "config");
        assert_eq!(WorkerError::from(MediaError::EmptySource).kind(), "media");
    }
}
