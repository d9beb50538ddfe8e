use thiserror::Error;

/// Failures of a synchronization run. None of these are retried inside the
/// core; the caller decides whether to switch strategy.
#[derive(Debug, Error, PartialEq)]
pub enum SyncError {
    #[error("Script has no lines")]
    EmptyScript,

    #[error("Script has no words to allocate time to")]
    ZeroWords,

    #[error("Invalid audio duration: {0}")]
    InvalidDuration(f64),

    #[error("No speech segments detected")]
    NoSpeechDetected,

    #[error("No visual assets to schedule")]
    NoVisualAssets,

    #[error("Line count mismatch: expected {expected} lines, got {actual}")]
    LineCountMismatch { expected: usize, actual: usize },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, SyncError>;

/// Reject durations that are not strictly positive and finite.
pub fn ensure_duration(seconds: f64) -> Result<()> {
    if seconds.is_finite() && seconds > 0.0 {
        Ok(())
    } else {
        Err(SyncError::InvalidDuration(seconds))
    }
}
