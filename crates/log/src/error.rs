//! Error types for logger setup
use thiserror::Error;

/// Result type for logger operations
pub type LogResult<T> = Result<T, LogError>;

/// Errors raised while configuring or installing the logger
#[derive(Error, Debug)]
pub enum LogError {
    /// Filter directive could not be parsed
    #[error("Invalid filter '{filter}': {reason}")]
    Filter {
        /// The rejected directive string
        filter: String,
        /// Parser message
        reason: String,
    },

    /// Configuration is inconsistent
    #[error("Configuration error: {0}")]
    Config(String),

    /// A global subscriber is already installed
    #[error("Logger initialization failed: {0}")]
    Init(String),
}

impl LogError {
    /// Create a filter error
    pub fn filter<F: Into<String>, R: ToString>(filter: F, reason: R) -> Self {
        Self::Filter {
            filter: filter.into(),
            reason: reason.to_string(),
        }
    }
}
