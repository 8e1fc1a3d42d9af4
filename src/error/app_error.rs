use thiserror::Error;

use crate::config::ConfigError;

/// Application-wide error type for command execution
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration could not be resolved, validated or published
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Validation error with field-specific details
    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    /// A requested key or route is not present in the configuration
    #[error("Not found: {what}")]
    NotFound { what: String },

    /// Failed to write command output
    #[error("Output error: {source}")]
    Output {
        #[source]
        source: std::io::Error,
    },

    /// Internal error for unexpected failures
    #[error("Internal error: {source:#}")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    pub fn validation<F: Into<String>, R: Into<String>>(field: F, reason: R) -> Self {
        AppError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn not_found<S: Into<String>>(what: S) -> Self {
        AppError::NotFound { what: what.into() }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal { source: error }
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        AppError::Output { source: error }
    }
}

/// Type alias for Result with AppError to simplify function signatures
pub type AppResult<T> = Result<T, AppError>;
