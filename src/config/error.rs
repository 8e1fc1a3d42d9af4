//! Configuration error types

use thiserror::Error;

use crate::config::validation::ValidationErrors;

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Failed to read or parse a configuration document
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Document extension is neither `.json` nor `.toml`
    #[error("Unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    /// Environment variable error
    #[error("Environment variable error: {0}")]
    EnvVarError(String),

    /// Mutual exclusivity error
    #[error("Mutual exclusivity error: {0}")]
    MutualExclusivityError(String),

    /// An overlay introduced keys the schema does not declare (strict mode)
    #[error("Overlay introduces unknown keys:\n{0}")]
    SchemaMismatch(ValidationErrors),

    /// The resolved configuration failed validation
    #[error("Configuration is invalid:\n{0}")]
    Validation(ValidationErrors),

    /// A snapshot was already published by this publisher
    #[error("Configuration snapshot has already been published")]
    AlreadyPublished,
}

impl ConfigError {
    /// Create a new file not found error
    pub fn file_not_found<S: Into<String>>(path: S) -> Self {
        ConfigError::FileNotFound(path.into())
    }

    /// Create a new mutual exclusivity error
    pub fn mutual_exclusivity<S: Into<String>>(message: S) -> Self {
        ConfigError::MutualExclusivityError(message.into())
    }

    /// All individual errors carried by this error, if any
    pub fn errors(&self) -> Option<&ValidationErrors> {
        match self {
            ConfigError::SchemaMismatch(errors) | ConfigError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}
