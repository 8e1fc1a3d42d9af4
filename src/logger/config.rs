//! Configuration types for the logger

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::logger::error::LoggerError;

/// Main logger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggerConfig {
    pub console: ConsoleConfig,
    pub file: FileConfig,
    /// Level or `EnvFilter` directive, e.g. `info` or `ledger_config=debug`
    pub level: String,
}

impl LoggerConfig {
    /// Create a new logger configuration with validation
    pub fn new(console: ConsoleConfig, file: FileConfig, level: String) -> Result<Self, LoggerError> {
        let config = Self {
            console,
            file,
            level,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), LoggerError> {
        self.parse_level()?;
        self.file.validate()?;

        if !self.console.enabled && !self.file.enabled {
            return Err(LoggerError::config(
                "At least one output (console or file) must be enabled",
            ));
        }

        Ok(())
    }

    /// Parse the log level string into a tracing::Level
    ///
    /// Filter directives are accepted as long as their default level is valid.
    pub fn parse_level(&self) -> Result<Level, LoggerError> {
        let default = self.level.split(',').next().unwrap_or_default().trim();
        match default.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ if default.contains('=') => Ok(Level::INFO),
            _ => Err(LoggerError::config(format!(
                "Invalid log level '{}'. Valid levels are: trace, debug, info, warn, error",
                self.level
            ))),
        }
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            console: ConsoleConfig::default(),
            file: FileConfig::default(),
            level: "info".to_string(),
        }
    }
}

/// Console output configuration
///
/// Console logs go to stderr so command output on stdout stays parseable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    pub enabled: bool,
    pub colored: bool,
    pub format: LogFormat,
}

impl ConsoleConfig {
    pub fn new(enabled: bool, colored: bool) -> Self {
        Self {
            enabled,
            colored,
            format: LogFormat::default(),
        }
    }

    /// Set log format
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self::new(true, true)
    }
}

/// File output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    pub enabled: bool,
    pub path: PathBuf,
    pub append: bool,
    pub format: LogFormat,
}

impl FileConfig {
    /// Enabled file output at `path`, appending JSON lines
    pub fn at<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            enabled: true,
            path: path.into(),
            ..Default::default()
        }
    }

    /// Validate file configuration
    ///
    /// This does not touch the filesystem; the writer creates missing
    /// directories when it opens the file.
    pub fn validate(&self) -> Result<(), LoggerError> {
        if self.enabled && self.path.as_os_str().is_empty() {
            return Err(LoggerError::config(
                "File path cannot be empty when file output is enabled",
            ));
        }
        Ok(())
    }

    pub fn with_append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: PathBuf::from("logs/ledger-config.log"),
            append: true,
            format: LogFormat::Json,
        }
    }
}

/// Log format options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" => Ok(LogFormat::Full),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            _ => Err(LoggerError::format(format!(
                "Invalid log format '{}'. Valid formats are: full, compact, json",
                s
            ))),
        }
    }
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Full => "full",
            LogFormat::Compact => "compact",
            LogFormat::Json => "json",
        }
    }
}

/// Builder for LoggerConfig
pub struct LoggerConfigBuilder {
    console: ConsoleConfig,
    file: FileConfig,
    level: String,
}

impl LoggerConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            console: ConsoleConfig::default(),
            file: FileConfig::default(),
            level: "info".to_string(),
        }
    }

    pub fn console(mut self, config: ConsoleConfig) -> Self {
        self.console = config;
        self
    }

    pub fn file(mut self, config: FileConfig) -> Self {
        self.file = config;
        self
    }

    pub fn level<S: Into<String>>(mut self, level: S) -> Self {
        self.level = level.into();
        self
    }

    /// Build the configuration with validation
    pub fn build(self) -> Result<LoggerConfig, LoggerError> {
        LoggerConfig::new(self.console, self.file, self.level)
    }
}

impl Default for LoggerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_default_config_is_valid() {
        let config = LoggerConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_log_level() {
        let config = LoggerConfig {
            level: "invalid".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(LoggerError::Config { .. })));
    }

    #[test]
    fn test_filter_directives_are_accepted() {
        let config = LoggerConfig {
            level: "warn,ledger_config=debug".to_string(),
            ..Default::default()
        };
        assert_eq!(config.parse_level().unwrap(), Level::WARN);

        let config = LoggerConfig {
            level: "ledger_config=trace".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_both_outputs_disabled() {
        let config = LoggerConfig {
            console: ConsoleConfig::new(false, false),
            file: FileConfig::default(),
            level: "info".to_string(),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_enabled_file_requires_path() {
        let file = FileConfig::at("");
        assert!(file.validate().is_err());
        assert!(FileConfig::at("logs/out.log").validate().is_ok());
    }

    #[test]
    fn test_valid_log_levels() {
        for level in &["trace", "debug", "info", "warn", "error"] {
            let config = LoggerConfig {
                level: level.to_string(),
                ..Default::default()
            };
            assert!(config.validate().is_ok(), "Level {} should be valid", level);
        }
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!(LogFormat::from_str("full").unwrap(), LogFormat::Full);
        assert_eq!(LogFormat::from_str("Compact").unwrap(), LogFormat::Compact);
        assert_eq!(LogFormat::from_str("json").unwrap(), LogFormat::Json);
        assert!(matches!(LogFormat::from_str("xml"), Err(LoggerError::Format { .. })));
    }

    #[test]
    fn test_builder_pattern() {
        let config = LoggerConfigBuilder::new()
            .level("debug")
            .console(ConsoleConfig::new(true, false).with_format(LogFormat::Compact))
            .file(FileConfig::at("logs/x.log").with_append(false))
            .build()
            .unwrap();

        assert_eq!(config.level, "debug");
        assert!(!config.console.colored);
        assert_eq!(config.console.format, LogFormat::Compact);
        assert!(config.file.enabled);
        assert!(!config.file.append);
    }
}
