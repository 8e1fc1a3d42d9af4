//! CLI argument parsing with clap
//!
//! This module defines the command-line interface structure using clap,
//! including all commands, arguments, and their documentation.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use super::validation::{validate_config_dir, validate_config_file_path, validate_key_path};

/// Resolve and validate central-ledger configuration
#[derive(Parser, Debug)]
#[command(name = "ledger-config")]
#[command(about = "Resolve and validate central-ledger configuration")]
#[command(long_about = "
ledger-config resolves the central-ledger configuration from a base document,
environment and local overrides, explicit overlay files and CLEDG_* environment
variables, validates it against the configuration schema and prints the result.

EXAMPLES:
    # Validate the layered configuration in ./config
    ledger-config check

    # Apply an overlay and print the resolved document as TOML
    ledger-config --overlay config/central-handlers.json resolve --format toml

    # List producer routes with their messaging parameters
    ledger-config routes --direction producer

    # Read a single value, keys containing dots included
    ledger-config get KAFKA.PRODUCER.BULK.PROCESSING.config.rdkafkaConf.metadata.broker.list

    # Accept vendor keys the schema does not know about
    ledger-config --lenient --overlay vendor.json check

Exits with a non-zero status when the configuration is invalid.
")]
#[command(version = crate::build::CLAP_LONG_VERSION)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Single configuration file
    ///
    /// Use this file as the base document instead of the layered
    /// `default`/`{environment}`/`local` documents of the configuration
    /// directory. JSON and TOML are supported, selected by extension.
    ///
    /// Example: --config /etc/central-ledger/production.json
    #[arg(short, long, value_name = "FILE", value_parser = validate_config_file_path, conflicts_with = "config_dir")]
    pub config: Option<PathBuf>,

    /// Configuration directory for layered loading
    ///
    /// Overrides CLEDG_CONFIG_DIR. Defaults to ./config.
    #[arg(long, value_name = "DIR", value_parser = validate_config_dir)]
    pub config_dir: Option<PathBuf>,

    /// Override environment detection
    ///
    /// Selects the `{environment}` document of the configuration directory.
    /// Overrides CLEDG_ENV.
    ///
    /// Available values: development (dev), test, staging (stage), production (prod)
    #[arg(short, long, value_enum)]
    pub env: Option<Environment>,

    /// Overlay file applied after the configuration directory layers
    ///
    /// May be repeated; later overlays win over earlier ones.
    #[arg(short = 'o', long = "overlay", value_name = "FILE", value_parser = validate_config_file_path)]
    pub overlays: Vec<PathBuf>,

    /// Pass unknown keys through with a warning instead of failing
    #[arg(long)]
    pub lenient: bool,

    /// Ignore CLEDG_* environment variable overrides
    #[arg(long)]
    pub no_env: bool,

    /// Enable verbose logging
    ///
    /// Increases log output to debug level, showing every layer applied.
    /// Cannot be used with --quiet.
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-error output
    ///
    /// Reduces log output to error level only.
    /// Cannot be used with --verbose.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level override
    ///
    /// Available levels: error, warn, info, debug, trace
    #[arg(long, value_enum, conflicts_with_all = ["verbose", "quiet"])]
    pub log_level: Option<LogLevel>,

    /// Console log format
    #[arg(long, value_enum, env = "CLEDG_LOG_FORMAT", default_value_t = LogFormat::Full)]
    pub log_format: LogFormat,

    /// Also write logs as JSON lines to this file
    #[arg(long, value_name = "FILE", env = "CLEDG_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Validate the configuration (default)
    ///
    /// Resolves every layer, validates the result and prints a summary.
    /// Returns exit code 0 if valid, non-zero if invalid.
    Check,

    /// Print the resolved, validated configuration
    ///
    /// Schema defaults are filled in. In lenient mode unknown keys are
    /// included as they were given.
    Resolve {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// List Kafka topic routes with their messaging parameters
    Routes {
        /// Only list routes of one direction
        #[arg(short, long, value_enum)]
        direction: Option<RouteDirection>,
    },

    /// Print a single configuration value
    ///
    /// Keys are dotted paths. Keys that themselves contain dots, such as
    /// `metadata.broker.list`, are matched as a whole.
    Get {
        /// Dotted key path, e.g. DATABASE.HOST
        #[arg(value_name = "KEY", value_parser = validate_key_path)]
        key: String,
    },
}

/// Environment options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    #[value(name = "development", alias = "dev")]
    Development,
    #[value(name = "test")]
    Test,
    #[value(name = "staging", alias = "stage")]
    Staging,
    #[value(name = "production", alias = "prod")]
    Production,
}

/// Log level options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    #[value(name = "error")]
    Error,
    #[value(name = "warn", alias = "warning")]
    Warn,
    #[value(name = "info")]
    Info,
    #[value(name = "debug")]
    Debug,
    #[value(name = "trace")]
    Trace,
}

/// Console log formats
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Full,
    Compact,
    Json,
}

/// Output formats for `resolve`
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Toml,
}

/// Route direction filter
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteDirection {
    Consumer,
    Producer,
}

impl Cli {
    /// Validate CLI arguments and provide detailed error messages
    ///
    /// This method performs additional validation beyond what clap provides.
    pub fn validate(&self) -> Result<(), String> {
        for (i, overlay) in self.overlays.iter().enumerate() {
            if self.overlays[..i].contains(overlay) {
                return Err(format!(
                    "Overlay '{}' is given more than once",
                    overlay.display()
                ));
            }
            if self.config.as_ref() == Some(overlay) {
                return Err(format!(
                    "Overlay '{}' is also the base configuration file",
                    overlay.display()
                ));
            }
        }

        Ok(())
    }

    /// Effective log level from --log-level, --verbose and --quiet
    pub fn effective_log_level(&self) -> LogLevel {
        match (self.log_level, self.verbose, self.quiet) {
            (Some(level), _, _) => level,
            (None, true, _) => LogLevel::Debug,
            (None, _, true) => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => "error".to_string(),
            LogLevel::Warn => "warn".to_string(),
            LogLevel::Info => "info".to_string(),
            LogLevel::Debug => "debug".to_string(),
            LogLevel::Trace => "trace".to_string(),
        }
    }
}

impl From<Environment> for crate::config::Environment {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Development => crate::config::Environment::Development,
            Environment::Test => crate::config::Environment::Test,
            Environment::Staging => crate::config::Environment::Staging,
            Environment::Production => crate::config::Environment::Production,
        }
    }
}

impl From<LogFormat> for crate::logger::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Full => crate::logger::LogFormat::Full,
            LogFormat::Compact => crate::logger::LogFormat::Compact,
            LogFormat::Json => crate::logger::LogFormat::Json,
        }
    }
}

impl From<RouteDirection> for crate::config::Direction {
    fn from(direction: RouteDirection) -> Self {
        match direction {
            RouteDirection::Consumer => crate::config::Direction::Consumer,
            RouteDirection::Producer => crate::config::Direction::Producer,
        }
    }
}
