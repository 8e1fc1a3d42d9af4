//! CLI module for ledger-config
//!
//! This module provides command-line interface functionality including:
//! - Argument parsing with clap
//! - Building the configuration loader and logger from CLI arguments
//! - Command execution and validation
//! - Command handlers for check, resolve, routes and get

pub mod executor;
pub mod handlers;
pub mod parser;
pub mod validation;

// Re-export public types for convenience
pub use executor::execute_command;
pub use parser::{Cli, Commands, Environment, LogLevel, OutputFormat};

use crate::config::{ConfigError, ConfigLoader};
use crate::logger::{ConsoleConfig, FileConfig, LoggerConfig, LoggerConfigBuilder, init_logger};

/// Build the configuration loader from CLI arguments
///
/// CLI arguments take precedence over `CLEDG_CONFIG_DIR`, `CLEDG_CONFIG_FILE`
/// and `CLEDG_ENV`.
///
/// # Errors
/// Returns error if both `CLEDG_CONFIG_DIR` and `CLEDG_CONFIG_FILE` are set
/// and neither is overridden on the command line.
pub fn build_loader(cli: &Cli) -> Result<ConfigLoader, ConfigError> {
    let mut loader = match ConfigLoader::new() {
        Ok(loader) => loader,
        Err(ConfigError::MutualExclusivityError(_)) if cli.config.is_some() || cli.config_dir.is_some() => {
            ConfigLoader::default()
        }
        Err(e) => return Err(e),
    };

    if let Some(dir) = &cli.config_dir {
        loader = loader.with_config_dir(dir);
    }
    if let Some(file) = &cli.config {
        loader = loader.with_config_file(file);
    }
    if let Some(env) = cli.env {
        loader = loader.with_environment(env.into());
    }

    Ok(loader
        .with_overlays(cli.overlays.iter().cloned())
        .strict(!cli.lenient)
        .env_overrides(!cli.no_env))
}

/// Logger configuration from CLI arguments
pub fn logger_config(cli: &Cli) -> anyhow::Result<LoggerConfig> {
    let console = ConsoleConfig::default().with_format(cli.log_format.into());
    let file = match &cli.log_file {
        Some(path) => FileConfig::at(path),
        None => FileConfig::default(),
    };

    Ok(LoggerConfigBuilder::new()
        .level(cli.effective_log_level())
        .console(console)
        .file(file)
        .build()?)
}

/// Initialize the global logger from CLI arguments
pub fn init_logger_from_cli(cli: &Cli) -> anyhow::Result<()> {
    init_logger(logger_config(cli)?)
}
