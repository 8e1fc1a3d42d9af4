//! Command executor for dispatching CLI commands
//!
//! This module provides the main entry point for executing CLI commands
//! after parsing: it loads and publishes the configuration once, then hands
//! the snapshot to the command handler.

use std::io::Write;

use super::handlers::{
    CheckCommandHandler, GetCommandHandler, ResolveCommandHandler, RoutesCommandHandler,
};
use super::parser::{Cli, Commands};
use crate::config::{ConfigLoader, ConfigPublisher};
use crate::error::{AppError, AppResult};

/// Execute a CLI command against the configuration described by `loader`
///
/// # Errors
/// Returns argument validation errors, configuration errors (including every
/// validation failure) and output errors.
pub fn execute_command<W: Write>(cli: &Cli, loader: &ConfigLoader, out: &mut W) -> AppResult<()> {
    cli.validate()
        .map_err(|reason| AppError::validation("cli_arguments", reason))?;

    let publisher = ConfigPublisher::new();
    let snapshot = publisher.publish(loader.load()?)?;

    match cli.command.as_ref().unwrap_or(&Commands::Check) {
        Commands::Check => CheckCommandHandler::new(&snapshot, loader.environment()).execute(out),
        Commands::Resolve { format } => ResolveCommandHandler::new(&snapshot).execute(*format, out),
        Commands::Routes { direction } => {
            RoutesCommandHandler::new(&snapshot).execute(direction.map(Into::into), out)
        }
        Commands::Get { key } => GetCommandHandler::new(&snapshot).execute(key, out),
    }
}
