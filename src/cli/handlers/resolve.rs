//! Resolve command handler
//!
//! Prints the validated configuration tree as JSON or TOML.

use std::io::Write;

use crate::cli::parser::OutputFormat;
use crate::config::ConfigSnapshot;
use crate::error::{AppError, AppResult};

/// Handler for the resolve command
pub struct ResolveCommandHandler<'a> {
    snapshot: &'a ConfigSnapshot,
}

impl<'a> ResolveCommandHandler<'a> {
    pub fn new(snapshot: &'a ConfigSnapshot) -> Self {
        Self { snapshot }
    }

    pub fn execute<W: Write>(&self, format: OutputFormat, out: &mut W) -> AppResult<()> {
        let tree = self.snapshot.tree();
        let rendered = match format {
            OutputFormat::Json => serde_json::to_string_pretty(tree)
                .map_err(|e| AppError::from(anyhow::Error::new(e).context("Failed to render JSON")))?,
            OutputFormat::Toml => toml::to_string_pretty(tree)
                .map_err(|e| AppError::from(anyhow::Error::new(e).context("Failed to render TOML")))?,
        };

        writeln!(out, "{}", rendered.trim_end())?;
        Ok(())
    }
}
