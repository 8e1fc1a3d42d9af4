//! Check command handler
//!
//! Prints a summary of a configuration that passed validation.

use std::io::Write;

use crate::config::{ConfigSnapshot, Direction, Environment};
use crate::error::AppResult;

/// Handler for the check command
pub struct CheckCommandHandler<'a> {
    snapshot: &'a ConfigSnapshot,
    environment: Environment,
}

impl<'a> CheckCommandHandler<'a> {
    pub fn new(snapshot: &'a ConfigSnapshot, environment: Environment) -> Self {
        Self {
            snapshot,
            environment,
        }
    }

    /// Write the validation summary
    ///
    /// Credentials are never printed.
    pub fn execute<W: Write>(&self, out: &mut W) -> AppResult<()> {
        let settings = self.snapshot.settings();
        let database = self.snapshot.database();
        let routes = self.snapshot.routes();
        let consumers = routes.iter().filter(|r| r.direction == Direction::Consumer).count();
        let producers = routes.len() - consumers;

        writeln!(out, "✓ Configuration is valid")?;
        writeln!(out, "  environment:  {}", self.environment)?;
        writeln!(out, "  hostname:     {}:{}", settings.hostname, settings.port)?;
        writeln!(
            out,
            "  database:     {} {}:{}/{} (pool {}-{})",
            database.dialect,
            database.host,
            database.port,
            database.schema,
            database.pool_min_size,
            database.pool_max_size
        )?;
        match self.snapshot.object_store() {
            Some(store) => writeln!(out, "  object store: {}:{}/{}", store.host, store.port, store.database)?,
            None => writeln!(out, "  object store: disabled")?,
        }
        writeln!(
            out,
            "  migrations:   {}",
            if settings.migrations.disabled { "disabled" } else { "enabled" }
        )?;
        writeln!(out, "  routes:       {} consumer, {} producer", consumers, producers)?;
        Ok(())
    }
}
