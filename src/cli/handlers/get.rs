//! Get command handler

use std::io::Write;

use crate::config::{ConfigNode, ConfigSnapshot};
use crate::error::{AppError, AppResult};

/// Handler for the get command
pub struct GetCommandHandler<'a> {
    snapshot: &'a ConfigSnapshot,
}

impl<'a> GetCommandHandler<'a> {
    pub fn new(snapshot: &'a ConfigSnapshot) -> Self {
        Self { snapshot }
    }

    /// Print the value at `key`: scalars as plain text, sections as JSON
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if no value exists at `key`.
    pub fn execute<W: Write>(&self, key: &str, out: &mut W) -> AppResult<()> {
        let node = self
            .snapshot
            .find(key)
            .ok_or_else(|| AppError::not_found(format!("configuration key '{}'", key)))?;

        match node {
            ConfigNode::Scalar(scalar) => writeln!(out, "{}", scalar)?,
            ConfigNode::Mapping(_) => {
                let rendered = serde_json::to_string_pretty(node)
                    .map_err(|e| AppError::from(anyhow::Error::new(e)))?;
                writeln!(out, "{}", rendered)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::handlers::test_support::{output, snapshot};
    use serde_json::json;

    fn sample() -> ConfigSnapshot {
        snapshot(json!({
            "MONGODB": {"HOST": "objstore"},
            "KAFKA": {"CONSUMER": {"BULK": {"GET": {"config": {
                "rdkafkaConf": {"metadata.broker.list": "kafka:29092"}
            }}}}}
        }))
    }

    fn get(snapshot: &ConfigSnapshot, key: &str) -> AppResult<String> {
        let mut buf = Vec::new();
        GetCommandHandler::new(snapshot).execute(key, &mut buf)?;
        Ok(output(buf))
    }

    #[test]
    fn test_get_scalar() {
        let snapshot = sample();
        assert_eq!(get(&snapshot, "MONGODB.HOST").unwrap(), "objstore\n");
        assert_eq!(get(&snapshot, "MONGODB.PORT").unwrap(), "27017\n");
    }

    #[test]
    fn test_get_key_containing_dots() {
        let snapshot = sample();
        let value = get(&snapshot, "KAFKA.CONSUMER.BULK.GET.config.rdkafkaConf.metadata.broker.list").unwrap();
        assert_eq!(value, "kafka:29092\n");
    }

    #[test]
    fn test_get_section_as_json() {
        let snapshot = sample();
        let value: serde_json::Value = serde_json::from_str(&get(&snapshot, "MIGRATIONS").unwrap()).unwrap();
        assert_eq!(value, json!({"DISABLED": false, "RUN_DATA_MIGRATIONS": true}));
    }

    #[test]
    fn test_get_missing_key() {
        let snapshot = sample();
        let err = get(&snapshot, "MONGODB.REPLICA_SET").unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }
}
