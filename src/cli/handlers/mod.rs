//! Command handlers for CLI operations
//!
//! This module contains handlers for different CLI commands,
//! separating command execution logic from parsing and validation.
//! Handlers read from a published snapshot and write to any `Write`.

pub mod check;
pub mod get;
pub mod resolve;
pub mod routes;

pub use check::CheckCommandHandler;
pub use get::GetCommandHandler;
pub use resolve::ResolveCommandHandler;
pub use routes::RoutesCommandHandler;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::config::{ConfigNode, ConfigPublisher, ConfigSchema, ConfigSnapshot, Validator};

    /// Publish a snapshot validated from an inline JSON document
    pub fn snapshot(value: serde_json::Value) -> ConfigSnapshot {
        let schema = ConfigSchema::central_ledger();
        let tree = ConfigNode::from_json(value).unwrap();
        let validated = Validator::new(&schema).validate(&tree).unwrap();
        ConfigPublisher::new().publish(validated).unwrap()
    }

    pub fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }
}
