//! Configuration management module for central-ledger
//!
//! This module resolves the ledger configuration from layered documents,
//! validates it against a declarative schema and publishes an immutable
//! snapshot for the rest of the process.
//!
//! # Configuration Priority (lowest to highest)
//! 1. Schema defaults
//! 2. `default.{json,toml}` - Base configuration
//! 3. `{environment}.{json,toml}` - Environment-specific configuration
//! 4. `local.{json,toml}` - Local overrides (not committed to version control)
//! 5. Overlay files passed explicitly, in order
//! 6. `CLEDG_*` environment variables

pub mod document;
pub mod environment;
pub mod error;
pub mod kafka;
pub mod loader;
pub mod node;
pub mod overlay;
pub mod publisher;
pub mod schema;
pub mod settings;
pub mod validation;

// Re-export public types
pub use document::{Document, DocumentFormat};
pub use environment::Environment;
pub use error::ConfigError;
pub use kafka::{BrokerAddress, CompressionCodec, Direction, MessagingClientParams, TopicRoute};
pub use loader::ConfigLoader;
pub use node::{ConfigNode, KeyPath, Scalar};
pub use overlay::OverlayResolver;
pub use publisher::{ConfigPublisher, ConfigSnapshot};
pub use schema::ConfigSchema;
pub use settings::{DatabaseConfig, KafkaConfig, LedgerSettings, MongoDbConfig};
pub use validation::{
    ValidatedConfig, ValidationError, ValidationErrorKind, ValidationErrors, Validator,
};
