//! Publication of the validated configuration
//!
//! The configuration is resolved once at startup and frozen into a
//! [`ConfigSnapshot`]. Snapshots are reference counted and never mutated, so
//! they can be cloned into every component and read from any thread.

use std::ops::Deref;
use std::sync::{Arc, OnceLock};

use crate::config::error::ConfigError;
use crate::config::kafka::{MessagingClientParams, TopicRoute};
use crate::config::settings::{DatabaseConfig, MongoDbConfig};
use crate::config::validation::ValidatedConfig;

/// Immutable, shareable view of the published configuration
#[derive(Debug, Clone)]
pub struct ConfigSnapshot(Arc<ValidatedConfig>);

impl ConfigSnapshot {
    /// Database-driver parameters
    pub fn database(&self) -> &DatabaseConfig {
        &self.settings().database
    }

    /// Object-store parameters, `None` when `MONGODB.DISABLED` is set
    pub fn object_store(&self) -> Option<&MongoDbConfig> {
        self.settings().object_store()
    }

    pub fn routes(&self) -> Vec<TopicRoute> {
        self.settings().kafka.routes()
    }

    /// Messaging-client parameters for one route
    pub fn client_params(&self, route: &TopicRoute) -> Option<MessagingClientParams> {
        self.settings().kafka.client_params(route)
    }

    /// Whether two snapshots share the same published configuration
    pub fn ptr_eq(&self, other: &ConfigSnapshot) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for ConfigSnapshot {
    type Target = ValidatedConfig;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Publishes a validated configuration exactly once
#[derive(Debug, Default)]
pub struct ConfigPublisher {
    snapshot: OnceLock<ConfigSnapshot>,
}

impl ConfigPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Freeze `validated` as the published snapshot
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::AlreadyPublished` if a snapshot was already
    /// published; the existing snapshot is left untouched.
    pub fn publish(&self, validated: ValidatedConfig) -> Result<ConfigSnapshot, ConfigError> {
        let snapshot = ConfigSnapshot(Arc::new(validated));
        self.snapshot
            .set(snapshot.clone())
            .map_err(|_| ConfigError::AlreadyPublished)?;

        tracing::info!(
            routes = snapshot.routes().len(),
            object_store = snapshot.object_store().is_some(),
            "configuration published"
        );
        Ok(snapshot)
    }

    /// The published snapshot, if any
    pub fn snapshot(&self) -> Option<ConfigSnapshot> {
        self.snapshot.get().cloned()
    }

    pub fn is_published(&self) -> bool {
        self.snapshot.get().is_some()
    }
}
