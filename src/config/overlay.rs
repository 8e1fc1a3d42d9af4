//! Overlay resolution
//!
//! Merges overlay documents onto a base document key by key. In strict mode an
//! overlay may only use keys the schema declares; in lenient mode unknown keys
//! are passed through with a warning.

use crate::config::document::Document;
use crate::config::error::ConfigError;
use crate::config::node::ConfigNode;
use crate::config::schema::ConfigSchema;
use crate::config::validation::{ValidationError, ValidationErrorKind, ValidationErrors};

/// Schema-aware deep merge of configuration documents
#[derive(Debug, Clone, Copy)]
pub struct OverlayResolver<'a> {
    schema: &'a ConfigSchema,
    strict: bool,
}

impl<'a> OverlayResolver<'a> {
    /// Create a strict resolver
    pub fn new(schema: &'a ConfigSchema) -> Self {
        Self { schema, strict: true }
    }

    /// Enable or disable strict unknown-key checking
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Merge one overlay onto a base document
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::SchemaMismatch` listing every unknown key of the
    /// overlay when running in strict mode.
    pub fn merge(&self, base: ConfigNode, overlay: ConfigNode) -> Result<ConfigNode, ConfigError> {
        self.check_keys(&overlay, "overlay")?;
        Ok(base.merge(overlay))
    }

    /// Apply overlays in order onto a base document; later overlays win
    pub fn resolve<I>(&self, base: Document, overlays: I) -> Result<ConfigNode, ConfigError>
    where
        I: IntoIterator<Item = Document>,
    {
        self.check_keys(&base.root, &base.origin)?;
        tracing::debug!(origin = %base.origin, "using base configuration document");

        overlays.into_iter().try_fold(base.root, |resolved, overlay| {
            self.check_keys(&overlay.root, &overlay.origin)?;
            tracing::debug!(origin = %overlay.origin, "applying configuration overlay");
            Ok(resolved.merge(overlay.root))
        })
    }

    fn check_keys(&self, document: &ConfigNode, origin: &str) -> Result<(), ConfigError> {
        let unknown = self.schema.unknown_keys(document);
        if unknown.is_empty() {
            return Ok(());
        }

        if self.strict {
            let errors: Vec<ValidationError> = unknown
                .into_iter()
                .map(|path| {
                    ValidationError::new(
                        path,
                        ValidationErrorKind::SchemaMismatch,
                        format!("key is not declared by the configuration schema (in {})", origin),
                    )
                })
                .collect();
            return Err(ConfigError::SchemaMismatch(ValidationErrors::from(errors)));
        }

        for path in unknown {
            tracing::warn!(key = %path, origin, "passing through unknown configuration key");
        }
        Ok(())
    }
}
