//! Configuration loader for central-ledger
//!
//! This module provides the `ConfigLoader` struct that collects configuration
//! documents from every source, resolves them in precedence order and
//! validates the result.

use std::path::{Path, PathBuf};

use crate::config::document::Document;
use crate::config::environment::Environment;
use crate::config::error::ConfigError;
use crate::config::node::ConfigNode;
use crate::config::overlay::OverlayResolver;
use crate::config::schema::ConfigSchema;
use crate::config::validation::{ValidatedConfig, Validator};

/// Environment variable for configuration directory
const CONFIG_DIR_ENV: &str = "CLEDG_CONFIG_DIR";

/// Environment variable for specific configuration file
const CONFIG_FILE_ENV: &str = "CLEDG_CONFIG_FILE";

/// Default configuration directory
const DEFAULT_CONFIG_DIR: &str = "config";

/// Configuration loader that handles layered configuration loading
///
/// The loader supports the following configuration sources (in order of priority):
/// 1. Schema defaults
/// 2. `default.{json,toml}` - Base configuration (required), or a single file
///    given by `CLEDG_CONFIG_FILE`
/// 3. `{environment}.{json,toml}` - Environment-specific configuration (optional)
/// 4. `local.{json,toml}` - Local overrides (optional)
/// 5. Explicit overlay files, in the order given
/// 6. `CLEDG_*` environment variables (highest priority)
#[derive(Debug)]
pub struct ConfigLoader {
    /// Configuration directory path
    config_dir: PathBuf,
    /// Specific configuration file path (if set, skips layered loading)
    config_file: Option<PathBuf>,
    /// Current deployment environment
    environment: Environment,
    /// Extra overlay files applied after the directory layers
    overlays: Vec<PathBuf>,
    /// Reject unknown keys instead of passing them through
    strict: bool,
    /// Apply `CLEDG_*` environment overrides
    use_env: bool,
    schema: ConfigSchema,
}

impl ConfigLoader {
    /// Create a new configuration loader
    ///
    /// This reads environment variables to determine:
    /// - Configuration directory (`CLEDG_CONFIG_DIR`)
    /// - Specific configuration file (`CLEDG_CONFIG_FILE`)
    /// - Deployment environment (`CLEDG_ENV`)
    ///
    /// # Errors
    ///
    /// Returns an error if both `CLEDG_CONFIG_DIR` and `CLEDG_CONFIG_FILE` are set,
    /// as they are mutually exclusive.
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir_env = std::env::var(CONFIG_DIR_ENV).ok();
        let config_file = std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from);

        if config_file.is_some() && config_dir_env.is_some() {
            return Err(ConfigError::mutual_exclusivity(
                "CLEDG_CONFIG_DIR and CLEDG_CONFIG_FILE cannot both be set. \
                 Use CLEDG_CONFIG_DIR for layered configuration or \
                 CLEDG_CONFIG_FILE for a single configuration file.",
            ));
        }

        Ok(Self {
            config_dir: config_dir_env
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR)),
            config_file,
            environment: Environment::from_env(),
            overlays: Vec::new(),
            strict: true,
            use_env: true,
            schema: ConfigSchema::central_ledger(),
        })
    }

    /// Use layered loading from `dir`, clearing any single-file selection
    pub fn with_config_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config_dir = dir.into();
        self.config_file = None;
        self
    }

    /// Load only `file` as the base document
    pub fn with_config_file<P: Into<PathBuf>>(mut self, file: P) -> Self {
        self.config_file = Some(file.into());
        self
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Append overlay files, applied in order after the directory layers
    pub fn with_overlays<I, P>(mut self, overlays: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.overlays.extend(overlays.into_iter().map(Into::into));
        self
    }

    /// Enable or disable strict unknown-key checking
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Enable or disable `CLEDG_*` environment overrides
    pub fn env_overrides(mut self, enabled: bool) -> Self {
        self.use_env = enabled;
        self
    }

    /// Get the current deployment environment
    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Get the configuration directory path
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_file(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }

    pub fn schema(&self) -> &ConfigSchema {
        &self.schema
    }

    /// Resolve all sources into one tree without validating it
    ///
    /// # Errors
    ///
    /// Returns an error if a required document is missing, a document cannot
    /// be parsed, or (in strict mode) a document contains unknown keys.
    pub fn resolve(&self) -> Result<ConfigNode, ConfigError> {
        let base = Document::new("schema defaults", self.schema.default_document());
        let overlays = self.documents()?;

        tracing::info!(
            environment = %self.environment,
            layers = overlays.len(),
            strict = self.strict,
            "resolving configuration"
        );

        OverlayResolver::new(&self.schema)
            .strict(self.strict)
            .resolve(base, overlays)
    }

    /// Resolve and validate configuration from all sources
    ///
    /// If a single configuration file is selected, loads only that file plus
    /// explicit overlays and environment overrides. Otherwise, performs layered
    /// loading from the configuration directory.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `default.{json,toml}` is not found (when using layered loading)
    /// - Configuration parsing fails
    /// - Configuration validation fails
    pub fn load(&self) -> Result<ValidatedConfig, ConfigError> {
        let resolved = self.resolve()?;
        Validator::new(&self.schema).validate(&resolved).map_err(|errors| {
            for error in &errors {
                tracing::error!(path = %error.path, kind = error.kind.as_str(), "{}", error.reason);
            }
            ConfigError::Validation(errors)
        })
    }

    /// Collect every document above the schema defaults, lowest precedence first
    fn documents(&self) -> Result<Vec<Document>, ConfigError> {
        let mut documents = match &self.config_file {
            // Single file mode
            Some(config_file) => vec![Document::load(config_file)?],
            // Layered loading mode
            None => self.layered_documents()?,
        };

        for overlay in &self.overlays {
            documents.push(Document::load(overlay)?);
        }

        if self.use_env {
            let vars = std::env::vars_os()
                .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)));
            documents.extend(Document::from_env_vars(vars, &self.schema)?);
        }

        Ok(documents)
    }

    fn layered_documents(&self) -> Result<Vec<Document>, ConfigError> {
        // 1. default.{json,toml} (required)
        let default = Document::load_stem(&self.config_dir, "default")?.ok_or_else(|| {
            ConfigError::file_not_found(format!(
                "Required configuration file not found: {}",
                self.config_dir.join("default.{json,toml}").display()
            ))
        })?;

        let mut documents = vec![default];

        // 2. {environment}.{json,toml} (optional)
        documents.extend(Document::load_stem(&self.config_dir, self.environment.as_str())?);

        // 3. local.{json,toml} (optional)
        documents.extend(Document::load_stem(&self.config_dir, "local")?);

        Ok(documents)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| Self {
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            config_file: None,
            environment: Environment::default(),
            overlays: Vec::new(),
            strict: true,
            use_env: true,
            schema: ConfigSchema::central_ledger(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::kafka::{CompressionCodec, Direction, TopicRoute};
    use crate::config::validation::ValidationErrorKind;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Global mutex to ensure tests run sequentially to avoid env var conflicts
    static TEST_MUTEX: Mutex<()> = Mutex::new(());

    const DEFAULT_CONFIG: &str = r#"{
  "HOSTNAME": "http://central-ledger",
  "DATABASE": {"HOST": "localhost", "PORT": 3306},
  "MONGODB": {"HOST": "localhost", "DATABASE": "mlos"},
  "KAFKA": {
    "PRODUCER": {
      "TRANSFER": {
        "PREPARE": {
          "config": {
            "options": {"sync": false},
            "rdkafkaConf": {"metadata.broker.list": "localhost:9092"}
          }
        }
      }
    }
  }
}"#;

    /// Helper to create a temporary config directory with files
    fn setup_config_dir(files: &[(&str, &str)]) -> TempDir {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        for (name, content) in files {
            let path = temp_dir.path().join(name);
            fs::write(&path, content).expect("Failed to write config file");
        }
        temp_dir
    }

    /// Helper to safely set environment variables for a test
    struct EnvGuard {
        vars_to_restore: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        fn new() -> Self {
            Self {
                vars_to_restore: Vec::new(),
            }
        }

        fn set(&mut self, key: &str, value: &str) {
            let original = std::env::var(key).ok();
            self.vars_to_restore.push((key.to_string(), original));
            unsafe {
                std::env::set_var(key, value);
            }
        }

        fn remove(&mut self, key: &str) {
            let original = std::env::var(key).ok();
            self.vars_to_restore.push((key.to_string(), original));
            unsafe {
                std::env::remove_var(key);
            }
        }

        /// Clear every variable the loader reads
        fn clear_loader_vars(&mut self) {
            self.remove(CONFIG_DIR_ENV);
            self.remove(CONFIG_FILE_ENV);
            self.remove(Environment::ENV_VAR);
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, original_value) in &self.vars_to_restore {
                unsafe {
                    match original_value {
                        Some(value) => std::env::set_var(key, value),
                        None => std::env::remove_var(key),
                    }
                }
            }
        }
    }

    fn repo_config_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("config")
    }

    #[test]
    fn test_config_loader_new_default() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        env.clear_loader_vars();

        let loader = ConfigLoader::new().expect("Should create loader");
        assert_eq!(loader.config_dir(), Path::new("config"));
        assert!(loader.config_file().is_none());
        assert_eq!(loader.environment(), Environment::Development);
    }

    #[test]
    fn test_config_loader_with_config_file() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        env.clear_loader_vars();
        env.set(CONFIG_FILE_ENV, "/path/to/config.json");

        let loader = ConfigLoader::new().expect("Should create loader");
        assert_eq!(loader.config_file(), Some(Path::new("/path/to/config.json")));
    }

    #[test]
    fn test_config_loader_mutual_exclusivity_error() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        env.set(CONFIG_DIR_ENV, "/custom/config");
        env.set(CONFIG_FILE_ENV, "/path/to/config.json");

        match ConfigLoader::new() {
            Err(ConfigError::MutualExclusivityError(msg)) => {
                assert!(msg.contains("CLEDG_CONFIG_DIR"));
                assert!(msg.contains("CLEDG_CONFIG_FILE"));
            }
            other => panic!("Expected MutualExclusivityError, got {:?}", other),
        }
    }

    #[test]
    fn test_config_loader_environment_from_env() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        env.clear_loader_vars();
        env.set(Environment::ENV_VAR, "prod");

        let loader = ConfigLoader::new().expect("Should create loader");
        assert_eq!(loader.environment(), Environment::Production);
    }

    #[test]
    fn test_load_missing_default_document() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        env.clear_loader_vars();

        let temp_dir = setup_config_dir(&[]);
        let result = ConfigLoader::new()
            .unwrap()
            .with_config_dir(temp_dir.path())
            .env_overrides(false)
            .load();

        match result {
            Err(ConfigError::FileNotFound(msg)) => assert!(msg.contains("default")),
            other => panic!("Expected FileNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_default_only_fills_schema_defaults() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        env.clear_loader_vars();

        let temp_dir = setup_config_dir(&[("default.json", DEFAULT_CONFIG)]);
        let config = ConfigLoader::new()
            .unwrap()
            .with_config_dir(temp_dir.path())
            .env_overrides(false)
            .load()
            .expect("Should load configuration");

        let settings = config.settings();
        assert_eq!(settings.port, 3001);
        assert_eq!(settings.database.pool_max_size, 30);
        assert_eq!(
            config
                .find("KAFKA.PRODUCER.TRANSFER.PREPARE.config.rdkafkaConf.event_cb")
                .and_then(ConfigNode::as_bool),
            Some(true)
        );
    }

    #[test]
    fn test_load_full_precedence_chain() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        env.clear_loader_vars();

        let staging = r#"
[DATABASE]
HOST = "mysql-staging"
PORT = 3307

[MONGODB]
HOST = "objstore-staging"
"#;
        let local = r#"{"DATABASE": {"HOST": "mysql-local"}, "MONGODB": {"USER": "dev"}}"#;
        let overlay = r#"{"MONGODB": {"USER": "overlay", "PASSWORD": "secret"}}"#;

        let temp_dir = setup_config_dir(&[
            ("default.json", DEFAULT_CONFIG),
            ("staging.toml", staging),
            ("local.json", local),
            ("extra.json", overlay),
        ]);
        env.set("CLEDG_MONGODB__PASSWORD", "from-env");

        let config = ConfigLoader::new()
            .unwrap()
            .with_config_dir(temp_dir.path())
            .with_environment(Environment::Staging)
            .with_overlays([temp_dir.path().join("extra.json")])
            .load()
            .expect("Should load configuration");

        let settings = config.settings();
        // environment document over default
        assert_eq!(settings.database.port, 3307);
        assert_eq!(settings.mongodb.host, "objstore-staging");
        // local over environment document
        assert_eq!(settings.database.host, "mysql-local");
        // explicit overlay over local
        assert_eq!(settings.mongodb.user, "overlay");
        // environment variables over everything
        assert_eq!(settings.mongodb.password, "from-env");
    }

    #[test]
    fn test_env_overrides_can_be_disabled() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        env.clear_loader_vars();
        env.set("CLEDG_PORT", "4000");

        let temp_dir = setup_config_dir(&[("default.json", DEFAULT_CONFIG)]);
        let loader = ConfigLoader::new().unwrap().with_config_dir(temp_dir.path());

        assert_eq!(loader.load().unwrap().settings().port, 4000);
        assert_eq!(loader.env_overrides(false).load().unwrap().settings().port, 3001);
    }

    #[test]
    fn test_env_numeric_password_stays_text() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        env.clear_loader_vars();
        env.set("CLEDG_DATABASE__PASSWORD", "123456");
        env.set("CLEDG_MONGODB__USER", "true");

        let temp_dir = setup_config_dir(&[("default.json", DEFAULT_CONFIG)]);
        let config = ConfigLoader::new()
            .unwrap()
            .with_config_dir(temp_dir.path())
            .load()
            .expect("numeric-looking strings should validate");

        assert_eq!(config.settings().database.password, "123456");
        assert_eq!(config.settings().mongodb.user, "true");
    }

    #[test]
    fn test_load_single_file_mode() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        env.clear_loader_vars();

        let single = r#"
HOSTNAME = "http://single"

[DATABASE]
HOST = "mysql-single"
"#;
        let temp_dir = setup_config_dir(&[("single.toml", single), ("local.json", r#"{"PORT": 1}"#)]);
        env.set(CONFIG_FILE_ENV, temp_dir.path().join("single.toml").to_str().unwrap());

        let config = ConfigLoader::new()
            .unwrap()
            .env_overrides(false)
            .load()
            .expect("Should load configuration");

        assert_eq!(config.settings().hostname, "http://single");
        assert_eq!(config.settings().database.host, "mysql-single");
        // directory layers are skipped in single-file mode
        assert_eq!(config.settings().port, 3001);
    }

    #[test]
    fn test_strict_load_rejects_unknown_keys() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        env.clear_loader_vars();

        let temp_dir = setup_config_dir(&[
            ("default.json", DEFAULT_CONFIG),
            ("local.json", r#"{"SIDECAR": {"ENABLED": true}}"#),
        ]);
        let loader = ConfigLoader::new()
            .unwrap()
            .with_config_dir(temp_dir.path())
            .env_overrides(false);

        let err = loader.resolve().unwrap_err();
        assert!(matches!(err, ConfigError::SchemaMismatch(_)));

        let config = loader.strict(false).load().expect("lenient load passes keys through");
        assert_eq!(config.find("SIDECAR.ENABLED").and_then(ConfigNode::as_bool), Some(true));
    }

    #[test]
    fn test_load_reports_every_validation_error() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        env.clear_loader_vars();

        let temp_dir = setup_config_dir(&[
            ("default.json", DEFAULT_CONFIG),
            ("local.json", r#"{"HOSTNAME": 42, "MONGODB": {"PORT": -1}}"#),
        ]);
        let err = ConfigLoader::new()
            .unwrap()
            .with_config_dir(temp_dir.path())
            .env_overrides(false)
            .load()
            .unwrap_err();

        let errors = err.errors().expect("validation carries errors");
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.of_kind(ValidationErrorKind::TypeMismatch).count(), 1);
        assert_eq!(errors.of_kind(ValidationErrorKind::RangeViolation).count(), 1);
    }

    #[test]
    fn test_central_handlers_overlay() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        env.clear_loader_vars();

        let config_dir = repo_config_dir();
        let config = ConfigLoader::new()
            .unwrap()
            .with_config_dir(&config_dir)
            .with_environment(Environment::Test)
            .with_overlays([config_dir.join("central-handlers.json")])
            .env_overrides(false)
            .load()
            .expect("central-handlers overlay should validate");

        let routes = config.settings().kafka.routes();
        let consumers = routes.iter().filter(|r| r.direction == Direction::Consumer).count();
        let producers = routes.iter().filter(|r| r.direction == Direction::Producer).count();
        assert_eq!(consumers, 9);
        assert_eq!(producers, 6);

        let settings = config.settings();
        assert_eq!(settings.database.host, "mysql-cl");
        assert!(settings.migrations.disabled);
        assert!(settings.object_store().is_none());

        let prepare = TopicRoute::new(Direction::Producer, "TRANSFER", "PREPARE");
        let params = settings.kafka.client_params(&prepare).unwrap();
        assert!(params.sync);
        assert_eq!(params.buffer_limit, Some(10_000_000));
        assert_eq!(params.compression_codec, Some(CompressionCodec::Lz4));
        assert_eq!(params.broker_list[0].to_string(), "kafka:29092");

        let bulk = TopicRoute::new(Direction::Consumer, "BULK", "PREPARE");
        assert!(!settings.kafka.client_params(&bulk).unwrap().sync);
    }
}
