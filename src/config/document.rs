//! Configuration document sources
//!
//! Documents come from JSON or TOML files, chosen by file extension, or from
//! `CLEDG_*` environment variables.

use std::path::Path;

use crate::config::error::ConfigError;
use crate::config::node::{ConfigNode, KeyPath};
use crate::config::schema::ConfigSchema;

/// Prefix of environment variables mapped onto configuration keys
pub const ENV_PREFIX: &str = "CLEDG_";

/// Separator for nested keys in environment variable names
pub const ENV_SEPARATOR: &str = "__";

/// Environment variables read by the loader or the CLI, never treated as keys
const RESERVED_ENV_VARS: &[&str] = &[
    "CLEDG_CONFIG_DIR",
    "CLEDG_CONFIG_FILE",
    "CLEDG_ENV",
    "CLEDG_LOG_FILE",
    "CLEDG_LOG_FORMAT",
];

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Toml,
}

impl DocumentFormat {
    /// File extensions probed when looking up a document by stem, in order
    pub const EXTENSIONS: &'static [&'static str] = &["json", "toml"];

    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(DocumentFormat::Json),
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(DocumentFormat::Toml),
            _ => Err(ConfigError::UnsupportedFormat(format!(
                "{} (expected a .json or .toml file)",
                path.display()
            ))),
        }
    }
}

/// A parsed configuration document and where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub origin: String,
    pub root: ConfigNode,
}

impl Document {
    pub fn new<S: Into<String>>(origin: S, root: ConfigNode) -> Self {
        Self {
            origin: origin.into(),
            root,
        }
    }

    /// Parse document text in the given format
    pub fn parse(text: &str, format: DocumentFormat, origin: &str) -> Result<Self, ConfigError> {
        let root = match format {
            DocumentFormat::Json => {
                let value: serde_json::Value = serde_json::from_str(text)
                    .map_err(|e| ConfigError::ParseError(format!("{}: {}", origin, e)))?;
                if !value.is_object() {
                    return Err(ConfigError::ParseError(format!(
                        "{}: top-level value must be an object",
                        origin
                    )));
                }
                ConfigNode::from_json(value)
            }
            DocumentFormat::Toml => {
                let table: toml::Table = toml::from_str(text)
                    .map_err(|e| ConfigError::ParseError(format!("{}: {}", origin, e)))?;
                ConfigNode::from_toml(table)
            }
        }
        .map_err(|e| match e {
            ConfigError::ParseError(msg) => ConfigError::ParseError(format!("{}: {}", origin, msg)),
            other => other,
        })?;

        Ok(Self::new(origin, root))
    }

    /// Read and parse a document file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let format = DocumentFormat::from_path(path)?;
        if !path.exists() {
            return Err(ConfigError::file_not_found(path.display().to_string()));
        }
        let text = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::ParseError(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::parse(&text, format, &path.display().to_string())
    }

    /// Find `{dir}/{stem}.json` or `{dir}/{stem}.toml`
    ///
    /// Returns `Ok(None)` when neither exists and an error when both do.
    pub fn load_stem(dir: &Path, stem: &str) -> Result<Option<Self>, ConfigError> {
        let candidates: Vec<_> = DocumentFormat::EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("{}.{}", stem, ext)))
            .filter(|path| path.is_file())
            .collect();

        match candidates.as_slice() {
            [] => Ok(None),
            [path] => Self::load(path).map(Some),
            _ => Err(ConfigError::mutual_exclusivity(format!(
                "Both {stem}.json and {stem}.toml exist in {}; keep only one",
                dir.display()
            ))),
        }
    }

    /// Build an overlay from `CLEDG_*` environment variables
    ///
    /// `CLEDG_MONGODB__PORT=27018` maps to `MONGODB.PORT = 27018`. Values of
    /// string fields are kept verbatim; everything else is parsed as boolean,
    /// integer or float when possible. Returns `None` when no variable applies.
    pub fn from_env_vars<I>(vars: I, schema: &ConfigSchema) -> Result<Option<Self>, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut root = ConfigNode::empty();
        let mut applied = 0usize;

        let mut vars: Vec<(String, String)> = vars
            .into_iter()
            .filter(|(name, _)| name.starts_with(ENV_PREFIX) && !RESERVED_ENV_VARS.contains(&name.as_str()))
            .collect();
        // Parents before children so `A__B` cannot be clobbered by `A`.
        vars.sort();

        for (name, value) in vars {
            let key = &name[ENV_PREFIX.len()..];
            let segments: Vec<&str> = key.split(ENV_SEPARATOR).collect();
            if segments.iter().any(|s| s.is_empty()) {
                return Err(ConfigError::EnvVarError(format!(
                    "{} does not map to a configuration key",
                    name
                )));
            }
            if value.is_empty() {
                continue;
            }
            let path = KeyPath::from_segments(segments);
            let scalar = schema.scalar_for(&path, &value);
            root.insert_path(&path, ConfigNode::Scalar(scalar));
            applied += 1;
        }

        if applied == 0 {
            return Ok(None);
        }
        Ok(Some(Self::new("environment", root)))
    }
}
