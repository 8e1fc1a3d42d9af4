//! Configuration tree representation
//!
//! Every configuration document (the base document, file overlays and the
//! environment overlay) is parsed into a [`ConfigNode`] tree: a scalar leaf or a
//! mapping from string keys to further nodes.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::config::error::ConfigError;

/// Mapping type used for configuration sections
pub type Mapping = BTreeMap<String, ConfigNode>;

/// A scalar configuration value
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl Scalar {
    /// Human-readable name of the scalar type, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::String(_) => "string",
            Scalar::Integer(_) => "integer",
            Scalar::Float(_) => "float",
            Scalar::Boolean(_) => "boolean",
        }
    }

    /// Parse an untyped string (environment variable) into the narrowest scalar
    pub fn parse_untyped(raw: &str) -> Self {
        match raw {
            "true" => return Scalar::Boolean(true),
            "false" => return Scalar::Boolean(false),
            _ => {}
        }
        if let Ok(i) = raw.parse::<i64>() {
            return Scalar::Integer(i);
        }
        if let Ok(f) = raw.parse::<f64>()
            && f.is_finite()
        {
            return Scalar::Float(f);
        }
        Scalar::String(raw.to_string())
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            Scalar::String(s) => serde_json::Value::String(s.clone()),
            Scalar::Integer(i) => serde_json::Value::from(*i),
            Scalar::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Scalar::Boolean(b) => serde_json::Value::Bool(*b),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::String(s) => write!(f, "{}", s),
            Scalar::Integer(i) => write!(f, "{}", i),
            Scalar::Float(v) => write!(f, "{}", v),
            Scalar::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::String(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::String(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Integer(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Integer(i64::from(value))
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Boolean(value)
    }
}

/// Path of keys from the document root to a node
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyPath(Vec<String>);

impl KeyPath {
    /// The empty path addressing the document root
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Build a path from individual segments
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Return a new path extended by one key
    pub fn child(&self, key: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(key.to_string());
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "<root>");
        }
        write!(f, "{}", self.0.join("."))
    }
}

/// A node of a configuration tree
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigNode {
    Scalar(Scalar),
    Mapping(Mapping),
}

impl ConfigNode {
    /// An empty mapping
    pub fn empty() -> Self {
        ConfigNode::Mapping(Mapping::new())
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            ConfigNode::Mapping(map) => Some(map),
            ConfigNode::Scalar(_) => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            ConfigNode::Scalar(scalar) => Some(scalar),
            ConfigNode::Mapping(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigNode::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigNode::Scalar(Scalar::Boolean(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigNode::Scalar(Scalar::Integer(i)) => Some(*i),
            _ => None,
        }
    }

    /// Type name of this node, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            ConfigNode::Scalar(scalar) => scalar.type_name(),
            ConfigNode::Mapping(_) => "mapping",
        }
    }

    /// Look up a node by exact key segments
    pub fn get<S: AsRef<str>>(&self, segments: &[S]) -> Option<&ConfigNode> {
        segments.iter().try_fold(self, |node, key| {
            node.as_mapping().and_then(|map| map.get(key.as_ref()))
        })
    }

    /// Look up a node by a dotted path
    ///
    /// Keys may contain dots themselves (`metadata.broker.list`), so segment
    /// boundaries are resolved against the keys actually present, preferring
    /// the longest matching key at each level.
    pub fn find(&self, dotted: &str) -> Option<&ConfigNode> {
        if dotted.is_empty() {
            return Some(self);
        }
        let map = self.as_mapping()?;
        if let Some(node) = map.get(dotted) {
            return Some(node);
        }
        map.iter()
            .filter(|(key, _)| {
                dotted.len() > key.len()
                    && dotted.starts_with(key.as_str())
                    && dotted.as_bytes()[key.len()] == b'.'
            })
            .max_by_key(|(key, _)| key.len())
            .and_then(|(key, node)| node.find(&dotted[key.len() + 1..]))
    }

    /// Set a value at the given path, creating intermediate mappings
    ///
    /// A scalar found on the way is replaced by a mapping.
    pub fn insert_path(&mut self, path: &KeyPath, value: ConfigNode) {
        let Some((last, parents)) = path.segments().split_last() else {
            *self = value;
            return;
        };
        let mut node = self;
        for key in parents {
            node = node.ensure_mapping().entry(key.clone()).or_insert_with(ConfigNode::empty);
        }
        node.ensure_mapping().insert(last.clone(), value);
    }

    fn ensure_mapping(&mut self) -> &mut Mapping {
        if !matches!(self, ConfigNode::Mapping(_)) {
            *self = ConfigNode::empty();
        }
        match self {
            ConfigNode::Mapping(map) => map,
            ConfigNode::Scalar(_) => unreachable!("node was just replaced by a mapping"),
        }
    }

    /// Deep-merge `overlay` onto `self`
    ///
    /// For every key of the overlay: when both values are mappings the merge
    /// recurses, otherwise the overlay value replaces the base value wholesale.
    /// A non-mapping overlay replaces the whole base.
    pub fn merge(self, overlay: ConfigNode) -> ConfigNode {
        match (self, overlay) {
            (ConfigNode::Mapping(mut base), ConfigNode::Mapping(overlay)) => {
                for (key, value) in overlay {
                    let merged = match base.remove(&key) {
                        Some(existing) => existing.merge(value),
                        None => value,
                    };
                    base.insert(key, merged);
                }
                ConfigNode::Mapping(base)
            }
            (_, overlay) => overlay,
        }
    }

    /// Visit every scalar leaf with its path
    pub fn for_each_leaf<F>(&self, mut f: F)
    where
        F: FnMut(&KeyPath, &Scalar),
    {
        fn walk<F: FnMut(&KeyPath, &Scalar)>(node: &ConfigNode, path: &KeyPath, f: &mut F) {
            match node {
                ConfigNode::Scalar(scalar) => f(path, scalar),
                ConfigNode::Mapping(map) => {
                    for (key, child) in map {
                        walk(child, &path.child(key), f);
                    }
                }
            }
        }
        walk(self, &KeyPath::root(), &mut f);
    }

    /// Convert into a `serde_json::Value`
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ConfigNode::Scalar(scalar) => scalar.to_json(),
            ConfigNode::Mapping(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }

    /// Convert a parsed JSON value, rejecting arrays and nulls
    pub fn from_json(value: serde_json::Value) -> Result<Self, ConfigError> {
        Self::from_json_at(value, &KeyPath::root())
    }

    fn from_json_at(value: serde_json::Value, path: &KeyPath) -> Result<Self, ConfigError> {
        use serde_json::Value;

        let scalar = match value {
            Value::String(s) => Scalar::String(s),
            Value::Bool(b) => Scalar::Boolean(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Scalar::Integer(i),
                None => Scalar::Float(n.as_f64().ok_or_else(|| {
                    ConfigError::ParseError(format!("{}: number out of range", path))
                })?),
            },
            Value::Object(object) => {
                let mut map = Mapping::new();
                for (key, child) in object {
                    let child_path = path.child(&key);
                    map.insert(key, Self::from_json_at(child, &child_path)?);
                }
                return Ok(ConfigNode::Mapping(map));
            }
            Value::Array(_) => {
                return Err(ConfigError::ParseError(format!(
                    "{}: sequences are not supported in configuration documents",
                    path
                )));
            }
            Value::Null => {
                return Err(ConfigError::ParseError(format!(
                    "{}: null values are not supported in configuration documents",
                    path
                )));
            }
        };
        Ok(ConfigNode::Scalar(scalar))
    }

    /// Convert a parsed TOML table into a tree
    ///
    /// Datetimes are kept as their string representation.
    pub fn from_toml(table: toml::Table) -> Result<Self, ConfigError> {
        Self::from_toml_at(toml::Value::Table(table), &KeyPath::root())
    }

    fn from_toml_at(value: toml::Value, path: &KeyPath) -> Result<Self, ConfigError> {
        use toml::Value;

        let scalar = match value {
            Value::String(s) => Scalar::String(s),
            Value::Integer(i) => Scalar::Integer(i),
            Value::Float(f) if f.is_finite() => Scalar::Float(f),
            Value::Float(f) => {
                return Err(ConfigError::ParseError(format!(
                    "{}: non-finite number {} is not supported",
                    path, f
                )));
            }
            Value::Boolean(b) => Scalar::Boolean(b),
            Value::Datetime(dt) => Scalar::String(dt.to_string()),
            Value::Table(table) => {
                let mut map = Mapping::new();
                for (key, child) in table {
                    let child_path = path.child(&key);
                    map.insert(key, Self::from_toml_at(child, &child_path)?);
                }
                return Ok(ConfigNode::Mapping(map));
            }
            Value::Array(_) => {
                return Err(ConfigError::ParseError(format!(
                    "{}: sequences are not supported in configuration documents",
                    path
                )));
            }
        };
        Ok(ConfigNode::Scalar(scalar))
    }
}

impl Default for ConfigNode {
    fn default() -> Self {
        ConfigNode::empty()
    }
}

impl From<Scalar> for ConfigNode {
    fn from(value: Scalar) -> Self {
        ConfigNode::Scalar(value)
    }
}

impl From<Mapping> for ConfigNode {
    fn from(value: Mapping) -> Self {
        ConfigNode::Mapping(value)
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::String(s) => serializer.serialize_str(s),
            Scalar::Integer(i) => serializer.serialize_i64(*i),
            Scalar::Float(f) => serializer.serialize_f64(*f),
            Scalar::Boolean(b) => serializer.serialize_bool(*b),
        }
    }
}

impl Serialize for ConfigNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ConfigNode::Scalar(scalar) => scalar.serialize(serializer),
            ConfigNode::Mapping(map) => {
                let mut state = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    state.serialize_entry(key, value)?;
                }
                state.end()
            }
        }
    }
}
