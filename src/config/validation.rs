//! Configuration validation logic
//!
//! The [`Validator`] walks a resolved tree against the [`ConfigSchema`],
//! collecting every problem in a single pass instead of stopping at the first
//! one. On success the tree is returned with schema defaults filled in and
//! converted into typed [`LedgerSettings`].

use std::fmt;

use crate::config::kafka::parse_broker_list;
use crate::config::node::{ConfigNode, KeyPath, Mapping, Scalar};
use crate::config::schema::{ConfigSchema, FieldFormat, FieldSchema, SchemaNode, SectionSchema};
use crate::config::settings::LedgerSettings;

/// Category of a validation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Key not declared by the schema (strict overlay merge)
    SchemaMismatch,
    /// Value does not match the declared type
    TypeMismatch,
    /// Required key absent after merging
    MissingRequired,
    /// Numeric value outside the allowed bounds
    RangeViolation,
    /// Value outside an allowed set or malformed
    InvalidValue,
}

impl ValidationErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationErrorKind::SchemaMismatch => "schema mismatch",
            ValidationErrorKind::TypeMismatch => "type mismatch",
            ValidationErrorKind::MissingRequired => "missing required",
            ValidationErrorKind::RangeViolation => "range violation",
            ValidationErrorKind::InvalidValue => "invalid value",
        }
    }
}

/// A single validation failure at a key path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub path: KeyPath,
    pub kind: ValidationErrorKind,
    pub reason: String,
}

impl ValidationError {
    pub fn new<S: Into<String>>(path: KeyPath, kind: ValidationErrorKind, reason: S) -> Self {
        Self {
            path,
            kind,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.path, self.kind.as_str(), self.reason)
    }
}

impl std::error::Error for ValidationError {}

/// Every validation failure found in one pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }

    /// Errors of one kind
    pub fn of_kind(&self, kind: ValidationErrorKind) -> impl Iterator<Item = &ValidationError> {
        self.0.iter().filter(move |e| e.kind == kind)
    }

    pub fn into_vec(self) -> Vec<ValidationError> {
        self.0
    }
}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self(errors)
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  - {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// A resolved configuration that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedConfig {
    tree: ConfigNode,
    settings: LedgerSettings,
}

impl ValidatedConfig {
    /// The validated tree, with defaults filled in and unknown keys preserved
    pub fn tree(&self) -> &ConfigNode {
        &self.tree
    }

    pub fn settings(&self) -> &LedgerSettings {
        &self.settings
    }

    /// Look up any value, including passthrough keys, by dotted path
    pub fn find(&self, dotted: &str) -> Option<&ConfigNode> {
        self.tree.find(dotted)
    }
}

/// Schema-driven validator
#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    schema: &'a ConfigSchema,
}

impl<'a> Validator<'a> {
    pub fn new(schema: &'a ConfigSchema) -> Self {
        Self { schema }
    }

    /// Validate a resolved tree, reporting every error found
    pub fn validate(&self, resolved: &ConfigNode) -> Result<ValidatedConfig, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let tree = match resolved {
            ConfigNode::Mapping(map) => {
                ConfigNode::Mapping(self.check_section(self.schema.root(), map, &KeyPath::root(), &mut errors))
            }
            ConfigNode::Scalar(scalar) => {
                errors.push(ValidationError::new(
                    KeyPath::root(),
                    ValidationErrorKind::TypeMismatch,
                    format!("expected a mapping at the document root, found {}", scalar.type_name()),
                ));
                return Err(errors);
            }
        };

        check_cross_field_rules(&tree, &mut errors);

        if !errors.is_empty() {
            tracing::debug!(count = errors.len(), "configuration validation failed");
            return Err(errors);
        }

        let settings: LedgerSettings = serde_json::from_value(tree.to_json()).map_err(|e| {
            ValidationErrors::from(vec![ValidationError::new(
                KeyPath::root(),
                ValidationErrorKind::TypeMismatch,
                format!("failed to build typed settings: {}", e),
            )])
        })?;

        Ok(ValidatedConfig { tree, settings })
    }

    fn check_node(
        &self,
        schema: &SchemaNode,
        node: Option<&ConfigNode>,
        path: &KeyPath,
        errors: &mut ValidationErrors,
    ) -> Option<ConfigNode> {
        match schema {
            SchemaNode::Field(field) => check_field(field, node, path, errors),
            SchemaNode::Section(section) => match node {
                None => Some(ConfigNode::Mapping(self.check_section(section, &Mapping::new(), path, errors))),
                Some(ConfigNode::Mapping(map)) => {
                    Some(ConfigNode::Mapping(self.check_section(section, map, path, errors)))
                }
                Some(other) => {
                    errors.push(type_mismatch(path, "mapping", other));
                    Some(other.clone())
                }
            },
            SchemaNode::Map(values) => match node {
                None => Some(ConfigNode::empty()),
                Some(ConfigNode::Mapping(map)) => {
                    let checked = map
                        .iter()
                        .filter_map(|(key, value)| {
                            self.check_node(values, Some(value), &path.child(key), errors)
                                .map(|node| (key.clone(), node))
                        })
                        .collect();
                    Some(ConfigNode::Mapping(checked))
                }
                Some(other) => {
                    errors.push(type_mismatch(path, "mapping", other));
                    Some(other.clone())
                }
            },
        }
    }

    fn check_section(
        &self,
        section: &SectionSchema,
        map: &Mapping,
        path: &KeyPath,
        errors: &mut ValidationErrors,
    ) -> Mapping {
        let mut checked = Mapping::new();
        for (key, schema) in &section.children {
            if let Some(node) = self.check_node(schema, map.get(key), &path.child(key), errors) {
                checked.insert(key.clone(), node);
            }
        }
        // Unknown keys were accepted by the resolver; carry them through.
        for (key, value) in map {
            if !section.children.contains_key(key) {
                checked.insert(key.clone(), value.clone());
            }
        }
        checked
    }
}

fn type_mismatch(path: &KeyPath, expected: &str, found: &ConfigNode) -> ValidationError {
    ValidationError::new(
        path.clone(),
        ValidationErrorKind::TypeMismatch,
        format!("expected {}, found {}", expected, found.type_name()),
    )
}

fn check_field(
    field: &FieldSchema,
    node: Option<&ConfigNode>,
    path: &KeyPath,
    errors: &mut ValidationErrors,
) -> Option<ConfigNode> {
    let scalar = match node {
        None => {
            if let Some(default) = &field.default {
                return Some(ConfigNode::Scalar(default.clone()));
            }
            if field.required {
                errors.push(ValidationError::new(
                    path.clone(),
                    ValidationErrorKind::MissingRequired,
                    "required key is missing",
                ));
            }
            return None;
        }
        Some(mapping @ ConfigNode::Mapping(_)) => {
            errors.push(type_mismatch(path, field.kind.as_str(), mapping));
            return Some(mapping.clone());
        }
        Some(ConfigNode::Scalar(scalar)) => scalar,
    };

    if !field.kind.accepts(scalar) {
        errors.push(ValidationError::new(
            path.clone(),
            ValidationErrorKind::TypeMismatch,
            format!("expected {}, found {}", field.kind.as_str(), scalar.type_name()),
        ));
        return node.cloned();
    }

    check_range(field, scalar, path, errors);
    if let Scalar::String(value) = scalar {
        check_text(field, value, path, errors);
    }

    node.cloned()
}

fn check_range(field: &FieldSchema, scalar: &Scalar, path: &KeyPath, errors: &mut ValidationErrors) {
    let value = match scalar {
        Scalar::Integer(i) => *i as f64,
        Scalar::Float(f) => *f,
        _ => return,
    };
    let below = field.min.is_some_and(|min| value < min as f64);
    let above = field.max.is_some_and(|max| value > max as f64);
    if below || above {
        let bounds = match (field.min, field.max) {
            (Some(min), Some(max)) => format!("between {} and {}", min, max),
            (Some(min), None) => format!("at least {}", min),
            (None, Some(max)) => format!("at most {}", max),
            (None, None) => unreachable!("range violation requires a bound"),
        };
        errors.push(ValidationError::new(
            path.clone(),
            ValidationErrorKind::RangeViolation,
            format!("value {} must be {}", scalar, bounds),
        ));
    }
}

fn check_text(field: &FieldSchema, value: &str, path: &KeyPath, errors: &mut ValidationErrors) {
    if field.non_empty && value.trim().is_empty() {
        errors.push(ValidationError::new(
            path.clone(),
            ValidationErrorKind::InvalidValue,
            "value must not be empty",
        ));
        return;
    }

    if !field.allowed.is_empty() && !field.allowed.contains(&value) {
        errors.push(ValidationError::new(
            path.clone(),
            ValidationErrorKind::InvalidValue,
            format!("'{}' is not one of: {}", value, field.allowed.join(", ")),
        ));
    }

    if let Some(FieldFormat::BrokerList) = field.format
        && let Err(reason) = parse_broker_list(value)
    {
        errors.push(ValidationError::new(path.clone(), ValidationErrorKind::InvalidValue, reason));
    }
}

/// Rules spanning several keys, checked on the defaults-filled tree
fn check_cross_field_rules(tree: &ConfigNode, errors: &mut ValidationErrors) {
    if let (Some(min), Some(max)) = (
        tree.find("DATABASE.POOL_MIN_SIZE").and_then(ConfigNode::as_i64),
        tree.find("DATABASE.POOL_MAX_SIZE").and_then(ConfigNode::as_i64),
    ) && min > max
    {
        errors.push(ValidationError::new(
            KeyPath::from_segments(["DATABASE", "POOL_MIN_SIZE"]),
            ValidationErrorKind::RangeViolation,
            format!("pool min size ({}) cannot exceed pool max size ({})", min, max),
        ));
    }

    if tree.find("MONGODB.DISABLED").and_then(ConfigNode::as_bool) == Some(false) {
        for key in ["HOST", "DATABASE"] {
            let value = tree.get(&["MONGODB", key]).and_then(ConfigNode::as_str);
            if value.is_some_and(|v| v.trim().is_empty()) {
                errors.push(ValidationError::new(
                    KeyPath::from_segments(["MONGODB", key]),
                    ValidationErrorKind::MissingRequired,
                    "required when MONGODB.DISABLED is false",
                ));
            }
        }
    }
}
