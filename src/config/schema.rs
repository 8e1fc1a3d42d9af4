//! Declarative configuration schema
//!
//! The schema declares every recognized key of the central-ledger
//! configuration, its scalar type, default value, required-ness and the
//! numeric or textual constraints checked by the validator.
//!
//! Three kinds of nodes exist:
//! - [`FieldSchema`] - a scalar leaf
//! - [`SectionSchema`] - a mapping with named children; *open* sections also
//!   accept unlisted scalar keys (vendor passthrough such as `rdkafkaConf`)
//! - [`SchemaNode::Map`] - a mapping with arbitrary keys whose values share one
//!   schema (Kafka domains and operations)

use std::collections::BTreeMap;

use crate::config::kafka::CompressionCodec;
use crate::config::node::{ConfigNode, KeyPath, Mapping, Scalar};

/// Valid values for `DATABASE.DIALECT`
const VALID_DIALECTS: &[&str] = &["mysql"];

/// Valid values for consumer `topicConf."auto.offset.reset"`
const VALID_OFFSET_RESETS: &[&str] = &[
    "smallest", "earliest", "beginning", "largest", "latest", "end", "error",
];

const MAX_PORT: i64 = 65535;

/// Scalar types a field can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    String,
    Integer,
    /// Integer or float
    Number,
    Boolean,
}

impl ScalarKind {
    /// Whether a scalar value is acceptable for this kind
    pub fn accepts(&self, scalar: &Scalar) -> bool {
        matches!(
            (self, scalar),
            (ScalarKind::String, Scalar::String(_))
                | (ScalarKind::Integer, Scalar::Integer(_))
                | (ScalarKind::Number, Scalar::Integer(_) | Scalar::Float(_))
                | (ScalarKind::Boolean, Scalar::Boolean(_))
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarKind::String => "string",
            ScalarKind::Integer => "integer",
            ScalarKind::Number => "number",
            ScalarKind::Boolean => "boolean",
        }
    }
}

/// Additional textual formats checked on string fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFormat {
    /// Comma-separated `host:port` list with at least one entry
    BrokerList,
}

/// Schema of a scalar leaf
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    pub kind: ScalarKind,
    pub required: bool,
    pub default: Option<Scalar>,
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub allowed: &'static [&'static str],
    pub non_empty: bool,
    pub format: Option<FieldFormat>,
}

impl FieldSchema {
    fn of(kind: ScalarKind) -> Self {
        Self {
            kind,
            required: false,
            default: None,
            min: None,
            max: None,
            allowed: &[],
            non_empty: false,
            format: None,
        }
    }

    pub fn string() -> Self {
        Self::of(ScalarKind::String)
    }

    pub fn integer() -> Self {
        Self::of(ScalarKind::Integer)
    }

    pub fn number() -> Self {
        Self::of(ScalarKind::Number)
    }

    pub fn boolean() -> Self {
        Self::of(ScalarKind::Boolean)
    }

    /// Field must be present after merging; only meaningful without a default
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value<V: Into<Scalar>>(mut self, value: V) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Inclusive numeric range
    pub fn range(mut self, min: i64, max: i64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn one_of(mut self, allowed: &'static [&'static str]) -> Self {
        self.allowed = allowed;
        self
    }

    pub fn non_empty(mut self) -> Self {
        self.non_empty = true;
        self
    }

    pub fn format(mut self, format: FieldFormat) -> Self {
        self.format = Some(format);
        self
    }
}

/// Schema of a mapping with named children
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionSchema {
    pub children: BTreeMap<String, SchemaNode>,
    /// Whether unlisted scalar keys are accepted
    pub open: bool,
}

impl SectionSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept unlisted scalar keys
    pub fn open(mut self) -> Self {
        self.open = true;
        self
    }

    pub fn field(mut self, key: &str, field: FieldSchema) -> Self {
        self.children.insert(key.to_string(), SchemaNode::Field(field));
        self
    }

    pub fn section(mut self, key: &str, section: SectionSchema) -> Self {
        self.children.insert(key.to_string(), SchemaNode::Section(section));
        self
    }

    pub fn map(mut self, key: &str, values: SchemaNode) -> Self {
        self.children.insert(key.to_string(), SchemaNode::Map(Box::new(values)));
        self
    }

    pub fn child(&self, key: &str) -> Option<&SchemaNode> {
        self.children.get(key)
    }
}

/// A node of the schema tree
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Field(FieldSchema),
    Section(SectionSchema),
    /// Mapping with arbitrary keys whose values all follow the inner schema
    Map(Box<SchemaNode>),
}

impl SchemaNode {
    pub fn map_of(values: SchemaNode) -> Self {
        SchemaNode::Map(Box::new(values))
    }

    fn default_node(&self) -> Option<ConfigNode> {
        match self {
            SchemaNode::Field(field) => field.default.clone().map(ConfigNode::Scalar),
            SchemaNode::Section(section) => Some(section.default_node()),
            SchemaNode::Map(_) => Some(ConfigNode::empty()),
        }
    }
}

impl SectionSchema {
    fn default_node(&self) -> ConfigNode {
        let map: Mapping = self
            .children
            .iter()
            .filter_map(|(key, child)| child.default_node().map(|node| (key.clone(), node)))
            .collect();
        ConfigNode::Mapping(map)
    }
}

/// Root schema of the central-ledger configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSchema {
    root: SectionSchema,
}

impl ConfigSchema {
    /// Build a schema from an arbitrary root section
    pub fn new(root: SectionSchema) -> Self {
        Self { root }
    }

    /// The central-ledger configuration schema
    pub fn central_ledger() -> Self {
        let database = SectionSchema::new()
            .field("DIALECT", FieldSchema::string().default_value("mysql").one_of(VALID_DIALECTS))
            .field("HOST", FieldSchema::string().default_value("localhost").non_empty())
            .field("PORT", FieldSchema::integer().default_value(3306).range(1, MAX_PORT))
            .field("USER", FieldSchema::string().default_value("central_ledger"))
            .field("PASSWORD", FieldSchema::string().default_value("password"))
            .field("SCHEMA", FieldSchema::string().default_value("central_ledger").non_empty())
            .field("POOL_MIN_SIZE", FieldSchema::integer().default_value(10).range(0, 10_000))
            .field("POOL_MAX_SIZE", FieldSchema::integer().default_value(30).range(1, 10_000));

        let migrations = SectionSchema::new()
            .field("DISABLED", FieldSchema::boolean().default_value(false))
            .field("RUN_DATA_MIGRATIONS", FieldSchema::boolean().default_value(true));

        let mongodb = SectionSchema::new()
            .field("DISABLED", FieldSchema::boolean().default_value(false))
            .field("HOST", FieldSchema::string().default_value("localhost"))
            .field("PORT", FieldSchema::integer().default_value(27017).range(1, MAX_PORT))
            .field("USER", FieldSchema::string().default_value(""))
            .field("PASSWORD", FieldSchema::string().default_value(""))
            .field("DATABASE", FieldSchema::string().default_value("mlos"));

        let kafka = SectionSchema::new()
            .map("CONSUMER", SchemaNode::map_of(consumer_topic()))
            .map("PRODUCER", SchemaNode::map_of(producer_topic()));

        let root = SectionSchema::new()
            .field("HOSTNAME", FieldSchema::string().default_value("http://central-ledger").non_empty())
            .field("PORT", FieldSchema::integer().default_value(3001).range(1, MAX_PORT))
            .section("DATABASE", database)
            .section("MIGRATIONS", migrations)
            .section("MONGODB", mongodb)
            .section("KAFKA", kafka);

        Self::new(root)
    }

    pub fn root(&self) -> &SectionSchema {
        &self.root
    }

    /// Document holding every schema default, used as the lowest layer
    pub fn default_document(&self) -> ConfigNode {
        self.root.default_node()
    }

    /// Schema node at a path; map entries match any key
    pub fn lookup(&self, path: &KeyPath) -> Option<&SchemaNode> {
        let mut segments = path.segments().iter();
        let first = segments.next()?;
        let mut node = self.root.child(first)?;
        for key in segments {
            node = match node {
                SchemaNode::Section(section) => section.child(key)?,
                SchemaNode::Map(values) => values.as_ref(),
                SchemaNode::Field(_) => return None,
            };
        }
        Some(node)
    }

    /// Type an untyped value (environment variable) for the field at `path`
    ///
    /// String fields keep the raw text, so `123456` stays a password rather
    /// than becoming an integer. Other and undeclared paths are parsed with
    /// [`Scalar::parse_untyped`].
    pub fn scalar_for(&self, path: &KeyPath, raw: &str) -> Scalar {
        match self.lookup(path) {
            Some(SchemaNode::Field(field)) if field.kind == ScalarKind::String => Scalar::from(raw),
            _ => Scalar::parse_untyped(raw),
        }
    }

    /// Paths of every key of `document` the schema does not recognize
    ///
    /// Descent stops at fields and at type mismatches (a scalar where a
    /// section is declared); those are the validator's concern.
    pub fn unknown_keys(&self, document: &ConfigNode) -> Vec<KeyPath> {
        let mut unknown = Vec::new();
        if let ConfigNode::Mapping(map) = document {
            collect_unknown_in_section(&self.root, map, &KeyPath::root(), &mut unknown);
        }
        unknown
    }
}

impl Default for ConfigSchema {
    fn default() -> Self {
        Self::central_ledger()
    }
}

fn collect_unknown_in_section(
    section: &SectionSchema,
    map: &Mapping,
    path: &KeyPath,
    unknown: &mut Vec<KeyPath>,
) {
    for (key, value) in map {
        let child_path = path.child(key);
        match section.child(key) {
            Some(schema) => collect_unknown(schema, value, &child_path, unknown),
            None if section.open && matches!(value, ConfigNode::Scalar(_)) => {}
            None => unknown.push(child_path),
        }
    }
}

fn collect_unknown(schema: &SchemaNode, node: &ConfigNode, path: &KeyPath, unknown: &mut Vec<KeyPath>) {
    let ConfigNode::Mapping(map) = node else {
        return;
    };
    match schema {
        SchemaNode::Field(_) => {}
        SchemaNode::Section(section) => collect_unknown_in_section(section, map, path, unknown),
        SchemaNode::Map(values) => {
            for (key, value) in map {
                collect_unknown(values, value, &path.child(key), unknown);
            }
        }
    }
}

fn consumer_topic() -> SchemaNode {
    let options = SectionSchema::new()
        .field("mode", FieldSchema::integer().default_value(2).range(0, 2))
        .field("batchSize", FieldSchema::integer().default_value(1).range(1, 1_000_000))
        .field("pollFrequency", FieldSchema::integer().default_value(10).min(1))
        .field("recursiveTimeout", FieldSchema::integer().default_value(100).min(0))
        .field("messageCharset", FieldSchema::string().default_value("utf8"))
        .field("messageAsJSON", FieldSchema::boolean().default_value(true))
        .field("sync", FieldSchema::boolean().default_value(true))
        .field("consumeTimeout", FieldSchema::integer().default_value(1000).min(0));

    let rdkafka_conf = SectionSchema::new()
        .open()
        .field("client.id", FieldSchema::string())
        .field("group.id", FieldSchema::string())
        .field("metadata.broker.list", broker_list())
        .field("socket.keepalive.enable", FieldSchema::boolean().default_value(true));

    let topic_conf = SectionSchema::new().open().field(
        "auto.offset.reset",
        FieldSchema::string().default_value("earliest").one_of(VALID_OFFSET_RESETS),
    );

    topic(options, rdkafka_conf, topic_conf)
}

fn producer_topic() -> SchemaNode {
    let options = SectionSchema::new()
        .field("messageCharset", FieldSchema::string().default_value("utf8"))
        .field("sync", FieldSchema::boolean().default_value(false));

    let rdkafka_conf = SectionSchema::new()
        .open()
        .field("client.id", FieldSchema::string())
        .field("metadata.broker.list", broker_list())
        .field("event_cb", FieldSchema::boolean().default_value(true))
        .field("dr_cb", FieldSchema::boolean().default_value(false))
        .field("socket.keepalive.enable", FieldSchema::boolean().default_value(true))
        .field(
            "queue.buffering.max.messages",
            FieldSchema::integer().range(1, i64::from(i32::MAX)),
        )
        .field(
            "compression.codec",
            FieldSchema::string().one_of(CompressionCodec::NAMES),
        );

    topic(options, rdkafka_conf, SectionSchema::new().open())
}

fn broker_list() -> FieldSchema {
    FieldSchema::string().required().format(FieldFormat::BrokerList)
}

fn topic(options: SectionSchema, rdkafka_conf: SectionSchema, topic_conf: SectionSchema) -> SchemaNode {
    let config = SectionSchema::new()
        .section("options", options)
        .section("rdkafkaConf", rdkafka_conf)
        .section("topicConf", topic_conf);
    SchemaNode::Section(SectionSchema::new().section("config", config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(value: serde_json::Value) -> ConfigNode {
        ConfigNode::from_json(value).unwrap()
    }

    #[test]
    fn test_default_document_has_top_level_defaults() {
        let doc = ConfigSchema::central_ledger().default_document();
        assert_eq!(doc.find("HOSTNAME").and_then(ConfigNode::as_str), Some("http://central-ledger"));
        assert_eq!(doc.find("MONGODB.PORT").and_then(ConfigNode::as_i64), Some(27017));
        assert_eq!(doc.find("MIGRATIONS.RUN_DATA_MIGRATIONS").and_then(ConfigNode::as_bool), Some(true));
        assert_eq!(doc.find("KAFKA.CONSUMER"), Some(&ConfigNode::empty()));
    }

    #[test]
    fn test_lookup_through_maps() {
        let schema = ConfigSchema::central_ledger();
        let path = KeyPath::from_segments([
            "KAFKA", "PRODUCER", "TRANSFER", "PREPARE", "config", "rdkafkaConf",
            "queue.buffering.max.messages",
        ]);
        match schema.lookup(&path) {
            Some(SchemaNode::Field(field)) => assert_eq!(field.kind, ScalarKind::Integer),
            other => panic!("Expected integer field, got {other:?}"),
        }
        assert!(schema.lookup(&KeyPath::from_segments(["NOPE"])).is_none());
    }

    #[test]
    fn test_route_options_are_declared() {
        let schema = ConfigSchema::central_ledger();
        let sync = KeyPath::from_segments([
            "KAFKA", "CONSUMER", "BULK", "PREPARE", "config", "options", "sync",
        ]);
        match schema.lookup(&sync) {
            Some(SchemaNode::Field(field)) => assert_eq!(field.kind, ScalarKind::Boolean),
            other => panic!("Expected boolean field, got {other:?}"),
        }

        let overlay = node(json!({"KAFKA": {"PRODUCER": {"BULK": {"PROCESSING": {"config": {
            "options": {"sync": true},
            "rdkafkaConf": {"metadata.broker.list": "kafka:29092"},
            "topicConf": {"request.required.acks": "all"}
        }}}}}}));
        assert!(schema.unknown_keys(&overlay).is_empty());
    }

    #[test]
    fn test_shipped_default_document_has_no_unknown_keys() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("config/default.json");
        let text = std::fs::read_to_string(path).unwrap();
        let document = ConfigNode::from_json(serde_json::from_str(&text).unwrap()).unwrap();
        assert_eq!(ConfigSchema::central_ledger().unknown_keys(&document), Vec::<KeyPath>::new());
    }

    #[test]
    fn test_unknown_keys_detected() {
        let schema = ConfigSchema::central_ledger();
        let overlay = node(json!({
            "HOSTNAME": "x",
            "CACHE": {"ENABLED": true},
            "MONGODB": {"HOST": "objstore", "REPLICA_SET": "rs0"}
        }));

        let unknown = schema.unknown_keys(&overlay);
        let rendered: Vec<String> = unknown.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["CACHE", "MONGODB.REPLICA_SET"]);
    }

    #[test]
    fn test_open_sections_accept_vendor_scalars() {
        let schema = ConfigSchema::central_ledger();
        let overlay = node(json!({"KAFKA": {"PRODUCER": {"ANY": {"OP": {"config": {
            "rdkafkaConf": {"linger.ms": 5, "nested": {"x": 1}},
            "topicConf": {"request.required.acks": "all"}
        }}}}}}));

        let unknown = schema.unknown_keys(&overlay);
        assert_eq!(unknown.len(), 1);
        assert_eq!(
            unknown[0].to_string(),
            "KAFKA.PRODUCER.ANY.OP.config.rdkafkaConf.nested"
        );
    }

    #[test]
    fn test_unknown_keys_stop_at_type_mismatch() {
        let schema = ConfigSchema::central_ledger();
        let overlay = node(json!({"HOSTNAME": {"nested": 1}, "DATABASE": "mysql://x"}));
        assert!(schema.unknown_keys(&overlay).is_empty());
    }

    #[test]
    fn test_scalar_for_keeps_text_in_string_fields() {
        let schema = ConfigSchema::central_ledger();
        let password = KeyPath::from_segments(["DATABASE", "PASSWORD"]);
        let user = KeyPath::from_segments(["MONGODB", "USER"]);
        let port = KeyPath::from_segments(["MONGODB", "PORT"]);
        let undeclared = KeyPath::from_segments(["SIDECAR", "RETRIES"]);

        assert_eq!(schema.scalar_for(&password, "123456"), Scalar::from("123456"));
        assert_eq!(schema.scalar_for(&user, "true"), Scalar::from("true"));
        assert_eq!(schema.scalar_for(&port, "27018"), Scalar::Integer(27018));
        assert_eq!(schema.scalar_for(&undeclared, "3"), Scalar::Integer(3));
    }

    #[test]
    fn test_scalar_kind_accepts() {
        assert!(ScalarKind::Number.accepts(&Scalar::Integer(1)));
        assert!(ScalarKind::Number.accepts(&Scalar::Float(1.5)));
        assert!(!ScalarKind::Integer.accepts(&Scalar::Float(1.0)));
        assert!(!ScalarKind::String.accepts(&Scalar::Boolean(true)));
    }
}
