//! Kafka topic routes and messaging-client parameters

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Direction of a topic route
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Consumer,
    Producer,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Consumer => "CONSUMER",
            Direction::Producer => "PRODUCER",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CONSUMER" => Ok(Direction::Consumer),
            "PRODUCER" => Ok(Direction::Producer),
            _ => Err(format!("Invalid direction '{}'. Valid values are: CONSUMER, PRODUCER", s)),
        }
    }
}

/// A Kafka topic route, e.g. `(CONSUMER, BULK, PREPARE)`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TopicRoute {
    pub direction: Direction,
    pub domain: String,
    pub operation: String,
}

impl TopicRoute {
    pub fn new<D: Into<String>, O: Into<String>>(direction: Direction, domain: D, operation: O) -> Self {
        Self {
            direction,
            domain: domain.into(),
            operation: operation.into(),
        }
    }
}

impl fmt::Display for TopicRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.direction, self.domain, self.operation)
    }
}

/// A single `host:port` broker address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BrokerAddress {
    pub host: String,
    pub port: u16,
}

impl fmt::Display for BrokerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl FromStr for BrokerAddress {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (host, port) = s
            .rsplit_once(':')
            .ok_or_else(|| format!("broker '{}' must be in host:port form", s))?;
        if host.is_empty() || host.contains(char::is_whitespace) {
            return Err(format!("broker '{}' has an invalid host", s));
        }
        let port: u16 = port
            .parse()
            .map_err(|_| format!("broker '{}' has an invalid port", s))?;
        if port == 0 {
            return Err(format!("broker '{}' has an invalid port", s));
        }
        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}

/// Parse an rdkafka `metadata.broker.list` value
///
/// Entries are comma separated; surrounding whitespace is ignored. The list
/// must contain at least one broker.
pub fn parse_broker_list(raw: &str) -> Result<Vec<BrokerAddress>, String> {
    let brokers = raw
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::parse)
        .collect::<Result<Vec<BrokerAddress>, String>>()?;
    if brokers.is_empty() {
        return Err("broker list must contain at least one host:port entry".to_string());
    }
    Ok(brokers)
}

/// Producer compression codecs understood by librdkafka
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionCodec {
    None,
    Gzip,
    Snappy,
    Lz4,
    Zstd,
}

impl CompressionCodec {
    /// Accepted codec names
    pub const NAMES: &'static [&'static str] = &["none", "gzip", "snappy", "lz4", "zstd"];

    pub fn as_str(&self) -> &'static str {
        match self {
            CompressionCodec::None => "none",
            CompressionCodec::Gzip => "gzip",
            CompressionCodec::Snappy => "snappy",
            CompressionCodec::Lz4 => "lz4",
            CompressionCodec::Zstd => "zstd",
        }
    }
}

impl FromStr for CompressionCodec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(CompressionCodec::None),
            "gzip" => Ok(CompressionCodec::Gzip),
            "snappy" => Ok(CompressionCodec::Snappy),
            "lz4" => Ok(CompressionCodec::Lz4),
            "zstd" => Ok(CompressionCodec::Zstd),
            _ => Err(format!(
                "Invalid compression codec '{}'. Valid codecs are: {}",
                s,
                Self::NAMES.join(", ")
            )),
        }
    }
}

impl fmt::Display for CompressionCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parameters handed to the messaging-client factory for one route
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagingClientParams {
    pub broker_list: Vec<BrokerAddress>,
    pub sync: bool,
    pub buffer_limit: Option<u64>,
    pub compression_codec: Option<CompressionCodec>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_broker_list() {
        let brokers = parse_broker_list("kafka:29092, kafka-2:29093").unwrap();
        assert_eq!(brokers.len(), 2);
        assert_eq!(brokers[0].to_string(), "kafka:29092");
        assert_eq!(brokers[1].port, 29093);
    }

    #[test]
    fn test_parse_broker_list_rejects_empty() {
        assert!(parse_broker_list("").is_err());
        assert!(parse_broker_list(" , ").is_err());
    }

    #[test]
    fn test_parse_broker_list_rejects_malformed() {
        let invalid = ["kafka", "kafka:", ":9092", "kafka:0", "kafka:99999", "kafka:abc"];
        for raw in invalid {
            assert!(parse_broker_list(raw).is_err(), "'{}' should be invalid", raw);
        }
    }

    #[test]
    fn test_compression_codec_names_parse() {
        for name in CompressionCodec::NAMES {
            let codec: CompressionCodec = name.parse().unwrap();
            assert_eq!(codec.as_str(), *name);
        }
        assert!("brotli".parse::<CompressionCodec>().is_err());
    }

    #[test]
    fn test_topic_route_display_and_order() {
        let consumer = TopicRoute::new(Direction::Consumer, "BULK", "PREPARE");
        let producer = TopicRoute::new(Direction::Producer, "BULK", "PREPARE");
        assert_eq!(consumer.to_string(), "CONSUMER.BULK.PREPARE");
        assert!(consumer < producer);
    }

    #[test]
    fn test_direction_from_str() {
        assert_eq!("consumer".parse::<Direction>().unwrap(), Direction::Consumer);
        assert_eq!("PRODUCER".parse::<Direction>().unwrap(), Direction::Producer);
        assert!("both".parse::<Direction>().is_err());
    }
}
