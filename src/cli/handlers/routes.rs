//! Routes command handler
//!
//! Lists Kafka topic routes with the messaging-client parameters derived
//! for each of them.

use std::io::Write;

use crate::config::{ConfigSnapshot, Direction};
use crate::error::AppResult;

/// Handler for the routes command
pub struct RoutesCommandHandler<'a> {
    snapshot: &'a ConfigSnapshot,
}

impl<'a> RoutesCommandHandler<'a> {
    pub fn new(snapshot: &'a ConfigSnapshot) -> Self {
        Self { snapshot }
    }

    /// Write one line per route, optionally restricted to one direction
    pub fn execute<W: Write>(&self, direction: Option<Direction>, out: &mut W) -> AppResult<()> {
        let routes = self
            .snapshot
            .routes()
            .into_iter()
            .filter(|route| direction.is_none_or(|d| route.direction == d));

        for route in routes {
            let Some(params) = self.snapshot.client_params(&route) else {
                continue;
            };
            let brokers: Vec<String> = params.broker_list.iter().map(ToString::to_string).collect();

            write!(out, "{:<40} brokers={} sync={}", route.to_string(), brokers.join(","), params.sync)?;
            if let Some(limit) = params.buffer_limit {
                write!(out, " bufferLimit={}", limit)?;
            }
            if let Some(codec) = params.compression_codec {
                write!(out, " compressionCodec={}", codec)?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::handlers::test_support::{output, snapshot};
    use serde_json::json;

    fn sample() -> ConfigSnapshot {
        snapshot(json!({"KAFKA": {
            "CONSUMER": {"TRANSFER": {"POSITION": {"config": {
                "options": {"sync": false},
                "rdkafkaConf": {"metadata.broker.list": "kafka:29092"}
            }}}},
            "PRODUCER": {"NOTIFICATION": {"EVENT": {"config": {
                "options": {"sync": true},
                "rdkafkaConf": {
                    "metadata.broker.list": "kafka-1:29092,kafka-2:29092",
                    "queue.buffering.max.messages": 10000000,
                    "compression.codec": "lz4"
                }
            }}}}
        }}))
    }

    #[test]
    fn test_routes_lists_all_directions() {
        let snapshot = sample();
        let mut buf = Vec::new();
        RoutesCommandHandler::new(&snapshot).execute(None, &mut buf).unwrap();
        let text = output(buf);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("CONSUMER.TRANSFER.POSITION"));
        assert!(lines[0].ends_with("brokers=kafka:29092 sync=false"));
        assert!(lines[1].starts_with("PRODUCER.NOTIFICATION.EVENT"));
        assert!(lines[1].contains("brokers=kafka-1:29092,kafka-2:29092 sync=true"));
        assert!(lines[1].contains("bufferLimit=10000000 compressionCodec=lz4"));
    }

    #[test]
    fn test_routes_filtered_by_direction() {
        let snapshot = sample();
        let mut buf = Vec::new();
        RoutesCommandHandler::new(&snapshot)
            .execute(Some(Direction::Producer), &mut buf)
            .unwrap();
        let text = output(buf);

        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("PRODUCER."));
    }
}
