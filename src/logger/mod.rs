//! Logger Module
//!
//! A logging system based on `tracing-subscriber` with support for:
//! - Console output on stderr with color control
//! - File output with multiple formats (Full, Compact, JSON)

pub mod config;
pub mod error;
pub(crate) mod writer;

// Re-export main types
pub use config::*;
pub use error::LoggerError;

use std::io::IsTerminal;

use tracing::Dispatch;

use tracing_subscriber::{
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};
use writer::FileWriter;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Initialize the global logger with the given configuration
pub fn init_logger(config: LoggerConfig) -> anyhow::Result<()> {
    build_subscriber(&config)?
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install logger: {}", e))
}

/// Build the subscriber without installing it
fn build_subscriber(config: &LoggerConfig) -> anyhow::Result<Dispatch> {
    config.validate()?;

    let filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));

    // The file layer goes first so console ANSI settings cannot leak into
    // span fields written to the file (tokio-rs/tracing#1817).
    let mut layers: Vec<BoxedLayer> = Vec::new();
    if config.file.enabled {
        let writer = FileWriter::new(&config.file)?;
        layers.push(fmt_layer(config.file.format, false, writer));
    }
    if config.console.enabled {
        let use_ansi = config.console.colored && std::io::stderr().is_terminal();
        layers.push(fmt_layer(config.console.format, use_ansi, std::io::stderr));
    }

    Ok(Dispatch::new(tracing_subscriber::registry().with(layers).with(filter)))
}

fn fmt_layer<W>(format: LogFormat, ansi: bool, writer: W) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_ansi(ansi)
        .with_target(true)
        .with_level(true)
        .with_writer(writer);

    match format {
        LogFormat::Full => layer.boxed(),
        LogFormat::Compact => layer.compact().boxed(),
        LogFormat::Json => layer.json().boxed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn file_only(path: &std::path::Path, format: LogFormat, level: &str) -> LoggerConfig {
        LoggerConfig {
            console: ConsoleConfig::new(false, false),
            file: FileConfig::at(path).with_format(format),
            level: level.to_string(),
        }
    }

    #[test]
    fn test_json_file_output() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.log");
        let dispatch = build_subscriber(&file_only(&path, LogFormat::Json, "info")).unwrap();

        tracing::dispatcher::with_default(&dispatch, || {
            tracing::info!(origin = "local.json", "applying configuration overlay");
        });

        let contents = std::fs::read_to_string(&path).unwrap();
        let line: serde_json::Value = serde_json::from_str(contents.trim()).unwrap();
        assert_eq!(line["level"], "INFO");
        assert_eq!(line["fields"]["origin"], "local.json");
        assert_eq!(line["fields"]["message"], "applying configuration overlay");
    }

    #[test]
    fn test_level_filters_file_output() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.log");
        let dispatch = build_subscriber(&file_only(&path, LogFormat::Compact, "warn")).unwrap();

        tracing::dispatcher::with_default(&dispatch, || {
            tracing::debug!("hidden");
            tracing::warn!(key = "SIDECAR", "passing through unknown configuration key");
        });

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(!contents.contains("hidden"));
        assert!(contents.contains("SIDECAR"));
        assert!(!contents.contains('\u{1b}'), "file output must not contain ANSI codes");
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = LoggerConfig {
            console: ConsoleConfig::new(false, false),
            file: FileConfig::default(),
            level: "info".to_string(),
        };
        assert!(build_subscriber(&config).is_err());
    }
}
