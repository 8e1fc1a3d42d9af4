//! ledger-config library
//!
//! Typed configuration overlay resolution for the central ledger: layered
//! documents, schema validation and an immutable published snapshot.

use shadow_rs::shadow;
shadow!(build);

pub mod cli;
pub mod config;
pub mod error;
pub mod logger;

pub fn pkg_version() -> &'static str {
    build::PKG_VERSION
}

pub fn clap_long_version() -> &'static str {
    build::CLAP_LONG_VERSION
}
