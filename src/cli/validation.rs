//! CLI argument validation functions
//!
//! This module provides custom validation functions for CLI arguments
//! that go beyond what clap can validate automatically.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::DocumentFormat;

/// Validate that a configuration document is accessible (exists and is readable)
/// and has a supported extension
pub fn validate_config_file_path(path_str: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(format!("Configuration file does not exist: '{}'", path_str));
    }

    if !path.is_file() {
        return Err(format!("Configuration path is not a file: '{}'", path_str));
    }

    DocumentFormat::from_path(&path).map_err(|e| e.to_string())?;

    match fs::File::open(&path) {
        Ok(_) => Ok(path),
        Err(e) => Err(format!("Cannot read configuration file '{}': {}", path_str, e)),
    }
}

/// Validate that a configuration directory exists
pub fn validate_config_dir(path_str: &str) -> Result<PathBuf, String> {
    let path = Path::new(path_str);

    if !path.exists() {
        return Err(format!("Configuration directory does not exist: '{}'", path_str));
    }

    if !path.is_dir() {
        return Err(format!("Configuration path is not a directory: '{}'", path_str));
    }

    Ok(path.to_path_buf())
}

/// Validate a dotted key path such as `DATABASE.HOST`
pub fn validate_key_path(key_str: &str) -> Result<String, String> {
    let key = key_str.trim();

    if key.is_empty() {
        return Err("Key path cannot be empty".to_string());
    }

    if key.contains(char::is_whitespace) {
        return Err(format!("Key path cannot contain whitespace: '{}'", key_str));
    }

    if key.split('.').any(str::is_empty) {
        return Err(format!("Key path has an empty segment: '{}'", key_str));
    }

    Ok(key.to_string())
}
