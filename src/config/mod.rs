//! Configuration for icerank.
//!
//! ## config.kdl - User preferences
//!
//! Located at (first match wins):
//! - `--config-dir <dir>/config.kdl`
//! - `$ICE_CONFIG_DIR/config.kdl`
//! - `~/.config/icerank/config.kdl` (platform config dir)
//!
//! Contains:
//! - `model` - "ice" or "rice"
//! - `precision` - Decimal places for exported scores
//! - `output-format` - "json" or "human"
//! - `weights` - Exponent weights per factor
//! - `thresholds` - Fixed quadrant thresholds (median when absent)
//!
//! ## Precedence
//!
//! CLI flag > config.kdl > defaults. Use the [`resolver`] module for
//! precedence resolution.

pub mod resolver;
pub mod schema;

pub use resolver::{
    ConfigOverrides, DEFAULT_PRECISION, Resolved, ResolvedConfig, ValueSource, resolve_config,
};
pub use schema::{CONFIG_KEYS, IcerankConfig, MAX_PRECISION, OutputFormat, parse_thresholds};

use crate::{Error, Result};
use kdl::KdlDocument;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV: &str = "ICE_CONFIG_DIR";

/// File name inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.kdl";

/// Resolve the config directory: explicit path > `ICE_CONFIG_DIR` > platform default.
pub fn config_dir(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        if !dir.is_empty() {
            return Some(PathBuf::from(dir));
        }
    }
    dirs::config_dir().map(|dir| dir.join("icerank"))
}

/// Path of config.kdl inside a config directory.
pub fn config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE_NAME)
}

/// Load config.kdl from a directory. A missing file is an empty config.
pub fn load_config(dir: &Path) -> Result<IcerankConfig> {
    let path = config_path(dir);
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(IcerankConfig::new());
    }

    let raw = fs::read_to_string(&path)?;
    let doc: KdlDocument = raw
        .parse()
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;
    IcerankConfig::from_kdl(&doc)
        .map_err(|e| Error::Config(format!("Invalid {}: {}", path.display(), e)))
}

/// Write config.kdl into a directory, creating the directory if needed.
pub fn write_config(dir: &Path, config: &IcerankConfig) -> Result<PathBuf> {
    config.validate().map_err(Error::Config)?;
    fs::create_dir_all(dir)?;
    let path = config_path(dir);
    fs::write(&path, config.to_kdl().to_string())?;
    Ok(path)
}
