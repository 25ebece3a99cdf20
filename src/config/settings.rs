//! Application settings loaded from `config.toml`.
//!
//! Every key is optional. A missing file means all defaults, so the tool runs
//! out of the box; a present but malformed file is an error.

use crate::core::renewal::DEFAULT_EXPIRING_SOON_DAYS;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default config file location.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Tunable settings for the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Key under which the record snapshot is persisted
    pub collection_name: String,
    /// Key under which the SIM inventory is persisted
    pub sim_collection_name: String,
    /// Units renewing within this many days are flagged as expiring soon
    pub expiring_soon_days: i64,
    /// Directory export files are written into
    pub export_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            collection_name: "products".to_string(),
            sim_collection_name: "sims".to_string(),
            expiring_soon_days: DEFAULT_EXPIRING_SOON_DAYS,
            export_dir: PathBuf::from("."),
        }
    }
}

/// Loads settings from a TOML file.
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid or a value has the wrong type
/// - `expiring_soon_days` is negative
/// - A collection name is blank or both names are the same
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path_ref = path.as_ref();
    debug!("Attempting to load settings from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {path_ref:?}: {e}"),
    })?;
    parse_settings(&contents)
}

/// Loads settings from `path` if it exists, otherwise returns the defaults.
///
/// # Errors
/// Returns an error if the file exists but cannot be parsed.
pub fn load_settings_or_default<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path_ref = path.as_ref();
    if path_ref.exists() {
        load_settings(path_ref)
    } else {
        info!("No config file at {:?}; using default settings.", path_ref);
        Ok(Settings::default())
    }
}

fn parse_settings(contents: &str) -> Result<Settings> {
    let settings: Settings = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;

    if settings.expiring_soon_days < 0 {
        return Err(Error::Config {
            message: "expiring_soon_days cannot be negative".to_string(),
        });
    }
    if settings.collection_name.trim().is_empty() {
        return Err(Error::Config {
            message: "collection_name cannot be empty".to_string(),
        });
    }
    if settings.sim_collection_name.trim().is_empty() {
        return Err(Error::Config {
            message: "sim_collection_name cannot be empty".to_string(),
        });
    }
    if settings.sim_collection_name == settings.collection_name {
        return Err(Error::Config {
            message: "sim_collection_name must differ from collection_name".to_string(),
        });
    }

    Ok(settings)
}
