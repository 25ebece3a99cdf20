/// Database configuration and connection management
pub mod database;

/// Tracker settings loaded from config.toml
pub mod settings;

pub use settings::{DEFAULT_CONFIG_PATH, Settings, load_settings_or_default};
