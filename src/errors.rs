//! Unified error types for the product tracker.
//!
//! Every fallible operation in the crate returns [`Result`], so callers can
//! propagate with `?` from the repository up through the CLI.

use crate::core::product::ProductId;
use thiserror::Error;

/// All errors surfaced by the tracker.
#[derive(Debug, Error)]
pub enum Error {
    /// One or more required fields were empty on create/update.
    #[error("Missing required fields: {}", .fields.join(", "))]
    Validation {
        /// camelCase names of every violated field
        fields: Vec<&'static str>,
    },

    /// Update or delete referenced an id that is not in the record set.
    #[error("Product not found: {id}")]
    ProductNotFound {
        /// The id that was looked up
        id: ProductId,
    },

    /// Another record already carries this serial number.
    #[error("Serial number already exists: {serial_number}")]
    DuplicateSerial {
        /// The conflicting serial number
        serial_number: String,
    },

    /// The SIM inventory already holds this number.
    #[error("SIM already exists: {sim_number}")]
    DuplicateSim {
        /// The conflicting SIM number
        sim_number: String,
    },

    /// The SIM is already installed in a different unit.
    #[error("SIM {sim_number} is already used in {serial_number}")]
    SimInUse {
        /// The requested SIM number
        sim_number: String,
        /// Serial number of the unit holding it
        serial_number: String,
    },

    /// Every representable product id has been handed out.
    #[error("No product ids left to assign")]
    IdSpaceExhausted,

    /// Search was asked for a column that is not a product field.
    #[error("Unknown column: {column}")]
    UnknownColumn {
        /// The column name as given
        column: String,
    },

    /// A value is outside the accepted set for a field (e.g. network type "5G").
    #[error("Invalid value for {field}: {value:?}")]
    InvalidValue {
        /// camelCase field name
        field: &'static str,
        /// The rejected input
        value: String,
    },

    /// The spreadsheet could not be read or parsed. Nothing was replaced.
    #[error("Import failed: {message}")]
    Import {
        /// Human-readable cause, including row/column where known
        message: String,
    },

    /// The spreadsheet could not be written.
    #[error("Export failed: {message}")]
    Export {
        /// Human-readable cause
        message: String,
    },

    /// Configuration could not be loaded.
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable cause
        message: String,
    },

    /// Persistence layer failure.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Snapshot (de)serialization failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Text formatting failure while rendering output.
    #[error("Formatting error: {0}")]
    Format(#[from] std::fmt::Error),
}

impl Error {
    /// Builds an [`Error::Import`] from anything displayable.
    pub fn import(message: impl Into<String>) -> Self {
        Self::Import {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
