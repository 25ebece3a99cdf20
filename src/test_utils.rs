//! Shared test utilities.
//!
//! Helpers for setting up test databases and building records with sensible
//! defaults, so individual tests only spell out the fields they care about.

use crate::{
    core::{NetworkType, ProductId, ProductInput, ProductRecord, SimProvider},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use tracing_subscriber::EnvFilter;

/// Routes tracing output through the test harness. Safe to call repeatedly.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// A complete, valid input.
///
/// # Defaults
/// * `productName`: "DWLR", `model`: "DW-200"
/// * `deviceUID`: `"UID-<serial>"`
/// * `activationDate`: 2024-03-15, `validityPeriod`: 12 (renews 2025-03-15)
/// * `industryCategory`: "Water Resources"
/// * network 4G, provider VI
pub fn sample_input(serial_number: &str, end_user_name: &str) -> ProductInput {
    ProductInput {
        serial_number: serial_number.to_string(),
        oem_serial_number: Some(format!("OEM-{serial_number}")),
        product_name: "DWLR".to_string(),
        model: Some("DW-200".to_string()),
        device_uid: format!("UID-{serial_number}"),
        network_type: NetworkType::FourG,
        cable_length: Some("15m".to_string()),
        installation_date: NaiveDate::from_ymd_opt(2024, 3, 10),
        activation_date: NaiveDate::from_ymd_opt(2024, 3, 15),
        validity_period: Some(12),
        sim_provider: SimProvider::Vi,
        sim_number: Some(format!("SIM-{serial_number}")),
        channel_partner: Some("Northwind".to_string()),
        end_user_name: end_user_name.to_string(),
        industry_category: "Water Resources".to_string(),
    }
}

/// A stored record built from [`sample_input`].
pub fn sample_record(id: i64, serial_number: &str, end_user_name: &str) -> ProductRecord {
    ProductRecord::new(ProductId::new(id), sample_input(serial_number, end_user_name))
}
