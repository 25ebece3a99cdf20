//! CSV export of the full record set.

use crate::{
    core::{Field, ProductRecord},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use std::{
    io::Write,
    path::{Path, PathBuf},
};
use tracing::{info, instrument};

fn export_error(e: impl std::fmt::Display) -> Error {
    Error::Export {
        message: e.to_string(),
    }
}

/// File name for an export taken on `date`, e.g. `products_2025-06-01.csv`.
#[must_use]
pub fn export_file_name(date: NaiveDate) -> String {
    format!("products_{}.csv", date.format("%Y-%m-%d"))
}

/// Writes a header plus one row per record, columns in canonical field order.
///
/// # Errors
/// Returns [`Error::Export`] if the underlying writer fails.
pub fn write_records<W: Write>(writer: W, records: &[ProductRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);

    writer
        .write_record(Field::ALL.iter().map(|field| field.name()))
        .map_err(export_error)?;
    for record in records {
        writer
            .write_record(Field::ALL.iter().map(|field| record.field_value(*field)))
            .map_err(export_error)?;
    }
    writer.flush().map_err(export_error)?;
    Ok(())
}

/// Writes `records` to `<dir>/products_<date>.csv`, creating `dir` if needed.
///
/// # Errors
/// Returns [`Error::Export`] if the directory or file cannot be written.
#[instrument(skip(records), fields(count = records.len()))]
pub async fn write_export_file(
    dir: &Path,
    records: &[ProductRecord],
    date: NaiveDate,
) -> Result<PathBuf> {
    let mut buffer = Vec::new();
    write_records(&mut buffer, records)?;

    tokio::fs::create_dir_all(dir).await.map_err(export_error)?;
    let path = dir.join(export_file_name(date));
    tokio::fs::write(&path, buffer).await.map_err(export_error)?;

    info!(path = %path.display(), "Exported product records");
    Ok(path)
}
