//! CSV import boundary.
//!
//! Parsing is all-or-nothing: the first malformed row aborts the whole import
//! with [`Error::Import`], so callers never see (or apply) a partial result.

use crate::{
    core::{Field, NetworkType, ProductId, ProductInput, ProductRow, SimProvider},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::{io::Read, path::Path};
use tracing::{debug, info, instrument};

/// One spreadsheet row, as loosely typed as the file itself.
///
/// Unknown columns are ignored by serde; missing columns and empty cells
/// become `None`. `renewalDate` is deliberately absent because it is always
/// re-derived.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ImportRow {
    id: Option<String>,
    serial_number: Option<String>,
    oem_serial_number: Option<String>,
    product_name: Option<String>,
    model: Option<String>,
    #[serde(rename = "deviceUID")]
    device_uid: Option<String>,
    network_type: Option<String>,
    cable_length: Option<String>,
    installation_date: Option<String>,
    activation_date: Option<String>,
    validity_period: Option<String>,
    sim_provider: Option<String>,
    sim_number: Option<String>,
    channel_partner: Option<String>,
    end_user_name: Option<String>,
    industry_category: Option<String>,
}

/// Non-blank, trimmed cell contents.
fn cell(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn cell_error(line: usize, field: Field, value: &str, expected: &str) -> Error {
    Error::import(format!(
        "row {line}, column {field}: expected {expected}, found {value:?}"
    ))
}

fn parse_date(line: usize, field: Field, value: Option<String>) -> Result<Option<NaiveDate>> {
    cell(value)
        .map(|raw| {
            NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                .map_err(|_| cell_error(line, field, &raw, "a YYYY-MM-DD date"))
        })
        .transpose()
}

impl ImportRow {
    /// Maps the raw row onto the record schema. `line` is the 1-based file line.
    fn into_product_row(self, line: usize) -> Result<ProductRow> {
        let id = cell(self.id)
            .map(|raw| {
                raw.parse::<ProductId>()
                    .map_err(|_| cell_error(line, Field::Id, &raw, "a positive integer id"))
            })
            .transpose()?;
        let validity_period = cell(self.validity_period)
            .map(|raw| {
                raw.parse::<u32>()
                    .map_err(|_| cell_error(line, Field::ValidityPeriod, &raw, "a whole number of months"))
            })
            .transpose()?;

        let input = ProductInput {
            serial_number: cell(self.serial_number).unwrap_or_default(),
            oem_serial_number: cell(self.oem_serial_number),
            product_name: cell(self.product_name).unwrap_or_default(),
            model: cell(self.model),
            device_uid: cell(self.device_uid).unwrap_or_default(),
            network_type: cell(self.network_type)
                .map(NetworkType::from)
                .unwrap_or_default(),
            cable_length: cell(self.cable_length),
            installation_date: parse_date(line, Field::InstallationDate, self.installation_date)?,
            activation_date: parse_date(line, Field::ActivationDate, self.activation_date)?,
            validity_period,
            sim_provider: cell(self.sim_provider)
                .map(SimProvider::from)
                .unwrap_or_default(),
            sim_number: cell(self.sim_number),
            channel_partner: cell(self.channel_partner),
            end_user_name: cell(self.end_user_name).unwrap_or_default(),
            industry_category: cell(self.industry_category).unwrap_or_default(),
        };

        Ok(ProductRow { id, input })
    }
}

/// Parses CSV content into product rows.
///
/// # Errors
/// Returns [`Error::Import`] if:
/// - The content has no header row, or none of its columns is a product field
/// - A row is not valid CSV (e.g. ragged)
/// - An id, date or validity cell cannot be parsed
pub fn parse_rows<R: Read>(reader: R) -> Result<Vec<ProductRow>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| Error::import(format!("unreadable header row: {e}")))?
        .clone();

    // Header matching is case-insensitive; rows are deserialized by the
    // canonical camelCase names, so rewrite recognized headers to those.
    let mut known_columns = 0;
    let canonical: csv::StringRecord = headers
        .iter()
        .map(|header| match header.parse::<Field>() {
            Ok(field) => {
                known_columns += 1;
                field.name()
            }
            Err(_) => header,
        })
        .collect();
    if known_columns == 0 {
        return Err(Error::import(
            "header row does not contain any product field names",
        ));
    }
    reader.set_headers(canonical);
    debug!(columns = headers.len(), known_columns, "Parsed import header");

    let mut rows = Vec::new();
    for (index, result) in reader.deserialize::<ImportRow>().enumerate() {
        // Line 1 is the header.
        let line = index + 2;
        let raw = result.map_err(|e| Error::import(format!("row {line}: {e}")))?;
        rows.push(raw.into_product_row(line)?);
    }

    Ok(rows)
}

/// Reads and parses an import file.
///
/// # Errors
/// Returns [`Error::Import`] if the file cannot be read or parsed.
#[instrument]
pub async fn read_import_file(path: &Path) -> Result<Vec<ProductRow>> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| Error::import(format!("cannot read {}: {e}", path.display())))?;
    let rows = parse_rows(bytes.as_slice())?;
    info!(rows = rows.len(), "Parsed import file");
    Ok(rows)
}
