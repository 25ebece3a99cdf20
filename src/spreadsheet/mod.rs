//! Spreadsheet import and export.
//!
//! Files are CSV with a header row whose names are the camelCase product
//! field names (see [`Field::name`](crate::core::Field::name)). Export writes
//! every field in canonical order; import maps each row explicitly onto the
//! record schema and never trusts ambient shape.

/// Writing the record set out
pub mod export;
/// Reading rows in
pub mod import;

pub use export::{export_file_name, write_export_file, write_records};
pub use import::{parse_rows, read_import_file};
