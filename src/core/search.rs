//! Case-insensitive substring search over product records.

use crate::{
    core::product::{Field, ProductRecord},
    errors::{Error, Result},
};
use std::{fmt, str::FromStr};

/// Which part of a record a search term is matched against.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum SearchColumn {
    /// Match if any field contains the term
    #[default]
    All,
    /// Match against a single field
    Field(Field),
}

impl FromStr for SearchColumn {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Field)
        }
    }
}

impl fmt::Display for SearchColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Field(field) => fmt::Display::fmt(field, f),
        }
    }
}

/// Lazily yields the records matching `term` in `column`, in source order.
///
/// An empty term matches every record. The returned iterator is `Clone`, so a
/// view can be walked again without re-running the caller's setup.
pub fn search<'a>(
    records: &'a [ProductRecord],
    term: &str,
    column: SearchColumn,
) -> impl Iterator<Item = &'a ProductRecord> + Clone + use<'a> {
    let needle = term.to_lowercase();
    records
        .iter()
        .filter(move |record| matches(record, &needle, column))
}

/// Whether `record` contains the already lower-cased `needle` in `column`.
fn matches(record: &ProductRecord, needle: &str, column: SearchColumn) -> bool {
    if needle.is_empty() {
        return true;
    }
    let contains = |field: Field| record.field_value(field).to_lowercase().contains(needle);
    match column {
        SearchColumn::All => Field::ALL.into_iter().any(contains),
        SearchColumn::Field(field) => contains(field),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::sample_record;

    fn named(id: i64, product_name: &str) -> ProductRecord {
        let mut record = sample_record(id, &format!("SN-{id}"), "Client");
        record.product_name = product_name.to_string();
        record
    }

    #[test]
    fn test_empty_term_returns_everything_in_order() {
        let records = vec![named(1, "Alpha"), named(2, "beta"), named(3, "Gamma")];

        let ids: Vec<i64> = search(&records, "", SearchColumn::All)
            .map(|r| r.id.get())
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_all_columns_case_insensitive() {
        let records = vec![named(1, "Alpha"), named(2, "beta")];

        let hits: Vec<&ProductRecord> = search(&records, "ALP", SearchColumn::All).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].product_name, "Alpha");
    }

    #[test]
    fn test_specific_column_only_checks_that_field() {
        let mut first = named(1, "DWLR");
        first.end_user_name = "Ganga Board".to_string();
        let second = named(2, "Ganga Meter");
        let records = vec![first, second];

        let column: SearchColumn = "endUserName".parse().unwrap();
        let ids: Vec<i64> = search(&records, "ganga", column).map(|r| r.id.get()).collect();
        assert_eq!(ids, vec![1]);

        let ids: Vec<i64> = search(&records, "ganga", SearchColumn::All)
            .map(|r| r.id.get())
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_absent_optional_field_matches_only_empty_term() {
        let mut record = named(1, "DWLR");
        record.model = None;
        let records = vec![record];
        let column = SearchColumn::Field(Field::Model);

        assert_eq!(search(&records, "x", column).count(), 0);
        assert_eq!(search(&records, "", column).count(), 1);
    }

    #[test]
    fn test_dates_are_searchable_as_iso_strings() {
        let records = vec![named(1, "DWLR")];
        let column = SearchColumn::Field(Field::RenewalDate);

        assert_eq!(search(&records, "2025-03", column).count(), 1);
    }

    #[test]
    fn test_view_is_restartable() {
        let records = vec![named(1, "Alpha"), named(2, "Alpine")];
        let view = search(&records, "alp", SearchColumn::All);

        assert_eq!(view.clone().count(), 2);
        assert_eq!(view.map(|r| r.id.get()).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_column_parsing() {
        assert_eq!("ALL".parse::<SearchColumn>().unwrap(), SearchColumn::All);
        assert_eq!(
            "simProvider".parse::<SearchColumn>().unwrap(),
            SearchColumn::Field(Field::SimProvider)
        );
        assert!("nope".parse::<SearchColumn>().is_err());
    }
}
