//! Aggregate analytics over the full record set.
//!
//! These functions are recomputed on every call from a repository snapshot.
//! Nothing is cached, so there is nothing to invalidate after a mutation.

use crate::core::{
    product::{NetworkType, ProductRecord, SimProvider},
    renewal::{self, ExpiryStatus},
};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Bucket used for records without an industry category.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Per-industry record counts, in order of first occurrence.
///
/// Missing or blank categories are counted under [`UNCATEGORIZED`]; the counts
/// always sum to `records.len()`.
#[must_use]
pub fn industry_distribution(records: &[ProductRecord]) -> Vec<(String, usize)> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();

    for record in records {
        let category = match record.industry_category.trim() {
            "" => UNCATEGORIZED,
            category => category,
        };
        if let Some(&index) = positions.get(category) {
            counts[index].1 += 1;
        } else {
            positions.insert(category, counts.len());
            counts.push((category.to_string(), 1));
        }
    }

    counts
}

/// Distinct, non-empty client names.
#[must_use]
pub fn clients(records: &[ProductRecord]) -> BTreeSet<String> {
    records
        .iter()
        .map(|record| record.end_user_name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Summary of one client's installed base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientRollup {
    /// The client (`endUserName`) this rollup covers
    pub client: String,
    /// Number of units owned by the client
    pub total_products: usize,
    /// Units whose renewal date has passed
    pub expired_products: usize,
    /// Distinct industry categories across the client's units
    pub industries: BTreeSet<String>,
}

/// Rolls up all records belonging to `client` as of `now`.
///
/// An unknown client yields a rollup with zero products.
#[must_use]
pub fn client_rollup(records: &[ProductRecord], client: &str, now: NaiveDate) -> ClientRollup {
    let client = client.trim();
    let owned = records
        .iter()
        .filter(|record| record.end_user_name.trim() == client);

    let mut rollup = ClientRollup {
        client: client.to_string(),
        total_products: 0,
        expired_products: 0,
        industries: BTreeSet::new(),
    };
    for record in owned {
        rollup.total_products += 1;
        if renewal::is_expired(record.renewal_date, now) {
            rollup.expired_products += 1;
        }
        let category = record.industry_category.trim();
        if !category.is_empty() {
            rollup.industries.insert(category.to_string());
        }
    }
    rollup
}

/// One rollup per distinct client, ordered by client name.
#[must_use]
pub fn client_rollups(records: &[ProductRecord], now: NaiveDate) -> Vec<ClientRollup> {
    clients(records)
        .iter()
        .map(|client| client_rollup(records, client, now))
        .collect()
}

/// Counts records on `network_type`.
///
/// Only "2G" and "4G" are ever counted: asking for an unrecognized value returns
/// zero even if records carry it. Widen [`NetworkType`] if real data needs more.
#[must_use]
pub fn count_by_network_type(records: &[ProductRecord], network_type: &NetworkType) -> usize {
    if !network_type.is_recognized() {
        return 0;
    }
    records
        .iter()
        .filter(|record| &record.network_type == network_type)
        .count()
}

/// Counts records on `provider`, with the same restriction to known values as
/// [`count_by_network_type`].
#[must_use]
pub fn count_by_sim_provider(records: &[ProductRecord], provider: &SimProvider) -> usize {
    if !provider.is_recognized() {
        return 0;
    }
    records
        .iter()
        .filter(|record| &record.sim_provider == provider)
        .count()
}

/// Records whose renewal date is strictly before `now`, in source order.
pub fn expired_records(
    records: &[ProductRecord],
    now: NaiveDate,
) -> impl Iterator<Item = &ProductRecord> + Clone {
    records
        .iter()
        .filter(move |record| renewal::is_expired(record.renewal_date, now))
}

/// Records that are expired or fall inside the warning window, in source order.
pub fn expiring_records(
    records: &[ProductRecord],
    now: NaiveDate,
    window_days: i64,
) -> impl Iterator<Item = (&ProductRecord, ExpiryStatus)> + Clone {
    records.iter().filter_map(move |record| {
        match ExpiryStatus::classify(record.renewal_date, now, window_days) {
            status @ (ExpiryStatus::Expired | ExpiryStatus::ExpiringSoon) => Some((record, status)),
            ExpiryStatus::Active | ExpiryStatus::Unknown => None,
        }
    })
}

/// Headline dashboard counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    /// All records
    pub total: usize,
    /// Renewing after the expiring-soon window
    pub active: usize,
    /// Renewing today or within the window
    pub expiring_soon: usize,
    /// Renewal date already passed
    pub expired: usize,
    /// Records with no renewal date
    pub unknown: usize,
}

/// Classifies every record and tallies the result.
#[must_use]
pub fn status_summary(records: &[ProductRecord], now: NaiveDate, window_days: i64) -> StatusSummary {
    records
        .iter()
        .fold(StatusSummary::default(), |mut summary, record| {
            summary.total += 1;
            match ExpiryStatus::classify(record.renewal_date, now, window_days) {
                ExpiryStatus::Active => summary.active += 1,
                ExpiryStatus::ExpiringSoon => summary.expiring_soon += 1,
                ExpiryStatus::Expired => summary.expired += 1,
                ExpiryStatus::Unknown => summary.unknown += 1,
            }
            summary
        })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::sample_record;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn with_category(id: i64, client: &str, category: &str) -> ProductRecord {
        let mut record = sample_record(id, &format!("SN-{id}"), client);
        record.industry_category = category.to_string();
        record
    }

    /// Fixture: three clients, one record without validity data.
    fn fleet() -> Vec<ProductRecord> {
        let mut expired = with_category(1, "Acme", "Water");
        expired.renewal_date = NaiveDate::from_ymd_opt(2025, 5, 1);

        let mut soon = with_category(2, "Acme", "Mining");
        soon.renewal_date = NaiveDate::from_ymd_opt(2025, 6, 20);

        let mut active = with_category(3, "Borealis", "Water");
        active.renewal_date = NaiveDate::from_ymd_opt(2026, 1, 1);

        let mut unknown = with_category(4, "Cobalt", "");
        unknown.validity_period = None;
        unknown.renewal_date = None;

        vec![expired, soon, active, unknown]
    }

    #[test]
    fn test_industry_distribution_keeps_first_occurrence_order() {
        let records = fleet();
        let distribution = industry_distribution(&records);

        assert_eq!(
            distribution,
            vec![
                ("Water".to_string(), 2),
                ("Mining".to_string(), 1),
                (UNCATEGORIZED.to_string(), 1),
            ]
        );
        let total: usize = distribution.iter().map(|(_, count)| count).sum();
        assert_eq!(total, records.len());
    }

    #[test]
    fn test_industry_distribution_empty() {
        assert!(industry_distribution(&[]).is_empty());
    }

    #[test]
    fn test_clients_skips_empty_names() {
        let mut records = fleet();
        records.push(with_category(5, "  ", "Water"));
        records.push(with_category(6, "Acme", "Water"));

        let names: Vec<String> = clients(&records).into_iter().collect();
        assert_eq!(names, vec!["Acme", "Borealis", "Cobalt"]);
    }

    #[test]
    fn test_client_rollup() {
        let records = fleet();
        let rollup = client_rollup(&records, "Acme", today());

        assert_eq!(rollup.total_products, 2);
        assert_eq!(rollup.expired_products, 1);
        assert_eq!(
            rollup.industries.into_iter().collect::<Vec<_>>(),
            vec!["Mining", "Water"]
        );
    }

    #[test]
    fn test_client_rollup_unknown_client_is_empty() {
        let rollup = client_rollup(&fleet(), "Nobody", today());
        assert_eq!(rollup.total_products, 0);
        assert!(rollup.industries.is_empty());
    }

    #[test]
    fn test_client_rollups_cover_every_client() {
        let rollups = client_rollups(&fleet(), today());
        let names: Vec<&str> = rollups.iter().map(|r| r.client.as_str()).collect();
        assert_eq!(names, vec!["Acme", "Borealis", "Cobalt"]);
        assert_eq!(rollups[2].expired_products, 0);
    }

    #[test]
    fn test_network_counts_ignore_unrecognized_values() {
        let mut records = fleet();
        records[0].network_type = NetworkType::TwoG;
        records[1].network_type = NetworkType::Unrecognized("3G".to_string());

        assert_eq!(count_by_network_type(&records, &NetworkType::TwoG), 1);
        assert_eq!(count_by_network_type(&records, &NetworkType::FourG), 2);
        assert_eq!(
            count_by_network_type(&records, &NetworkType::Unrecognized("3G".to_string())),
            0
        );
    }

    #[test]
    fn test_provider_counts_ignore_unrecognized_values() {
        let mut records = fleet();
        records[3].sim_provider = SimProvider::Airtel;
        records[2].sim_provider = SimProvider::Unrecognized("JIO".to_string());

        assert_eq!(count_by_sim_provider(&records, &SimProvider::Vi), 2);
        assert_eq!(count_by_sim_provider(&records, &SimProvider::Airtel), 1);
        assert_eq!(
            count_by_sim_provider(&records, &SimProvider::Unrecognized("JIO".to_string())),
            0
        );
    }

    #[test]
    fn test_expired_records_excludes_missing_validity() {
        let records = fleet();
        let far_future = NaiveDate::from_ymd_opt(2100, 1, 1).unwrap();

        let ids: Vec<i64> = expired_records(&records, today()).map(|r| r.id.get()).collect();
        assert_eq!(ids, vec![1]);

        let ids: Vec<i64> = expired_records(&records, far_future)
            .map(|r| r.id.get())
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_expiring_records_alert_list() {
        let records = fleet();
        let alerts: Vec<(i64, ExpiryStatus)> = expiring_records(&records, today(), 30)
            .map(|(r, status)| (r.id.get(), status))
            .collect();

        assert_eq!(
            alerts,
            vec![(1, ExpiryStatus::Expired), (2, ExpiryStatus::ExpiringSoon)]
        );
    }

    #[test]
    fn test_status_summary() {
        let summary = status_summary(&fleet(), today(), 30);
        assert_eq!(
            summary,
            StatusSummary {
                total: 4,
                active: 1,
                expiring_soon: 1,
                expired: 1,
                unknown: 1,
            }
        );
    }
}
