//! Renewal derivation and expiry classification.
//!
//! Everything here is a pure function of its arguments; "now" is always passed
//! in by the caller so results are reproducible in tests.

use chrono::{Months, NaiveDate};
use serde::Serialize;
use std::fmt;

/// Default window, in days, inside which a unit counts as expiring soon.
pub const DEFAULT_EXPIRING_SOON_DAYS: i64 = 30;

/// Adds `validity_months` calendar months to `activation`.
///
/// The day of month is kept when the target month has it and clamped to the
/// month's last day otherwise (Jan 31 + 1 month = Feb 28/29). Returns `None`
/// when either input is missing or the month count is zero.
#[must_use]
pub fn derive_renewal_date(
    activation: Option<NaiveDate>,
    validity_months: Option<u32>,
) -> Option<NaiveDate> {
    let activation = activation?;
    let months = validity_months.filter(|m| *m > 0)?;
    activation.checked_add_months(Months::new(months))
}

/// True iff `renewal` is present and strictly before `now`.
#[must_use]
pub fn is_expired(renewal: Option<NaiveDate>, now: NaiveDate) -> bool {
    renewal.is_some_and(|date| date < now)
}

/// Whole days elapsed since `renewal`. Only meaningful for expired units.
#[must_use]
pub fn days_overdue(renewal: NaiveDate, now: NaiveDate) -> i64 {
    (now - renewal).num_days()
}

/// Whole days left until `renewal` (negative once overdue).
#[must_use]
pub fn days_remaining(renewal: Option<NaiveDate>, now: NaiveDate) -> Option<i64> {
    renewal.map(|date| (date - now).num_days())
}

/// Subscription state of a unit relative to a reference date.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum ExpiryStatus {
    /// Renewal date is more than the warning window away
    Active,
    /// Renewal date is today or within the warning window
    ExpiringSoon,
    /// Renewal date is in the past
    Expired,
    /// No renewal date (incomplete validity data)
    Unknown,
}

impl ExpiryStatus {
    /// Classifies a renewal date against `now` with a warning window of
    /// `window_days`.
    #[must_use]
    pub fn classify(renewal: Option<NaiveDate>, now: NaiveDate, window_days: i64) -> Self {
        match days_remaining(renewal, now) {
            None => Self::Unknown,
            Some(days) if days < 0 => Self::Expired,
            Some(days) if days <= window_days => Self::ExpiringSoon,
            Some(_) => Self::Active,
        }
    }

    /// Label used in CLI output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::ExpiringSoon => "Expiring Soon",
            Self::Expired => "Expired",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ExpiryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
