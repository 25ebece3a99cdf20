//! Text rendering for CLI output.
//!
//! Pure functions from analytics results to strings, so the layout can be
//! tested without a terminal.

use crate::{
    core::{
        Field, ProductRecord, SimRecord,
        analytics::{ClientRollup, StatusSummary},
        renewal::{self, ExpiryStatus},
    },
    errors::Result,
};
use chrono::NaiveDate;
use std::fmt::Write;

/// One line per record: id, serial, product, client, renewal date and status.
pub fn format_record_table<'a>(
    records: impl IntoIterator<Item = &'a ProductRecord>,
    today: NaiveDate,
    window_days: i64,
) -> Result<String> {
    let mut out = String::new();
    for record in records {
        let status = ExpiryStatus::classify(record.renewal_date, today, window_days);
        writeln!(
            out,
            "#{} | {} | {} | {} | {} | {}",
            record.id,
            record.serial_number,
            record.product_name,
            record.end_user_name,
            or_dash(&record.field_value(Field::RenewalDate)),
            status
        )?;
    }
    if out.is_empty() {
        out.push_str("No matching products.\n");
    }
    Ok(out)
}

/// Every field of a record, one per line.
pub fn format_record_detail(record: &ProductRecord) -> Result<String> {
    let mut out = String::new();
    for field in Field::ALL {
        writeln!(out, "{:<17} {}", format!("{field}:"), or_dash(&record.field_value(field)))?;
    }
    Ok(out)
}

/// Dashboard headline counts.
#[must_use]
pub fn format_status_summary(summary: &StatusSummary) -> String {
    format!(
        "Total installations: {}\nActive: {}\nExpiring soon: {}\nExpired: {}\nNo validity data: {}\n",
        summary.total, summary.active, summary.expiring_soon, summary.expired, summary.unknown
    )
}

/// Alert list for expired / expiring units with days overdue or remaining.
pub fn format_alerts<'a>(
    alerts: impl IntoIterator<Item = (&'a ProductRecord, ExpiryStatus)>,
    today: NaiveDate,
) -> Result<String> {
    let mut out = String::new();
    for (record, status) in alerts {
        let Some(renewal_date) = record.renewal_date else {
            continue;
        };
        let detail = if status == ExpiryStatus::Expired {
            format!("{} days overdue", renewal::days_overdue(renewal_date, today))
        } else {
            format!("{} days left", (renewal_date - today).num_days())
        };
        writeln!(
            out,
            "⚠️ {} | {} | renews {} | {} ({})",
            record.serial_number, record.end_user_name, renewal_date, status, detail
        )?;
    }
    Ok(out)
}

/// Category counts with their share of `total`.
pub fn format_distribution(counts: &[(String, usize)], total: usize) -> Result<String> {
    let mut out = String::new();
    for (label, count) in counts {
        // Cast safety: counts are far below f64's exact-integer range.
        #[allow(clippy::cast_precision_loss)]
        let share = if total == 0 {
            0.0
        } else {
            (*count as f64 / total as f64) * 100.0
        };
        writeln!(out, "{label}: {count} ({share:.1}%)")?;
    }
    Ok(out)
}

/// Summary block for one client.
#[must_use]
pub fn format_rollup(rollup: &ClientRollup) -> String {
    let industries = if rollup.industries.is_empty() {
        "-".to_string()
    } else {
        rollup
            .industries
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!(
        "{}: {} products, {} expired | industries: {}\n",
        rollup.client, rollup.total_products, rollup.expired_products, industries
    )
}

/// One line per SIM: number, provider, status, holder, plan and entry date.
pub fn format_sim_table<'a>(sims: impl IntoIterator<Item = &'a SimRecord>) -> Result<String> {
    let mut out = String::new();
    for sim in sims {
        writeln!(
            out,
            "{} | {} | {} | {} | {} | {}",
            sim.sim_number,
            sim.provider,
            sim.status,
            sim.used_in.as_deref().unwrap_or("-"),
            sim.plan_details.as_deref().unwrap_or("-"),
            sim.entry_date
                .map_or_else(|| "-".to_string(), |date| date.to_string())
        )?;
    }
    if out.is_empty() {
        out.push_str("No SIMs.\n");
    }
    Ok(out)
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}
