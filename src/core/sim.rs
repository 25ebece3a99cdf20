//! SIM card inventory.
//!
//! Stocked SIMs start out `Available`. Installing one in a unit marks it `Used`
//! and records the unit's serial number. A SIM number typed in by hand that was
//! never stocked is added at that point, already `Used`.

use crate::{
    core::product::{Field, SimProvider},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Whether a SIM is still in stock.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SimStatus {
    /// In stock, not installed anywhere
    #[default]
    Available,
    /// Installed in a unit
    Used,
}

impl SimStatus {
    /// Label used in CLI output and snapshots.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::Used => "Used",
        }
    }
}

impl fmt::Display for SimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One SIM card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimRecord {
    /// Unique SIM number
    pub sim_number: String,
    /// Network operator
    #[serde(default)]
    pub provider: SimProvider,
    /// Stock state
    #[serde(default)]
    pub status: SimStatus,
    /// Free-text tariff or plan
    #[serde(default)]
    pub plan_details: Option<String>,
    /// When the SIM was stocked; `None` for SIMs added on installation
    #[serde(default)]
    pub entry_date: Option<NaiveDate>,
    /// Serial number of the unit the SIM is installed in
    #[serde(default)]
    pub used_in: Option<String>,
}

/// All known SIMs, in the order they were added.
#[derive(Debug, Clone, Default)]
pub struct SimInventory {
    sims: Vec<SimRecord>,
}

impl SimInventory {
    /// Creates an empty inventory.
    #[must_use]
    pub const fn new() -> Self {
        Self { sims: Vec::new() }
    }

    /// Rebuilds an inventory from a stored snapshot. Later entries repeating
    /// an earlier SIM number are dropped.
    #[must_use]
    pub fn from_records(records: Vec<SimRecord>) -> Self {
        let mut inventory = Self::new();
        for mut record in records {
            record.sim_number = record.sim_number.trim().to_string();
            if record.sim_number.is_empty() || inventory.get(&record.sim_number).is_some() {
                debug!(sim_number = %record.sim_number, "Dropping repeated SIM entry");
                continue;
            }
            inventory.sims.push(record);
        }
        inventory
    }

    /// Read-only view of every SIM.
    #[must_use]
    pub fn snapshot(&self) -> &[SimRecord] {
        &self.sims
    }

    /// Looks up a SIM by number.
    #[must_use]
    pub fn get(&self, sim_number: &str) -> Option<&SimRecord> {
        let sim_number = sim_number.trim();
        self.sims.iter().find(|sim| sim.sim_number == sim_number)
    }

    /// Number of SIMs held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sims.len()
    }

    /// Whether the inventory is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sims.is_empty()
    }

    /// SIMs that can still be installed, in inventory order.
    pub fn available(&self) -> impl Iterator<Item = &SimRecord> + Clone {
        self.sims
            .iter()
            .filter(|sim| sim.status == SimStatus::Available)
    }

    /// Stocks a new SIM as `Available`.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The SIM number is blank ([`Error::Validation`])
    /// - The number is already in the inventory ([`Error::DuplicateSim`])
    pub fn add(
        &mut self,
        sim_number: &str,
        provider: SimProvider,
        plan_details: Option<String>,
        today: NaiveDate,
    ) -> Result<SimRecord> {
        let sim_number = sim_number.trim();
        if sim_number.is_empty() {
            return Err(Error::Validation {
                fields: vec![Field::SimNumber.name()],
            });
        }
        if self.get(sim_number).is_some() {
            return Err(Error::DuplicateSim {
                sim_number: sim_number.to_string(),
            });
        }

        let record = SimRecord {
            sim_number: sim_number.to_string(),
            provider,
            status: SimStatus::Available,
            plan_details: plan_details
                .map(|plan| plan.trim().to_string())
                .filter(|plan| !plan.is_empty()),
            entry_date: Some(today),
            used_in: None,
        };
        self.sims.push(record.clone());

        info!(sim_number, "Added SIM to inventory");
        Ok(record)
    }

    /// Checks that `sim_number` can go into the unit `serial_number`.
    ///
    /// Unknown and available SIMs always can. A used SIM can only stay with the
    /// unit that holds it, which may be known by `previous_serial` when the
    /// unit's own serial number is being changed.
    ///
    /// # Errors
    /// Returns [`Error::SimInUse`] if another unit holds the SIM.
    pub fn ensure_assignable(
        &self,
        sim_number: &str,
        serial_number: &str,
        previous_serial: Option<&str>,
    ) -> Result<()> {
        let Some(sim) = self.get(sim_number) else {
            return Ok(());
        };
        match (sim.status, sim.used_in.as_deref()) {
            (SimStatus::Used, Some(holder))
                if holder != serial_number && Some(holder) != previous_serial =>
            {
                Err(Error::SimInUse {
                    sim_number: sim.sim_number.clone(),
                    serial_number: holder.to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Marks `sim_number` as used by `serial_number`, adding it if unknown.
    pub(crate) fn assign(&mut self, sim_number: &str, serial_number: &str, provider: &SimProvider) {
        let sim_number = sim_number.trim();
        if let Some(sim) = self.sims.iter_mut().find(|sim| sim.sim_number == sim_number) {
            sim.status = SimStatus::Used;
            sim.used_in = Some(serial_number.to_string());
        } else {
            self.sims.push(SimRecord {
                sim_number: sim_number.to_string(),
                provider: provider.clone(),
                status: SimStatus::Used,
                plan_details: None,
                entry_date: None,
                used_in: Some(serial_number.to_string()),
            });
        }
        info!(sim_number, serial_number, "Assigned SIM");
    }

    /// Returns `sim_number` to stock if `serial_number` is the unit holding it.
    pub(crate) fn release(&mut self, sim_number: &str, serial_number: &str) {
        let sim_number = sim_number.trim();
        let held = self.sims.iter_mut().find(|sim| {
            sim.sim_number == sim_number && sim.used_in.as_deref() == Some(serial_number)
        });
        if let Some(sim) = held {
            sim.status = SimStatus::Available;
            sim.used_in = None;
            debug!(sim_number, serial_number, "Released SIM");
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn stocked(numbers: &[&str]) -> SimInventory {
        let mut inventory = SimInventory::new();
        for number in numbers {
            inventory
                .add(number, SimProvider::Vi, Some("1GB/month".to_string()), today())
                .unwrap();
        }
        inventory
    }

    #[test]
    fn test_add_stocks_available_sim() {
        let inventory = stocked(&[" 8991 "]);

        let sim = inventory.get("8991").unwrap();
        assert_eq!(sim.status, SimStatus::Available);
        assert_eq!(sim.entry_date, Some(today()));
        assert_eq!(sim.plan_details.as_deref(), Some("1GB/month"));
        assert_eq!(inventory.available().count(), 1);
    }

    #[test]
    fn test_add_rejects_duplicates_and_blanks() {
        let mut inventory = stocked(&["8991"]);

        assert!(matches!(
            inventory.add("8991", SimProvider::Airtel, None, today()),
            Err(Error::DuplicateSim { sim_number }) if sim_number == "8991"
        ));
        assert!(matches!(
            inventory.add("  ", SimProvider::Vi, None, today()),
            Err(Error::Validation { .. })
        ));
        assert_eq!(inventory.len(), 1);
    }

    #[test]
    fn test_assign_marks_stocked_sim_used() {
        let mut inventory = stocked(&["8991", "8992"]);
        inventory.assign("8991", "SN-1", &SimProvider::Vi);

        let sim = inventory.get("8991").unwrap();
        assert_eq!(sim.status, SimStatus::Used);
        assert_eq!(sim.used_in.as_deref(), Some("SN-1"));
        let available: Vec<&str> = inventory.available().map(|s| s.sim_number.as_str()).collect();
        assert_eq!(available, vec!["8992"]);
    }

    #[test]
    fn test_assign_adds_unknown_sim_as_used() {
        let mut inventory = SimInventory::new();
        inventory.assign("7000", "SN-9", &SimProvider::Airtel);

        let sim = inventory.get("7000").unwrap();
        assert_eq!(sim.status, SimStatus::Used);
        assert_eq!(sim.provider, SimProvider::Airtel);
        assert_eq!(sim.entry_date, None);
    }

    #[test]
    fn test_sim_held_elsewhere_is_not_assignable() {
        let mut inventory = stocked(&["8991"]);
        inventory.assign("8991", "SN-1", &SimProvider::Vi);

        assert!(inventory.ensure_assignable("8991", "SN-1", None).is_ok());
        assert!(inventory.ensure_assignable("8991", "SN-1-renamed", Some("SN-1")).is_ok());
        assert!(matches!(
            inventory.ensure_assignable("8991", "SN-2", None),
            Err(Error::SimInUse { serial_number, .. }) if serial_number == "SN-1"
        ));
        assert!(inventory.ensure_assignable("unknown", "SN-2", None).is_ok());
    }

    #[test]
    fn test_release_only_by_holder() {
        let mut inventory = stocked(&["8991"]);
        inventory.assign("8991", "SN-1", &SimProvider::Vi);

        inventory.release("8991", "SN-2");
        assert_eq!(inventory.get("8991").unwrap().status, SimStatus::Used);

        inventory.release("8991", "SN-1");
        let sim = inventory.get("8991").unwrap();
        assert_eq!(sim.status, SimStatus::Available);
        assert_eq!(sim.used_in, None);
    }

    #[test]
    fn test_from_records_drops_repeats() {
        let first = stocked(&["8991"]).snapshot()[0].clone();
        let mut repeat = first.clone();
        repeat.status = SimStatus::Used;

        let inventory = SimInventory::from_records(vec![first.clone(), repeat]);
        assert_eq!(inventory.snapshot(), &[first]);
    }
}
