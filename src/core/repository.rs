//! In-memory product repository - the canonical record set.
//!
//! The repository owns identity assignment and every mutation. Each mutating
//! operation either succeeds completely or leaves the set exactly as it was;
//! derivation of renewal dates happens once, inside the mutation, via
//! [`ProductRecord::new`]. The SIM inventory lives alongside the records so
//! that installing a SIM and saving the unit happen together.

use crate::{
    core::{
        product::{ProductId, ProductInput, ProductRecord, ProductRow, SimProvider},
        sim::{SimInventory, SimRecord},
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::{debug, info};

/// Canonical, ordered collection of product records.
#[derive(Debug, Clone)]
pub struct Repository {
    records: Vec<ProductRecord>,
    /// Next id to hand out. Only ever grows, so deleted ids are never reused.
    next_id: i64,
    sims: SimInventory,
}

impl Default for Repository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository {
    /// Creates an empty repository.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
            next_id: 1,
            sims: SimInventory::new(),
        }
    }

    /// Read-only view of the current record set, in insertion order.
    #[must_use]
    pub fn snapshot(&self) -> &[ProductRecord] {
        &self.records
    }

    /// Looks up a record by id.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&ProductRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    /// Number of records held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the repository holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The SIM inventory.
    #[must_use]
    pub const fn sims(&self) -> &SimInventory {
        &self.sims
    }

    /// Validates and stores a new record, assigning it a fresh id.
    ///
    /// A SIM number on the record is marked as used by the new unit.
    ///
    /// # Errors
    /// Returns an error if:
    /// - Any required field is empty ([`Error::Validation`], listing all of them)
    /// - Another record already has the same serial number
    /// - The SIM is installed in another unit ([`Error::SimInUse`])
    /// - No id is left to assign ([`Error::IdSpaceExhausted`])
    pub fn create(&mut self, input: ProductInput) -> Result<ProductRecord> {
        let input = input.normalized();
        input.validate()?;
        self.ensure_unique_serial(&input.serial_number, None)?;
        if let Some(sim_number) = &input.sim_number {
            self.sims
                .ensure_assignable(sim_number, &input.serial_number, None)?;
        }

        let id = self.allocate_id()?;
        let record = ProductRecord::new(id, input);
        if let Some(sim_number) = &record.sim_number {
            self.sims
                .assign(sim_number, &record.serial_number, &record.sim_provider);
        }
        self.records.push(record.clone());

        info!(%id, serial_number = %record.serial_number, "Created product record");
        Ok(record)
    }

    /// Replaces the record with `id` in place, keeping its id and position.
    ///
    /// If the SIM number changes, the old SIM goes back into stock and the new
    /// one is marked used.
    ///
    /// # Errors
    /// Returns an error if:
    /// - No record has this id ([`Error::ProductNotFound`])
    /// - Any required field is empty
    /// - A different record already has the new serial number
    /// - The new SIM is installed in another unit
    pub fn update(&mut self, id: ProductId, input: ProductInput) -> Result<ProductRecord> {
        let index = self.position(id)?;
        let input = input.normalized();
        input.validate()?;
        self.ensure_unique_serial(&input.serial_number, Some(id))?;
        if let Some(sim_number) = &input.sim_number {
            let previous_serial = self.records[index].serial_number.as_str();
            self.sims
                .ensure_assignable(sim_number, &input.serial_number, Some(previous_serial))?;
        }

        let record = ProductRecord::new(id, input);
        let previous = std::mem::replace(&mut self.records[index], record.clone());
        if let Some(sim_number) = &previous.sim_number {
            self.sims.release(sim_number, &previous.serial_number);
        }
        if let Some(sim_number) = &record.sim_number {
            self.sims
                .assign(sim_number, &record.serial_number, &record.sim_provider);
        }

        info!(%id, "Updated product record");
        Ok(record)
    }

    /// Removes the record with `id`, returning its SIM to stock.
    ///
    /// # Errors
    /// Returns [`Error::ProductNotFound`] if no record has this id.
    pub fn delete(&mut self, id: ProductId) -> Result<ProductRecord> {
        let index = self.position(id)?;
        let removed = self.records.remove(index);
        if let Some(sim_number) = &removed.sim_number {
            self.sims.release(sim_number, &removed.serial_number);
        }

        info!(%id, "Deleted product record");
        Ok(removed)
    }

    /// Bulk-loads `rows`, discarding the current set. The SIM inventory is
    /// left as it is.
    ///
    /// Rows are not checked for required fields, so partial legacy data loads
    /// as-is; renewal dates are still derived. A row keeps its id unless it has
    /// none, its id is not assignable, or an earlier row in the batch already
    /// claimed it, in which case it gets a fresh one.
    ///
    /// # Errors
    /// Returns [`Error::IdSpaceExhausted`] if fresh ids run out. The current set
    /// is kept in that case.
    pub fn replace_all(&mut self, rows: impl IntoIterator<Item = ProductRow>) -> Result<()> {
        let rows: Vec<ProductRow> = rows.into_iter().collect();

        let highest_kept = rows
            .iter()
            .filter_map(|row| row.id)
            .map(ProductId::get)
            .filter(|raw| ProductId::is_assignable(*raw))
            .max()
            .unwrap_or(0);
        let mut next_id = self
            .next_id
            .max(highest_kept.checked_add(1).ok_or(Error::IdSpaceExhausted)?);

        let mut seen = HashSet::with_capacity(rows.len());
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let id = match row.id {
                Some(id) if ProductId::is_assignable(id.get()) && seen.insert(id) => id,
                _ => {
                    let fresh = take_id(&mut next_id)?;
                    seen.insert(fresh);
                    fresh
                }
            };
            records.push(ProductRecord::new(id, row.input.normalized()));
        }

        debug!(
            previous = self.records.len(),
            loaded = records.len(),
            "Replacing product record set"
        );
        self.records = records;
        self.next_id = next_id;
        Ok(())
    }

    /// Stocks a new SIM. See [`SimInventory::add`].
    ///
    /// # Errors
    /// Returns the inventory's validation or duplicate-SIM error.
    pub fn add_sim(
        &mut self,
        sim_number: &str,
        provider: SimProvider,
        plan_details: Option<String>,
        today: NaiveDate,
    ) -> Result<SimRecord> {
        self.sims.add(sim_number, provider, plan_details, today)
    }

    /// Replaces the SIM inventory with a stored snapshot.
    pub fn restore_sims(&mut self, sims: Vec<SimRecord>) {
        self.sims = SimInventory::from_records(sims);
    }

    fn allocate_id(&mut self) -> Result<ProductId> {
        take_id(&mut self.next_id)
    }

    fn position(&self, id: ProductId) -> Result<usize> {
        self.records
            .iter()
            .position(|record| record.id == id)
            .ok_or(Error::ProductNotFound { id })
    }

    fn ensure_unique_serial(&self, serial_number: &str, except: Option<ProductId>) -> Result<()> {
        let taken = self
            .records
            .iter()
            .filter(|record| Some(record.id) != except)
            .any(|record| record.serial_number.trim() == serial_number);

        if taken {
            Err(Error::DuplicateSerial {
                serial_number: serial_number.to_string(),
            })
        } else {
            Ok(())
        }
    }
}

/// Hands out `*next` and advances it, refusing ids that are not assignable.
fn take_id(next: &mut i64) -> Result<ProductId> {
    if !ProductId::is_assignable(*next) {
        return Err(Error::IdSpaceExhausted);
    }
    let id = ProductId::new(*next);
    *next = next.checked_add(1).ok_or(Error::IdSpaceExhausted)?;
    Ok(id)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        core::sim::SimStatus,
        test_utils::{init_test_tracing, sample_input},
    };

    fn repo_with(serials: &[&str]) -> Repository {
        let mut repo = Repository::new();
        for serial in serials {
            repo.create(sample_input(serial, "Acme")).unwrap();
        }
        repo
    }

    #[test]
    fn test_create_assigns_ids_and_derives_renewal() {
        init_test_tracing();
        let mut repo = Repository::new();

        let first = repo.create(sample_input("SN-1", "Acme")).unwrap();
        let second = repo.create(sample_input("SN-2", "Acme")).unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(first.renewal_date, NaiveDate::from_ymd_opt(2025, 3, 15));
        assert_eq!(repo.len(), 2);
        assert_eq!(repo.snapshot()[1], second);
    }

    #[test]
    fn test_create_missing_end_user_fails_without_storing() {
        let mut repo = repo_with(&["SN-1"]);
        let mut input = sample_input("SN-2", "Acme");
        input.end_user_name = String::new();

        let Err(Error::Validation { fields }) = repo.create(input) else {
            panic!("expected validation error");
        };
        assert!(fields.contains(&"endUserName"));
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn test_create_rejects_duplicate_serial() {
        let mut repo = repo_with(&["SN-1"]);

        let err = repo.create(sample_input(" SN-1 ", "Other")).unwrap_err();
        assert!(matches!(err, Error::DuplicateSerial { serial_number } if serial_number == "SN-1"));
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn test_update_preserves_id_and_rederives() {
        let mut repo = repo_with(&["SN-1", "SN-2"]);
        let id = repo.snapshot()[0].id;

        let mut input = sample_input("SN-1", "Acme");
        input.activation_date = NaiveDate::from_ymd_opt(2024, 1, 31);
        input.validity_period = Some(1);
        let updated = repo.update(id, input).unwrap();

        assert_eq!(updated.id, id);
        assert_eq!(updated.renewal_date, NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(repo.snapshot()[0], updated);
        assert_eq!(repo.len(), 2);
    }

    #[test]
    fn test_update_may_keep_its_own_serial_but_not_take_another() {
        let mut repo = repo_with(&["SN-1", "SN-2"]);
        let id = repo.snapshot()[0].id;

        assert!(repo.update(id, sample_input("SN-1", "Renamed")).is_ok());
        assert!(matches!(
            repo.update(id, sample_input("SN-2", "Renamed")),
            Err(Error::DuplicateSerial { .. })
        ));
    }

    #[test]
    fn test_update_unknown_id_changes_nothing() {
        let mut repo = repo_with(&["SN-1", "SN-2"]);
        let before = repo.snapshot().to_vec();

        let err = repo
            .update(ProductId::new(999), sample_input("SN-9", "Acme"))
            .unwrap_err();
        assert!(matches!(err, Error::ProductNotFound { id } if id == ProductId::new(999)));
        assert_eq!(repo.snapshot(), before.as_slice());
    }

    #[test]
    fn test_update_validation_failure_changes_nothing() {
        let mut repo = repo_with(&["SN-1"]);
        let id = repo.snapshot()[0].id;
        let before = repo.snapshot().to_vec();

        let mut input = sample_input("SN-1", "Acme");
        input.activation_date = None;
        assert!(matches!(repo.update(id, input), Err(Error::Validation { .. })));
        assert_eq!(repo.snapshot(), before.as_slice());
    }

    #[test]
    fn test_delete() {
        let mut repo = repo_with(&["SN-1", "SN-2"]);
        let id = repo.snapshot()[0].id;

        let removed = repo.delete(id).unwrap();
        assert_eq!(removed.serial_number, "SN-1");
        assert_eq!(repo.len(), 1);
        assert!(repo.get(id).is_none());

        assert!(matches!(repo.delete(id), Err(Error::ProductNotFound { .. })));
    }

    #[test]
    fn test_ids_are_not_reused_after_delete() {
        let mut repo = repo_with(&["SN-1", "SN-2"]);
        let last = repo.snapshot()[1].id;
        repo.delete(last).unwrap();

        let fresh = repo.create(sample_input("SN-3", "Acme")).unwrap();
        assert!(fresh.id > last);
    }

    #[test]
    fn test_replace_all_keeps_ids_and_fills_gaps() {
        let mut repo = repo_with(&["SN-1"]);

        let mut partial = ProductInput {
            serial_number: "LEGACY".to_string(),
            ..Default::default()
        };
        partial.activation_date = NaiveDate::from_ymd_opt(2024, 3, 15);
        partial.validity_period = Some(12);

        repo.replace_all(vec![
            ProductRow {
                id: Some(ProductId::new(40)),
                input: sample_input("SN-40", "Acme"),
            },
            ProductRow {
                id: None,
                input: partial,
            },
            ProductRow {
                id: Some(ProductId::new(40)),
                input: sample_input("SN-dup", "Acme"),
            },
        ])
        .unwrap();

        let ids: Vec<i64> = repo.snapshot().iter().map(|r| r.id.get()).collect();
        assert_eq!(ids, vec![40, 41, 42]);
        assert_eq!(
            repo.snapshot()[1].renewal_date,
            NaiveDate::from_ymd_opt(2025, 3, 15)
        );
        assert!(repo.snapshot()[1].end_user_name.is_empty());

        let next = repo.create(sample_input("SN-new", "Acme")).unwrap();
        assert_eq!(next.id.get(), 43);
    }

    #[test]
    fn test_replace_all_with_nothing_empties_the_set() {
        let mut repo = repo_with(&["SN-1", "SN-2"]);
        repo.replace_all(Vec::new()).unwrap();

        assert!(repo.is_empty());
        let next = repo.create(sample_input("SN-3", "Acme")).unwrap();
        assert_eq!(next.id.get(), 3);
    }

    fn row(id: i64, serial: &str) -> ProductRow {
        ProductRow {
            id: Some(ProductId::new(id)),
            input: sample_input(serial, "Acme"),
        }
    }

    #[test]
    fn test_unassignable_ids_are_replaced_on_load() {
        let mut repo = Repository::new();
        repo.replace_all(vec![row(i64::MAX, "SN-max"), row(0, "SN-zero"), row(-4, "SN-neg")])
            .unwrap();

        let ids: Vec<i64> = repo.snapshot().iter().map(|r| r.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let next = repo.create(sample_input("SN-new", "Acme")).unwrap();
        assert_eq!(next.id.get(), 4);
    }

    #[test]
    fn test_exhausted_id_space_is_an_error_not_a_repeat() {
        let mut repo = Repository::new();
        repo.replace_all(vec![row(i64::MAX - 1, "SN-top")]).unwrap();

        let result = repo.create(sample_input("SN-next", "Acme"));
        assert!(matches!(result, Err(Error::IdSpaceExhausted)));
        assert_eq!(repo.len(), 1);

        let ids: HashSet<ProductId> = repo.snapshot().iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), repo.len());
    }

    #[test]
    fn test_exhausted_id_space_keeps_current_set_on_load() {
        let mut repo = repo_with(&["SN-1"]);
        let before = repo.snapshot().to_vec();

        let result = repo.replace_all(vec![
            row(i64::MAX - 1, "SN-top"),
            ProductRow {
                id: None,
                input: sample_input("SN-fresh", "Acme"),
            },
        ]);
        assert!(matches!(result, Err(Error::IdSpaceExhausted)));
        assert_eq!(repo.snapshot(), before.as_slice());
    }

    fn with_sim(serial: &str, sim: &str) -> ProductInput {
        let mut input = sample_input(serial, "Acme");
        input.sim_number = Some(sim.to_string());
        input
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[test]
    fn test_create_marks_stocked_sim_used() {
        let mut repo = Repository::new();
        repo.add_sim("8991", SimProvider::Vi, None, today()).unwrap();

        repo.create(with_sim("SN-1", "8991")).unwrap();

        let sim = repo.sims().get("8991").unwrap();
        assert_eq!(sim.status, SimStatus::Used);
        assert_eq!(sim.used_in.as_deref(), Some("SN-1"));
    }

    #[test]
    fn test_create_with_manual_sim_adds_it_to_inventory() {
        let mut repo = Repository::new();
        repo.create(with_sim("SN-1", "7000")).unwrap();

        assert_eq!(repo.sims().len(), 1);
        assert_eq!(repo.sims().get("7000").unwrap().status, SimStatus::Used);
    }

    #[test]
    fn test_create_rejects_sim_used_elsewhere() {
        let mut repo = Repository::new();
        repo.create(with_sim("SN-1", "8991")).unwrap();

        let result = repo.create(with_sim("SN-2", "8991"));
        assert!(matches!(result, Err(Error::SimInUse { .. })));
        assert_eq!(repo.len(), 1);
        assert_eq!(repo.sims().get("8991").unwrap().used_in.as_deref(), Some("SN-1"));
    }

    #[test]
    fn test_update_swaps_sims_and_delete_releases() {
        let mut repo = Repository::new();
        repo.add_sim("8991", SimProvider::Vi, None, today()).unwrap();
        repo.add_sim("8992", SimProvider::Vi, None, today()).unwrap();
        let record = repo.create(with_sim("SN-1", "8991")).unwrap();

        repo.update(record.id, with_sim("SN-1b", "8992")).unwrap();
        assert_eq!(repo.sims().get("8991").unwrap().status, SimStatus::Available);
        assert_eq!(repo.sims().get("8992").unwrap().used_in.as_deref(), Some("SN-1b"));

        repo.update(record.id, with_sim("SN-1c", "8992")).unwrap();
        assert_eq!(repo.sims().get("8992").unwrap().used_in.as_deref(), Some("SN-1c"));

        repo.delete(record.id).unwrap();
        assert_eq!(repo.sims().available().count(), 2);
    }
}
