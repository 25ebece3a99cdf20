//! Tracker service - the repository wired to its persistence collaborator.
//!
//! The lifecycle is explicit: [`Tracker::init`] restores the last snapshots of
//! records and SIMs (or starts empty), every successful mutation hands fresh
//! snapshots to the store, and [`Tracker::teardown`] performs a final save. Saves after a
//! mutation are best-effort: a failure is logged and the in-memory change
//! stands.

use crate::{
    core::{ProductId, ProductInput, ProductRecord, ProductRow, Repository, SimProvider, SimRecord},
    errors::Result,
    spreadsheet,
    store::SnapshotStore,
};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// Owns the canonical record set and keeps the store in step with it.
#[derive(Debug)]
pub struct Tracker<S> {
    repository: Repository,
    store: S,
}

impl<S: SnapshotStore> Tracker<S> {
    /// Restores the record set from `store`, or starts empty if it holds nothing.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read or its snapshot is corrupt.
    #[instrument(skip(store))]
    pub async fn init(store: S) -> Result<Self> {
        let mut repository = Repository::new();
        if let Some(records) = store.load().await? {
            repository.replace_all(records.into_iter().map(ProductRow::from))?;
            info!(count = repository.len(), "Restored product records");
        } else {
            info!("No stored product records; starting empty");
        }
        if let Some(sims) = store.load_sims().await? {
            repository.restore_sims(sims);
            info!(count = repository.sims().len(), "Restored SIM inventory");
        }
        Ok(Self { repository, store })
    }

    /// Read access for search and analytics.
    #[must_use]
    pub const fn repository(&self) -> &Repository {
        &self.repository
    }

    /// Current record set.
    #[must_use]
    pub fn records(&self) -> &[ProductRecord] {
        self.repository.snapshot()
    }

    /// See [`Repository::create`].
    ///
    /// # Errors
    /// Returns the repository's validation or duplicate-serial error.
    pub async fn create(&mut self, input: ProductInput) -> Result<ProductRecord> {
        let record = self.repository.create(input)?;
        self.persist().await;
        Ok(record)
    }

    /// See [`Repository::update`].
    ///
    /// # Errors
    /// Returns the repository's not-found, validation or duplicate-serial error.
    pub async fn update(&mut self, id: ProductId, input: ProductInput) -> Result<ProductRecord> {
        let record = self.repository.update(id, input)?;
        self.persist().await;
        Ok(record)
    }

    /// See [`Repository::delete`].
    ///
    /// # Errors
    /// Returns [`Error::ProductNotFound`](crate::errors::Error::ProductNotFound)
    /// if no record has this id.
    pub async fn delete(&mut self, id: ProductId) -> Result<ProductRecord> {
        let record = self.repository.delete(id)?;
        self.persist().await;
        Ok(record)
    }

    /// Replaces the whole record set and saves it.
    ///
    /// # Errors
    /// Returns [`Error::IdSpaceExhausted`](crate::errors::Error::IdSpaceExhausted)
    /// if the rows need more fresh ids than are left.
    pub async fn replace_all(&mut self, rows: Vec<ProductRow>) -> Result<()> {
        self.repository.replace_all(rows)?;
        self.persist().await;
        Ok(())
    }

    /// Stocks a new SIM and saves.
    ///
    /// # Errors
    /// Returns the inventory's validation or duplicate-SIM error.
    pub async fn add_sim(
        &mut self,
        sim_number: &str,
        provider: SimProvider,
        plan_details: Option<String>,
        today: NaiveDate,
    ) -> Result<SimRecord> {
        let sim = self
            .repository
            .add_sim(sim_number, provider, plan_details, today)?;
        self.persist().await;
        Ok(sim)
    }

    /// Reads a spreadsheet and replaces the record set with its rows.
    ///
    /// The file is parsed completely before anything is touched, so a bad file
    /// leaves the current records exactly as they were.
    ///
    /// # Errors
    /// Returns [`Error::Import`](crate::errors::Error::Import) if the file
    /// cannot be read or parsed.
    #[instrument(skip(self))]
    pub async fn import_file(&mut self, path: &Path) -> Result<usize> {
        let rows = spreadsheet::read_import_file(path).await?;
        let count = rows.len();
        self.replace_all(rows).await?;
        info!(count, "Imported product records");
        Ok(count)
    }

    /// Writes the full record set to a dated spreadsheet in `dir`.
    ///
    /// # Errors
    /// Returns [`Error::Export`](crate::errors::Error::Export) if writing fails.
    pub async fn export_file(&self, dir: &Path, today: NaiveDate) -> Result<PathBuf> {
        spreadsheet::write_export_file(dir, self.records(), today).await
    }

    /// Final save before shutdown. Unlike per-mutation saves, failure here is
    /// reported to the caller.
    ///
    /// # Errors
    /// Returns the store's error if the save fails.
    #[instrument(skip(self))]
    pub async fn teardown(self) -> Result<()> {
        self.store.save(self.repository.snapshot()).await?;
        self.store.save_sims(self.repository.sims().snapshot()).await?;
        info!(count = self.repository.len(), "Saved product records on shutdown");
        Ok(())
    }

    async fn persist(&self) {
        if let Err(e) = self.store.save(self.repository.snapshot()).await {
            warn!("Failed to persist product records: {}", e);
        }
        if let Err(e) = self.store.save_sims(self.repository.sims().snapshot()).await {
            warn!("Failed to persist SIM inventory: {}", e);
        }
    }
}
