//! Snapshot store on top of the `collections` table.

use crate::{
    config::database::{create_connection, create_tables},
    core::{ProductRecord, SimRecord},
    entities::{Collection, collection},
    errors::Result,
    store::SnapshotStore,
};
use chrono::Utc;
use sea_orm::{Set, prelude::*};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument};

/// Collection the SIM inventory is kept under unless configured otherwise.
pub const DEFAULT_SIM_COLLECTION: &str = "sims";

/// Persists the record set and the SIM inventory as one JSON row each.
#[derive(Debug, Clone)]
pub struct DatabaseStore {
    db: DatabaseConnection,
    collection: String,
    sim_collection: String,
}

impl DatabaseStore {
    /// Wraps an existing connection. Tables must already exist.
    #[must_use]
    pub fn new(db: DatabaseConnection, collection: impl Into<String>) -> Self {
        Self {
            db,
            collection: collection.into(),
            sim_collection: DEFAULT_SIM_COLLECTION.to_string(),
        }
    }

    /// Stores the SIM inventory under `sim_collection` instead of the default.
    #[must_use]
    pub fn with_sim_collection(mut self, sim_collection: impl Into<String>) -> Self {
        self.sim_collection = sim_collection.into();
        self
    }

    /// Connects to `database_url` and ensures the schema exists.
    ///
    /// # Errors
    /// Returns an error if the connection or table creation fails.
    pub async fn connect(database_url: &str, collection: impl Into<String>) -> Result<Self> {
        let db = create_connection(database_url).await?;
        create_tables(&db).await?;
        Ok(Self::new(db, collection))
    }

    /// Name of the collection this store reads and writes records under.
    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Name of the collection holding the SIM inventory.
    #[must_use]
    pub fn sim_collection(&self) -> &str {
        &self.sim_collection
    }

    async fn find_row(&self, name: &str) -> Result<Option<collection::Model>> {
        Collection::find()
            .filter(collection::Column::Name.eq(name))
            .one(&self.db)
            .await
            .map_err(Into::into)
    }

    async fn load_payload<T: DeserializeOwned>(&self, name: &str) -> Result<Option<Vec<T>>> {
        let Some(row) = self.find_row(name).await? else {
            debug!("No stored snapshot");
            return Ok(None);
        };
        let items: Vec<T> = serde_json::from_str(&row.payload)?;
        debug!(count = items.len(), "Loaded stored snapshot");
        Ok(Some(items))
    }

    async fn save_payload<T: Serialize + Sync>(&self, name: &str, items: &[T]) -> Result<()> {
        let payload = serde_json::to_string(items)?;
        let now = Utc::now().naive_utc();

        if let Some(existing) = self.find_row(name).await? {
            let mut active_model: collection::ActiveModel = existing.into();
            active_model.payload = Set(payload);
            active_model.updated_at = Set(now);
            active_model.update(&self.db).await?;
        } else {
            let new_row = collection::ActiveModel {
                name: Set(name.to_string()),
                payload: Set(payload),
                updated_at: Set(now),
                ..Default::default()
            };
            new_row.insert(&self.db).await?;
        }

        debug!(count = items.len(), "Saved snapshot");
        Ok(())
    }
}

impl SnapshotStore for DatabaseStore {
    #[instrument(skip(self), fields(collection = %self.collection))]
    async fn load(&self) -> Result<Option<Vec<ProductRecord>>> {
        self.load_payload(&self.collection).await
    }

    #[instrument(skip(self, records), fields(collection = %self.collection, count = records.len()))]
    async fn save(&self, records: &[ProductRecord]) -> Result<()> {
        self.save_payload(&self.collection, records).await
    }

    #[instrument(skip(self), fields(collection = %self.sim_collection))]
    async fn load_sims(&self) -> Result<Option<Vec<SimRecord>>> {
        self.load_payload(&self.sim_collection).await
    }

    #[instrument(skip(self, sims), fields(collection = %self.sim_collection, count = sims.len()))]
    async fn save_sims(&self, sims: &[SimRecord]) -> Result<()> {
        self.save_payload(&self.sim_collection, sims).await
    }
}
