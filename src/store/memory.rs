//! In-memory snapshot store.

use crate::{
    core::{ProductRecord, SimRecord},
    errors::Result,
    store::SnapshotStore,
};
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Default)]
struct Inner {
    snapshot: Option<Vec<ProductRecord>>,
    sims: Option<Vec<SimRecord>>,
    saves: usize,
}

/// Keeps the last saved snapshot in process memory.
///
/// Clones share the same storage, so a test can hand one clone to a tracker and
/// inspect what was saved through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `records`.
    #[must_use]
    pub fn with_records(records: Vec<ProductRecord>) -> Self {
        let store = Self::new();
        store.lock().snapshot = Some(records);
        store
    }

    /// The most recently saved snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Option<Vec<ProductRecord>> {
        self.lock().snapshot.clone()
    }

    /// The most recently saved SIM inventory.
    #[must_use]
    pub fn sims(&self) -> Option<Vec<SimRecord>> {
        self.lock().sims.clone()
    }

    /// How many times `save` has been called.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.lock().saves
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SnapshotStore for MemoryStore {
    async fn load(&self) -> Result<Option<Vec<ProductRecord>>> {
        Ok(self.snapshot())
    }

    async fn save(&self, records: &[ProductRecord]) -> Result<()> {
        let mut inner = self.lock();
        inner.snapshot = Some(records.to_vec());
        inner.saves += 1;
        Ok(())
    }

    async fn load_sims(&self) -> Result<Option<Vec<SimRecord>>> {
        Ok(self.sims())
    }

    async fn save_sims(&self, sims: &[SimRecord]) -> Result<()> {
        self.lock().sims = Some(sims.to_vec());
        Ok(())
    }
}
