//! Persistence collaborators for the record set.
//!
//! The tracker only needs "load the last snapshot" and "save this snapshot",
//! once for product records and once for the SIM inventory; the medium behind
//! [`SnapshotStore`] is interchangeable.

use crate::{
    core::{ProductRecord, SimRecord},
    errors::Result,
};
use std::future::Future;

/// SeaORM-backed store
pub mod database;
/// Process-local store, used by tests
pub mod memory;

pub use database::DatabaseStore;
pub use memory::MemoryStore;

/// Durable blobs of product records and SIMs, each keyed by a fixed
/// collection name.
pub trait SnapshotStore {
    /// Returns the last saved snapshot, or `None` if nothing was ever saved.
    fn load(&self) -> impl Future<Output = Result<Option<Vec<ProductRecord>>>> + Send;

    /// Overwrites the snapshot with `records`.
    fn save(&self, records: &[ProductRecord]) -> impl Future<Output = Result<()>> + Send;

    /// Returns the last saved SIM inventory, or `None` if nothing was ever saved.
    fn load_sims(&self) -> impl Future<Output = Result<Option<Vec<SimRecord>>>> + Send;

    /// Overwrites the SIM inventory with `sims`.
    fn save_sims(&self, sims: &[SimRecord]) -> impl Future<Output = Result<()>> + Send;
}
