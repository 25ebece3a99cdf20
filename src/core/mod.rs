//! Core business logic - framework-agnostic product tracking.
//!
//! Nothing in here touches the database, the filesystem or the terminal; the
//! tracker and CLI layers wire these pieces to the outside world.

/// Aggregates for the dashboard, analytics and client views
pub mod analytics;
/// Product record schema, field names and validation
pub mod product;
/// Renewal date derivation and expiry classification
pub mod renewal;
/// Canonical in-memory record set
pub mod repository;
/// Substring search over records
pub mod search;
/// SIM card inventory
pub mod sim;

pub use product::{Field, NetworkType, ProductId, ProductInput, ProductRecord, ProductRow, SimProvider};
pub use renewal::ExpiryStatus;
pub use repository::Repository;
pub use search::SearchColumn;
pub use sim::{SimInventory, SimRecord, SimStatus};
