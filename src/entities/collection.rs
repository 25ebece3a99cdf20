//! Collection entity - one JSON snapshot per named record collection.
//!
//! The persistence contract is a key-value blob: the key is a fixed collection
//! name (e.g. `"products"`) and the value is the serialized record array.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Collection snapshot database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "collections")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Collection key (e.g., `"products"`)
    #[sea_orm(unique)]
    pub name: String,
    /// JSON array of records
    #[sea_orm(column_type = "Text")]
    pub payload: String,
    /// When the snapshot was last written
    pub updated_at: DateTime,
}

/// Collections have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
