//! Entity module - SeaORM entity definitions for the database.

pub mod collection;

pub use collection::{Column as CollectionColumn, Entity as Collection, Model as CollectionModel};
