//! Database access layer
//!
//! [`Store`] is the generic record interface the HTTP handlers talk to.
//! [`Storage`] implements it over a PostgreSQL pool.

use async_trait::async_trait;

use crate::Result;

mod migrate;
pub mod models;
pub mod schema;
mod storage;

pub use migrate::{run_migrations, MigrationReport};
pub use models::{catalog_tables, Artist, Song, SongDetail};
pub use schema::{ColumnDefinition, Entity, ForeignKey, OnAction, SqlValue};
pub use storage::{SchemaDrift, Storage};

/// Generic create/read/update/delete operations over any [`Entity`]
///
/// Multi-entity writes are never wrapped in a transaction; referential
/// cascades are left to the store.
#[async_trait]
pub trait Store: Clone + Send + Sync + 'static {
    /// All rows of `T`, ordered by id
    async fn find_all<T: Entity>(&self) -> Result<Vec<T>>;

    /// Row with primary key `id`, or [`Error::NotFound`](crate::Error::NotFound)
    async fn first_by_id<T: Entity>(&self, id: i64) -> Result<T>;

    /// First row whose integer `column` equals `value`
    async fn first_by<T: Entity>(&self, column: &'static str, value: i64) -> Result<T>;

    /// Insert `record`, returning it with the store-assigned id and timestamps
    async fn create<T: Entity>(&self, record: T) -> Result<T>;

    /// Overwrite every writable column of the row with `record.id()`
    async fn save<T: Entity>(&self, record: T) -> Result<T>;

    /// Delete by primary key; returns the number of rows removed
    async fn delete_by_id<T: Entity>(&self, id: i64) -> Result<u64>;
}
