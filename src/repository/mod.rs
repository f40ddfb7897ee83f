//! Repository layer for collection persistence.
//!
//! All database access uses Diesel ORM with compile-time query checking on
//! an embedded SQLite database.

pub mod collection;
pub mod context;
pub mod models;
pub mod pool;
pub mod query_log;
pub mod util;

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

use crate::models::Collection;

pub use collection::DieselCollectionRepository;
pub use context::DbContext;
pub use pool::{DbError, SqlitePool};
pub use query_log::{DbLogLevel, QueryLog, DEFAULT_SLOW_QUERY_MS};

/// Store failures. Unique violations on `url` are split out so callers can
/// fall back to an upsert.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint failed: {0}")]
    Conflict(String),
    #[error("{0}")]
    Database(DieselError),
}

impl From<DieselError> for StoreError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                StoreError::Conflict(info.message().to_string())
            }
            other => StoreError::Database(other),
        }
    }
}

/// Persistence contract for collections.
#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Insert a new collection. Fails with [`StoreError::Conflict`] when the
    /// URL is already stored.
    async fn create(&self, collection: &Collection) -> Result<(), StoreError>;

    /// Move `created_at` forward to `at` for the collection with this URL.
    /// Returns the number of rows changed; a missing URL is not an error.
    async fn upsert_created_at(&self, url: &str, at: DateTime<Utc>) -> Result<usize, StoreError>;

    async fn get_by_url(&self, url: &str) -> Result<Option<Collection>, StoreError>;

    /// Collections with this origin label, in insertion order.
    async fn get_by_origin(&self, origin: &str) -> Result<Vec<Collection>, StoreError>;

    /// Collections created within `[start, end]`, oldest first, optionally
    /// restricted to one origin.
    async fn get_by_time_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        origin: Option<&str>,
    ) -> Result<Vec<Collection>, StoreError>;

    /// Every collection keyed by origin label, each list in insertion order.
    async fn get_all_grouped_by_origin(
        &self,
    ) -> Result<BTreeMap<String, Vec<Collection>>, StoreError>;
}
