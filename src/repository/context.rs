//! Database context: owns the connection factory and hands out repositories.

use std::path::Path;

use diesel_async::SimpleAsyncConnection;
use tracing::info;

use super::collection::DieselCollectionRepository;
use super::pool::{DbError, SqlitePool};
use super::query_log::QueryLog;
use super::util::to_diesel_error;

/// Entry point for database access.
///
/// ```ignore
/// let ctx = DbContext::open("collectionbox.db", QueryLog::default()).await?;
/// let recent = ctx.collections().get_by_origin("Bilibili").await?;
/// ```
#[derive(Debug, Clone)]
pub struct DbContext {
    pool: SqlitePool,
    query_log: QueryLog,
}

impl DbContext {
    pub fn new(database_url: &str, query_log: QueryLog) -> Self {
        Self {
            pool: SqlitePool::new(database_url),
            query_log,
        }
    }

    pub fn from_path(db_path: &Path, query_log: QueryLog) -> Self {
        Self {
            pool: SqlitePool::from_path(db_path),
            query_log,
        }
    }

    /// Open the database, creating its directory and schema if needed.
    pub async fn open(database_url: &str, query_log: QueryLog) -> Result<Self, DbError> {
        let ctx = Self::new(database_url, query_log);
        if let Some(parent) = Path::new(ctx.pool.database_url()).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(to_diesel_error)?;
            }
        }
        ctx.init_schema().await?;
        info!(database = ctx.pool.database_url(), "database ready");
        Ok(ctx)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn collections(&self) -> DieselCollectionRepository {
        DieselCollectionRepository::new(self.pool.clone(), self.query_log)
    }

    /// Create the collections table and its indexes if they don't exist.
    pub async fn init_schema(&self) -> Result<(), DbError> {
        let mut conn = self.pool.get().await?;
        conn.batch_execute(
            r#"
            PRAGMA journal_mode = WAL;

            CREATE TABLE IF NOT EXISTS collections (
                id TEXT PRIMARY KEY NOT NULL,
                url TEXT NOT NULL,
                origin TEXT NOT NULL,
                created_at TIMESTAMP NOT NULL
            );

            CREATE UNIQUE INDEX IF NOT EXISTS idx_collections_url ON collections(url);
            CREATE INDEX IF NOT EXISTS idx_collections_origin ON collections(origin);
            CREATE INDEX IF NOT EXISTS idx_collections_created_at ON collections(created_at);
            "#,
        )
        .await
    }
}
