//! Diesel-backed collection repository.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::models::{CollectionRecord, NewCollection};
use super::pool::SqlitePool;
use super::query_log::QueryLog;
use super::{CollectionStore, StoreError};
use crate::models::Collection;
use crate::schema::collections;

#[derive(Debug, Clone)]
pub struct DieselCollectionRepository {
    pool: SqlitePool,
    log: QueryLog,
}

impl DieselCollectionRepository {
    pub fn new(pool: SqlitePool, log: QueryLog) -> Self {
        Self { pool, log }
    }
}

fn into_collections(records: Vec<CollectionRecord>) -> Vec<Collection> {
    records.into_iter().map(Collection::from).collect()
}

#[async_trait]
impl CollectionStore for DieselCollectionRepository {
    async fn create(&self, collection: &Collection) -> Result<(), StoreError> {
        self.log
            .observe(
                "create",
                async {
                    let mut conn = self.pool.get().await?;
                    let rows = diesel::insert_into(collections::table)
                        .values(NewCollection::from(collection))
                        .execute(&mut conn)
                        .await?;
                    Ok::<_, StoreError>(rows)
                },
                |rows| *rows,
            )
            .await
            .map(|_| ())
    }

    async fn upsert_created_at(&self, url: &str, at: DateTime<Utc>) -> Result<usize, StoreError> {
        let at = at.naive_utc();
        self.log
            .observe(
                "upsert_created_at",
                async {
                    let mut conn = self.pool.get().await?;
                    let rows = diesel::update(
                        collections::table
                            .filter(collections::url.eq(url))
                            .filter(collections::created_at.le(at)),
                    )
                    .set(collections::created_at.eq(at))
                    .execute(&mut conn)
                    .await?;
                    Ok::<_, StoreError>(rows)
                },
                |rows| *rows,
            )
            .await
    }

    async fn get_by_url(&self, url: &str) -> Result<Option<Collection>, StoreError> {
        self.log
            .observe(
                "get_by_url",
                async {
                    let mut conn = self.pool.get().await?;
                    let record = collections::table
                        .filter(collections::url.eq(url))
                        .select(CollectionRecord::as_select())
                        .first(&mut conn)
                        .await
                        .optional()?;
                    Ok::<_, StoreError>(record.map(Collection::from))
                },
                |found| usize::from(found.is_some()),
            )
            .await
    }

    async fn get_by_origin(&self, origin: &str) -> Result<Vec<Collection>, StoreError> {
        self.log
            .observe(
                "get_by_origin",
                async {
                    let mut conn = self.pool.get().await?;
                    let records = collections::table
                        .filter(collections::origin.eq(origin))
                        .order(collections::id.asc())
                        .select(CollectionRecord::as_select())
                        .load(&mut conn)
                        .await?;
                    Ok::<_, StoreError>(into_collections(records))
                },
                Vec::len,
            )
            .await
    }

    async fn get_by_time_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        origin: Option<&str>,
    ) -> Result<Vec<Collection>, StoreError> {
        let (start, end) = (start.naive_utc(), end.naive_utc());
        let origin = origin.filter(|o| !o.is_empty());
        self.log
            .observe(
                "get_by_time_range",
                async {
                    let mut conn = self.pool.get().await?;
                    let mut query = collections::table
                        .filter(collections::created_at.between(start, end))
                        .select(CollectionRecord::as_select())
                        .into_boxed();
                    if let Some(origin) = origin {
                        query = query.filter(collections::origin.eq(origin));
                    }
                    let records = query
                        .order((collections::created_at.asc(), collections::id.asc()))
                        .load(&mut conn)
                        .await?;
                    Ok::<_, StoreError>(into_collections(records))
                },
                Vec::len,
            )
            .await
    }

    async fn get_all_grouped_by_origin(
        &self,
    ) -> Result<BTreeMap<String, Vec<Collection>>, StoreError> {
        self.log
            .observe(
                "get_all_grouped_by_origin",
                async {
                    let mut conn = self.pool.get().await?;
                    let records = collections::table
                        .order((collections::origin.asc(), collections::id.asc()))
                        .select(CollectionRecord::as_select())
                        .load(&mut conn)
                        .await?;

                    let mut grouped: BTreeMap<String, Vec<Collection>> = BTreeMap::new();
                    for collection in into_collections(records) {
                        grouped
                            .entry(collection.origin.clone())
                            .or_default()
                            .push(collection);
                    }
                    Ok::<_, StoreError>(grouped)
                },
                |grouped| grouped.values().map(Vec::len).sum(),
            )
            .await
    }
}
