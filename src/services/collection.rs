//! Collection service: extraction plus persistence, and validated reads.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, info};

use crate::error::{CollectionError, CreateError};
use crate::models::Collection;
use crate::origins::{UrlExtractor, EMPTY_INPUT};
use crate::repository::{CollectionStore, StoreError};

/// Longest window `get_by_time_range` will query.
pub const MAX_TIME_RANGE_DAYS: i64 = 15;

pub const EMPTY_ORIGIN: &str = "the origin you want to search can't be empty";
pub const END_IN_FUTURE: &str = "can't get the url from future";
pub const START_AFTER_END: &str = "start time can't be after end time";
pub const RANGE_TOO_LONG: &str = "time range can't be longer than 15 days";

#[derive(Clone)]
pub struct CollectionService {
    store: Arc<dyn CollectionStore>,
    extractor: Arc<UrlExtractor>,
}

impl CollectionService {
    pub fn new(store: Arc<dyn CollectionStore>, extractor: Arc<UrlExtractor>) -> Self {
        Self { store, extractor }
    }

    pub fn extractor(&self) -> &UrlExtractor {
        &self.extractor
    }

    /// Extract every supported URL from `text` and persist it.
    ///
    /// A URL that is already stored has its `created_at` refreshed and the
    /// stored record is returned in its place. The first store failure stops
    /// the loop; records persisted before it are returned in the error.
    pub async fn create_from_text(&self, text: &str) -> Result<Vec<Collection>, CreateError> {
        if text.trim().is_empty() {
            return Err(CollectionError::invalid_argument(EMPTY_INPUT).into());
        }

        let pairs = self.extractor.extract_all(text)?;
        let mut persisted = Vec::with_capacity(pairs.len());
        let mut refreshed = 0usize;

        for pair in pairs {
            let now = Utc::now();
            let collection = Collection::from_pair(pair, now);

            let created = self.store.create(&collection).await;
            let stored = match created {
                Ok(()) => Ok(collection),
                Err(StoreError::Conflict(_)) => {
                    refreshed += 1;
                    self.refresh(&collection.url, now).await
                }
                Err(err) => Err(err.into()),
            };

            match stored {
                Ok(collection) => persisted.push(collection),
                Err(source) => return Err(CreateError { persisted, source }),
            }
        }

        info!(count = persisted.len(), refreshed, "collections saved");
        Ok(persisted)
    }

    /// Move an existing URL's timestamp to `now` and return the stored record.
    async fn refresh(&self, url: &str, now: DateTime<Utc>) -> Result<Collection, CollectionError> {
        let rows = self.store.upsert_created_at(url, now).await?;
        debug!(url, rows, "existing collection refreshed");
        self.store.get_by_url(url).await?.ok_or_else(|| {
            CollectionError::internal(format!("collection for {url} missing after upsert"))
        })
    }

    pub async fn get_by_origin(&self, origin: &str) -> Result<Vec<Collection>, CollectionError> {
        if origin.trim().is_empty() {
            return Err(CollectionError::invalid_argument(EMPTY_ORIGIN));
        }
        Ok(self.store.get_by_origin(origin).await?)
    }

    /// Collections created in `[start, end]`. `end` may not be in the future
    /// and the window may span at most 15 days.
    pub async fn get_by_time_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        origin: Option<&str>,
    ) -> Result<Vec<Collection>, CollectionError> {
        validate_time_range(start, end, Utc::now())?;
        let origin = origin.map(str::trim).filter(|o| !o.is_empty());
        Ok(self.store.get_by_time_range(start, end, origin).await?)
    }

    pub async fn get_all_grouped_by_origin(
        &self,
    ) -> Result<BTreeMap<String, Vec<Collection>>, CollectionError> {
        Ok(self.store.get_all_grouped_by_origin().await?)
    }
}

fn validate_time_range(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<(), CollectionError> {
    if end > now {
        return Err(CollectionError::invalid_argument(END_IN_FUTURE));
    }
    if end <= start {
        return Err(CollectionError::invalid_argument(START_AFTER_END));
    }
    if end - start > TimeDelta::days(MAX_TIME_RANGE_DAYS) {
        return Err(CollectionError::invalid_argument(RANGE_TOO_LONG));
    }
    Ok(())
}
