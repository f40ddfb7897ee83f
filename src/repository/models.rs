//! Diesel row types for the `collections` table.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::models::Collection;
use crate::schema;

/// Collection row as stored. `created_at` is UTC.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::collections)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CollectionRecord {
    pub id: String,
    pub url: String,
    pub origin: String,
    pub created_at: NaiveDateTime,
}

/// New collection for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::collections)]
pub struct NewCollection<'a> {
    pub id: &'a str,
    pub url: &'a str,
    pub origin: &'a str,
    pub created_at: NaiveDateTime,
}

impl From<CollectionRecord> for Collection {
    fn from(record: CollectionRecord) -> Self {
        Collection {
            id: record.id,
            url: record.url,
            origin: record.origin,
            created_at: record.created_at.and_utc(),
        }
    }
}

impl<'a> From<&'a Collection> for NewCollection<'a> {
    fn from(collection: &'a Collection) -> Self {
        NewCollection {
            id: &collection.id,
            url: &collection.url,
            origin: &collection.origin,
            created_at: collection.created_at.naive_utc(),
        }
    }
}
