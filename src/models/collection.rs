//! Collection records and the URL/origin pairs they are built from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A URL kept in the collection box, labelled with the content source it
/// belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    /// Opaque unique identifier (UUIDv7, so ids sort in insertion order).
    pub id: String,
    /// The URL as the user pasted it, after trimming.
    pub url: String,
    /// Origin label from the catalog, e.g. `Bilibili`.
    pub origin: String,
    /// First insertion, refreshed when the same URL is submitted again.
    pub created_at: DateTime<Utc>,
}

impl Collection {
    /// Create a new collection record with a fresh id.
    pub fn new(url: impl Into<String>, origin: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            url: url.into(),
            origin: origin.into(),
            created_at,
        }
    }

    /// Build a record from an extracted pair.
    pub fn from_pair(pair: UrlOriginPair, created_at: DateTime<Utc>) -> Self {
        Self::new(pair.url, pair.origin, created_at)
    }
}

/// One URL found in input text together with its resolved origin label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlOriginPair {
    pub url: String,
    pub origin: String,
}

impl UrlOriginPair {
    pub fn new(url: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            origin: origin.into(),
        }
    }
}
