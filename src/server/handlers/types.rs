//! Request bodies and query parameters.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Body of `POST /create`. `url` holds free-form text, not a single URL.
#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    #[serde(default)]
    pub url: String,
}

/// Query of `GET /getbyorigin`.
#[derive(Debug, Default, Deserialize)]
pub struct OriginQuery {
    pub origin: Option<String>,
}

/// Body of `POST /getbytimerange`. Missing bounds default to the last 24 hours.
#[derive(Debug, Default, Deserialize)]
pub struct TimeRangeRequest {
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
}
