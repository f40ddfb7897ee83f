//! HTTP request handlers for the web server.

mod collections;
mod helpers;
mod types;

pub use collections::{create_collections, get_by_origin, get_by_time_range, health, list_origins};
pub use helpers::{internal_error_response, ErrorBody, JSON_CONTENT_TYPE};
