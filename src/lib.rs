//! collectionbox - keep the links you paste.
//!
//! Extracts URLs from free-form text, resolves each one to a supported
//! content source through an origin catalog, and stores them in SQLite
//! behind a small JSON HTTP API.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod origins;
pub mod repository;
pub mod schema;
pub mod server;
pub mod services;

pub use error::{CollectionError, CreateError};
