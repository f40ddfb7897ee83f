//! Data models for collectionbox.

mod collection;

pub use collection::{Collection, UrlOriginPair};
