//! Origin resolution: the host catalog and the URL extractor built on it.

pub mod candidates;
mod catalog;
mod extractor;

pub use catalog::{CatalogError, OriginCatalog};
pub use extractor::{
    Rejection, Resolved, UrlExtractor, EMPTY_INPUT, NO_SUPPORTED_ORIGIN, NO_URL_FOUND,
};
