//! Error types shared by the extractor, service and HTTP layers.

use thiserror::Error;

use crate::models::Collection;
use crate::repository::StoreError;

/// Error kinds surfaced by the collection service.
///
/// Each variant carries the context message appended to its base message,
/// so `InvalidArgument("url cannot be empty")` displays as
/// `invalid argument: url cannot be empty`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectionError {
    /// Caller supplied something unusable (empty text, bad range, no URLs).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Reserved for lookups of a single record.
    #[error("not found: {0}")]
    NotFound(String),
    /// Infrastructure failure (store I/O, encoding).
    #[error("internal error: {0}")]
    Internal(String),
}

impl CollectionError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// The context message without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidArgument(m) | Self::NotFound(m) | Self::Internal(m) => m,
        }
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}

impl From<StoreError> for CollectionError {
    fn from(err: StoreError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Failure part-way through `create_from_text`.
///
/// Records persisted before the failure are kept in the store and reported
/// back alongside the error.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct CreateError {
    pub persisted: Vec<Collection>,
    #[source]
    pub source: CollectionError,
}

impl From<CollectionError> for CreateError {
    fn from(source: CollectionError) -> Self {
        Self {
            persisted: Vec::new(),
            source,
        }
    }
}
