//! Service layer for collectionbox business logic.
//!
//! Services are shared by the HTTP server and the CLI.

pub mod collection;

pub use collection::CollectionService;
