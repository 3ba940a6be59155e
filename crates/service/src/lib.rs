//! Service layer for the book catalogue.
//! - `storage` owns every file access; services only see materialized collections.
//! - `catalogue` / `reviews` hold the query and insert rules.
//! - `auth` is the pluggable write gate consumed by the HTTP layer.

pub mod errors;
pub mod matches;
pub mod storage;
pub mod catalogue;
pub mod reviews;
pub mod auth;
pub mod runtime;

pub use catalogue::CatalogueService;
pub use matches::Matches;
pub use reviews::ReviewService;
