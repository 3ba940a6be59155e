//! Record types for the book catalogue and its reviews.
//! - `Book` / `Review` mirror the camelCase JSON stored on disk.
//! - `NewBook` / `NewReview` are the lenient insert payloads, validated into records.
//! - Unknown fields ride along in `extra` so a load/save cycle never drops data.

pub mod errors;
pub mod dates;
pub mod book;
pub mod review;

use serde::{de::DeserializeOwned, Serialize};

pub use book::{Book, NewBook, RankedBook};
pub use review::{NewReview, Review};

/// A record that lives in a named JSON collection.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection name; also the top-level field of the backing document.
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
}
