//! Runtime environment helpers
//!
//! Startup preparation for the storage directory and its collections.

use std::sync::Arc;

use models::{Book, Record, Review};
use tracing::{info, warn};

use crate::storage::JsonCollectionStore;

/// Ensure the data directory exists and, when `create_missing` is set, seed
/// empty `books` / `reviews` collections. Missing collections are only warned
/// about otherwise; requests against them report not found.
pub async fn prepare_storage(store: &Arc<JsonCollectionStore>, create_missing: bool) -> anyhow::Result<()> {
    let data_dir = store.data_dir().to_string_lossy().into_owned();
    common::env::ensure_dir(&data_dir).await?;

    for collection in [Book::COLLECTION, Review::COLLECTION] {
        let path = store.path_for(collection);
        if create_missing {
            if store.ensure(collection).await? {
                info!(collection, path = %path.display(), "created empty collection");
            }
        } else if tokio::fs::metadata(&path).await.is_err() {
            warn!(collection, path = %path.display(), "collection file not found; requests will 404");
        }
    }
    Ok(())
}
