use std::sync::Arc;

use common::utils::access_log::AccessLog;
use service::{auth::Authorizer, storage::JsonCollectionStore, CatalogueService, ReviewService};

/// Shared handler state. Cheap to clone; everything inside is reference counted.
#[derive(Clone)]
pub struct AppState {
    pub catalogue: CatalogueService,
    pub reviews: ReviewService,
    pub authorizer: Arc<dyn Authorizer>,
    pub access_log: Arc<AccessLog>,
}

impl AppState {
    pub fn new(
        store: Arc<JsonCollectionStore>,
        authorizer: Arc<dyn Authorizer>,
        access_log: Arc<AccessLog>,
    ) -> Self {
        Self {
            catalogue: CatalogueService::new(Arc::clone(&store)),
            reviews: ReviewService::new(store),
            authorizer,
            access_log,
        }
    }
}
