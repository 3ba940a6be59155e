use std::sync::Arc;

use chrono::Utc;
use models::{dates::format_timestamp, NewReview, Record, Review};
use tracing::{info, instrument};

use crate::errors::ServiceError;
use crate::matches::Matches;
use crate::storage::JsonCollectionStore;

/// Queries and inserts over the `reviews` collection.
///
/// Reviews reference books by id only; the book is never looked up.
#[derive(Clone)]
pub struct ReviewService {
    store: Arc<JsonCollectionStore>,
}

impl ReviewService {
    pub fn new(store: Arc<JsonCollectionStore>) -> Self {
        Self { store }
    }

    pub async fn get_by_book_id(&self, book_id: &str) -> Result<Matches<Review>, ServiceError> {
        let reviews = self
            .store
            .load::<Review>(Review::COLLECTION)
            .await?
            .into_iter()
            .filter(|r| r.book_id == book_id)
            .collect();
        Ok(Matches::from_vec(reviews))
    }

    /// Append a review; `bookId` and `timestamp` are always server-assigned.
    #[instrument(skip(self, input))]
    pub async fn insert(&self, book_id: &str, input: NewReview) -> Result<Review, ServiceError> {
        let review = input.into_review(book_id, format_timestamp(Utc::now()))?;
        let inserted = self
            .store
            .update::<Review, Review, _>(Review::COLLECTION, |reviews| {
                reviews.push(review.clone());
                Ok(review)
            })
            .await?;
        info!(review_id = %inserted.id, book_id, "review_inserted");
        Ok(inserted)
    }
}
