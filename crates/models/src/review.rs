use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::book::present;
use crate::errors::ModelError;
use crate::Record;

/// A reader review as stored in `reviews.json`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub book_id: String,
    pub author: String,
    pub rating: Number,
    pub comment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record for Review {
    const COLLECTION: &'static str = "reviews";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Insert payload for a review. `bookId` and `timestamp` are accepted but always replaced.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub book_id: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub rating: Option<Number>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewReview {
    /// Validate required fields, then stamp the server-owned `bookId` and `timestamp`.
    pub fn into_review(self, book_id: &str, timestamp: String) -> Result<Review, ModelError> {
        let mut missing = Vec::new();
        if !present(&self.id) {
            missing.push("id");
        }
        if !present(&self.author) {
            missing.push("author");
        }
        if self.rating.is_none() {
            missing.push("rating");
        }
        if !present(&self.comment) {
            missing.push("comment");
        }
        let (Some(id), Some(author), Some(rating), Some(comment)) =
            (self.id, self.author, self.rating, self.comment)
        else {
            return Err(ModelError::MissingFields(missing));
        };
        if !missing.is_empty() {
            return Err(ModelError::MissingFields(missing));
        }
        Ok(Review {
            id,
            book_id: book_id.to_string(),
            author,
            rating,
            comment,
            timestamp: Some(timestamp),
            extra: self.extra,
        })
    }
}
