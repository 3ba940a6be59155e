use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::dates::parse_instant;
use crate::errors::ModelError;
use crate::Record;

/// A catalogue entry as stored in `books.json`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_published: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_reviews: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Book {
    /// `rating × numberOfReviews`; absent values count as zero.
    pub fn popularity_score(&self) -> f64 {
        let rating = self.rating.as_ref().and_then(Number::as_f64).unwrap_or(0.0);
        let reviews = self.number_of_reviews.unwrap_or(0) as f64;
        rating * reviews
    }

    /// Publication instant in UTC, if present and parseable.
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.date_published.as_deref().and_then(|raw| parse_instant(raw).ok())
    }

    pub fn is_featured(&self) -> bool {
        self.featured == Some(true)
    }
}

impl Record for Book {
    const COLLECTION: &'static str = "books";

    fn id(&self) -> &str {
        &self.id
    }
}

/// A book together with its derived popularity score. Never persisted.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedBook {
    #[serde(flatten)]
    pub book: Book,
    pub popularity_score: f64,
}

impl From<Book> for RankedBook {
    fn from(mut book: Book) -> Self {
        // The computed score replaces any stored one.
        book.extra.remove("popularityScore");
        let popularity_score = book.popularity_score();
        Self { book, popularity_score }
    }
}

/// Insert payload: required fields are optional here so every missing one can be reported.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub date_published: Option<String>,
    #[serde(default)]
    pub rating: Option<Number>,
    #[serde(default)]
    pub number_of_reviews: Option<u64>,
    #[serde(default)]
    pub featured: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub(crate) fn present(value: &Option<String>) -> bool {
    value.as_deref().map(|s| !s.trim().is_empty()).unwrap_or(false)
}

impl NewBook {
    /// Check `id`, `title` and `author`, reporting all missing ones at once.
    pub fn validate(self) -> Result<Book, ModelError> {
        let mut missing = Vec::new();
        if !present(&self.id) {
            missing.push("id");
        }
        if !present(&self.title) {
            missing.push("title");
        }
        if !present(&self.author) {
            missing.push("author");
        }
        if !missing.is_empty() {
            return Err(ModelError::MissingFields(missing));
        }
        Ok(Book {
            id: self.id.unwrap_or_default(),
            title: self.title.unwrap_or_default(),
            author: self.author.unwrap_or_default(),
            date_published: self.date_published,
            rating: self.rating,
            number_of_reviews: self.number_of_reviews,
            featured: self.featured,
            extra: self.extra,
        })
    }
}

impl From<Book> for NewBook {
    fn from(b: Book) -> Self {
        Self {
            id: Some(b.id),
            title: Some(b.title),
            author: Some(b.author),
            date_published: b.date_published,
            rating: b.rating,
            number_of_reviews: b.number_of_reviews,
            featured: b.featured,
            extra: b.extra,
        }
    }
}
