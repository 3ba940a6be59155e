use std::sync::Arc;

use models::{dates::parse_instant, Book, NewBook, RankedBook, Record};
use tracing::{info, instrument};

use crate::errors::ServiceError;
use crate::matches::Matches;
use crate::storage::JsonCollectionStore;

/// Number of books returned by the popularity ranking when no limit is given.
pub const DEFAULT_TOP_RATED: usize = 10;

/// Queries and inserts over the `books` collection.
#[derive(Clone)]
pub struct CatalogueService {
    store: Arc<JsonCollectionStore>,
}

impl CatalogueService {
    pub fn new(store: Arc<JsonCollectionStore>) -> Self {
        Self { store }
    }

    async fn load(&self) -> Result<Vec<Book>, ServiceError> {
        self.store.load::<Book>(Book::COLLECTION).await
    }

    pub async fn get_all(&self) -> Result<Vec<Book>, ServiceError> {
        self.load().await
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Book, ServiceError> {
        self.load()
            .await?
            .into_iter()
            .find(|b| b.id == id)
            .ok_or_else(|| ServiceError::not_found("book"))
    }

    /// Books published within `[start, end]`, both bounds inclusive.
    ///
    /// Bounds and stored dates are compared as UTC instants; a bare
    /// `YYYY-MM-DD` is midnight UTC.
    pub async fn get_by_date_range(
        &self,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Matches<Book>, ServiceError> {
        let (Some(start), Some(end)) = (start, end) else {
            return Err(ServiceError::Validation(
                "both 'start' and 'end' query parameters are required (YYYY-MM-DD)".into(),
            ));
        };
        let start = parse_instant(start)?;
        let end = parse_instant(end)?;

        let books = self
            .load()
            .await?
            .into_iter()
            .filter(|b| b.published_at().is_some_and(|at| start <= at && at <= end))
            .collect();
        Ok(Matches::from_vec(books))
    }

    /// Books ranked by `rating × numberOfReviews`, highest first; ties keep file order.
    pub async fn get_top_rated(&self, n: usize) -> Result<Vec<RankedBook>, ServiceError> {
        let mut ranked: Vec<RankedBook> = self.load().await?.into_iter().map(RankedBook::from).collect();
        ranked.sort_by(|a, b| b.popularity_score.total_cmp(&a.popularity_score));
        ranked.truncate(n);
        Ok(ranked)
    }

    pub async fn get_featured(&self) -> Result<Matches<Book>, ServiceError> {
        let books = self.load().await?.into_iter().filter(Book::is_featured).collect();
        Ok(Matches::from_vec(books))
    }

    #[instrument(skip(self, input), fields(book_id = input.id.as_deref().unwrap_or("")))]
    pub async fn insert(&self, input: NewBook) -> Result<Book, ServiceError> {
        let book = input.validate()?;
        let inserted = self
            .store
            .update::<Book, Book, _>(Book::COLLECTION, |books| {
                if books.iter().any(|b| b.id == book.id) {
                    return Err(ServiceError::Conflict(format!("book with id '{}' already exists", book.id)));
                }
                books.push(book.clone());
                Ok(book)
            })
            .await?;
        info!(book_id = %inserted.id, "book_inserted");
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use uuid::Uuid;

    async fn setup(books: Value) -> (CatalogueService, Arc<JsonCollectionStore>) {
        let dir = std::env::temp_dir().join(format!("svc_catalogue_{}", Uuid::new_v4()));
        let store = JsonCollectionStore::new(dir);
        let records: Vec<Value> = serde_json::from_value(books).expect("array");
        store.save("books", &records).await.expect("seed");
        (CatalogueService::new(Arc::clone(&store)), store)
    }

    fn seed() -> Value {
        json!([
            {"id": "b1", "title": "Dune", "author": "Herbert", "datePublished": "1965-08-01",
             "rating": 4, "numberOfReviews": 10, "featured": true},
            {"id": "b2", "title": "Emma", "author": "Austen", "datePublished": "1815-12-23",
             "rating": 5, "numberOfReviews": 1, "featured": false},
            {"id": "b3", "title": "Ubik", "author": "Dick", "datePublished": "1969-05-01",
             "rating": 2, "numberOfReviews": 15},
            {"id": "b4", "title": "Kindred", "author": "Butler", "datePublished": "1979-06-01",
             "rating": 4, "numberOfReviews": 10, "featured": true}
        ])
    }

    fn ids<'a>(books: impl IntoIterator<Item = &'a Book>) -> Vec<&'a str> {
        books.into_iter().map(|b| b.id.as_str()).collect()
    }

    #[tokio::test]
    async fn get_by_id_finds_or_reports_not_found() {
        let (svc, _) = setup(seed()).await;
        assert_eq!(svc.get_by_id("b3").await.unwrap().title, "Ubik");
        assert!(matches!(svc.get_by_id("nope").await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn date_range_is_inclusive_subset_of_all() {
        let (svc, _) = setup(seed()).await;
        let all = svc.get_all().await.unwrap();
        let got = svc.get_by_date_range(Some("1965-08-01"), Some("1969-05-01")).await.unwrap().into_vec();
        assert_eq!(ids(&got), vec!["b1", "b3"]);

        let start = parse_instant("1965-08-01").unwrap();
        let end = parse_instant("1969-05-01").unwrap();
        let expected: Vec<&Book> = all
            .iter()
            .filter(|b| b.published_at().is_some_and(|at| start <= at && at <= end))
            .collect();
        assert_eq!(got.iter().collect::<Vec<_>>(), expected);
    }

    #[tokio::test]
    async fn date_range_without_matches_is_empty_not_error() {
        let (svc, _) = setup(seed()).await;
        let res = svc.get_by_date_range(Some("2000-01-01"), Some("2001-01-01")).await.unwrap();
        assert_eq!(res, Matches::Empty);
    }

    #[tokio::test]
    async fn date_range_compares_time_of_day() {
        let (svc, _) = setup(json!([
            {"id": "m", "title": "t", "author": "a", "datePublished": "2020-01-01T08:00:00Z"}
        ]))
        .await;
        let res = svc
            .get_by_date_range(Some("2020-01-01T12:00:00Z"), Some("2020-01-02"))
            .await
            .unwrap();
        assert_eq!(res, Matches::Empty);

        let res = svc
            .get_by_date_range(Some("2020-01-01"), Some("2020-01-01T08:00:00Z"))
            .await
            .unwrap();
        assert_eq!(ids(&res.into_vec()), vec!["m"]);
    }

    #[tokio::test]
    async fn date_range_bounds_are_converted_to_utc() {
        let (svc, _) = setup(json!([
            {"id": "d", "title": "t", "author": "a", "datePublished": "2020-01-01"}
        ]))
        .await;
        // 2019-12-31T10:00Z ..= 2019-12-31T16:00Z, which ends before the book's midnight.
        let res = svc
            .get_by_date_range(Some("2020-01-01T00:00:00+14:00"), Some("2020-01-01T06:00:00+14:00"))
            .await
            .unwrap();
        assert_eq!(res, Matches::Empty);

        let res = svc
            .get_by_date_range(Some("2020-01-01T00:00:00-02:00"), Some("2020-01-01T12:00:00Z"))
            .await
            .unwrap();
        assert_eq!(res, Matches::Empty);

        let res = svc
            .get_by_date_range(Some("2020-01-01T01:00:00+02:00"), Some("2020-01-01T01:00:00Z"))
            .await
            .unwrap();
        assert_eq!(ids(&res.into_vec()), vec!["d"]);
    }

    #[tokio::test]
    async fn top_rated_does_not_repeat_stored_score() {
        let (svc, _) = setup(json!([
            {"id": "s", "title": "t", "author": "a", "rating": 3, "numberOfReviews": 2,
             "popularityScore": 100}
        ]))
        .await;
        let top = svc.get_top_rated(DEFAULT_TOP_RATED).await.unwrap();
        let v = serde_json::to_value(&top).unwrap();
        assert_eq!(v[0]["popularityScore"], json!(6.0));
        let text = serde_json::to_string(&top).unwrap();
        assert_eq!(text.matches("popularityScore").count(), 1);
    }

    #[tokio::test]
    async fn date_range_requires_valid_bounds() {
        let (svc, _) = setup(seed()).await;
        assert!(matches!(svc.get_by_date_range(None, Some("2000-01-01")).await, Err(ServiceError::Validation(_))));
        assert!(matches!(svc.get_by_date_range(Some("2000-01-01"), None).await, Err(ServiceError::Validation(_))));
        assert!(matches!(
            svc.get_by_date_range(Some("soon"), Some("2000-01-01")).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn top_rated_orders_by_score_and_keeps_ties_stable() {
        let (svc, _) = setup(seed()).await;
        let top = svc.get_top_rated(DEFAULT_TOP_RATED).await.unwrap();
        let order: Vec<&str> = top.iter().map(|r| r.book.id.as_str()).collect();
        // b1 and b4 both score 40, b1 comes first in the file; b3 scores 30.
        assert_eq!(order, vec!["b1", "b4", "b3", "b2"]);
        assert!(top.windows(2).all(|w| w[0].popularity_score >= w[1].popularity_score));
    }

    #[tokio::test]
    async fn top_rated_truncates_to_n() {
        let (svc, _) = setup(json!([
            {"id": "b1", "title": "t", "author": "a", "rating": 4, "numberOfReviews": 10},
            {"id": "b2", "title": "t", "author": "a", "rating": 5, "numberOfReviews": 1}
        ]))
        .await;
        let top = svc.get_top_rated(1).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].book.id, "b1");
        assert_eq!(top[0].popularity_score, 40.0);
        assert_eq!(svc.get_top_rated(5).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn featured_filters_on_flag() {
        let (svc, _) = setup(seed()).await;
        let featured = svc.get_featured().await.unwrap().into_vec();
        assert_eq!(ids(&featured), vec!["b1", "b4"]);

        let (svc, _) = setup(json!([{"id": "x", "title": "t", "author": "a"}])).await;
        assert!(svc.get_featured().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn insert_then_get_round_trips() {
        let (svc, _) = setup(seed()).await;
        let input: NewBook = serde_json::from_value(json!({
            "id": "b9", "title": "Piranesi", "author": "Clarke", "datePublished": "2020-09-15",
            "rating": 4.6, "numberOfReviews": 3, "featured": false, "isbn": "978-1635575637"
        }))
        .unwrap();
        let inserted = svc.insert(input.clone()).await.unwrap();
        let fetched = svc.get_by_id("b9").await.unwrap();
        assert_eq!(fetched, inserted);
        assert_eq!(NewBook::from(fetched), input);
        assert_eq!(svc.get_all().await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn duplicate_insert_is_rejected_without_touching_storage() {
        let (svc, store) = setup(seed()).await;
        let before = tokio::fs::read(store.path_for("books")).await.unwrap();
        let dup: NewBook = serde_json::from_value(json!({"id": "b2", "title": "Other", "author": "X"})).unwrap();
        for _ in 0..2 {
            assert!(matches!(svc.insert(dup.clone()).await, Err(ServiceError::Conflict(_))));
        }
        assert_eq!(tokio::fs::read(store.path_for("books")).await.unwrap(), before);
    }

    #[tokio::test]
    async fn insert_names_missing_fields() {
        let (svc, _) = setup(seed()).await;
        let err = svc
            .insert(NewBook { id: Some("b7".into()), ..Default::default() })
            .await
            .unwrap_err();
        match err {
            ServiceError::Validation(msg) => {
                assert!(msg.contains("title") && msg.contains("author"));
                assert!(!msg.contains("id,"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
