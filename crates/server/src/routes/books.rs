use axum::{
    extract::{rejection::{JsonRejection, QueryRejection}, Path, Query, State},
    http::StatusCode,
    response::Response,
    Json,
};
use models::{Book, NewBook, RankedBook};
use serde::{Deserialize, Serialize};
use service::catalogue::DEFAULT_TOP_RATED;

use crate::errors::JsonApiError;
use crate::routes::matches_response;
use crate::state::AppState;

#[derive(Serialize)]
pub struct BooksDocument {
    pub books: Vec<Book>,
}

#[derive(Debug, Deserialize)]
pub struct DateRangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TopRatedQuery {
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct BookCreated {
    pub message: &'static str,
    pub book: Book,
}

pub async fn list_books(State(state): State<AppState>) -> Result<Json<BooksDocument>, JsonApiError> {
    let books = state.catalogue.get_all().await?;
    Ok(Json(BooksDocument { books }))
}

pub async fn published_between(
    State(state): State<AppState>,
    query: Result<Query<DateRangeQuery>, QueryRejection>,
) -> Result<Response, JsonApiError> {
    let Query(q) = query?;
    let matches = state
        .catalogue
        .get_by_date_range(q.start.as_deref(), q.end.as_deref())
        .await?;
    Ok(matches_response(matches, "No books found within the specified date range"))
}

pub async fn top_rated(
    State(state): State<AppState>,
    query: Result<Query<TopRatedQuery>, QueryRejection>,
) -> Result<Json<Vec<RankedBook>>, JsonApiError> {
    let Query(q) = query?;
    let ranked = state.catalogue.get_top_rated(q.limit.unwrap_or(DEFAULT_TOP_RATED)).await?;
    Ok(Json(ranked))
}

pub async fn featured(State(state): State<AppState>) -> Result<Response, JsonApiError> {
    let matches = state.catalogue.get_featured().await?;
    Ok(matches_response(matches, "No featured books found"))
}

pub async fn get_book(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Book>, JsonApiError> {
    Ok(Json(state.catalogue.get_by_id(&id).await?))
}

pub async fn create_book(
    State(state): State<AppState>,
    body: Result<Json<NewBook>, JsonRejection>,
) -> Result<(StatusCode, Json<BookCreated>), JsonApiError> {
    let Json(input) = body?;
    let book = state.catalogue.insert(input).await?;
    Ok((StatusCode::CREATED, Json(BookCreated { message: "New book added successfully", book })))
}
