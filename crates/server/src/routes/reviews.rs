use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use models::{NewReview, Review};
use serde::Serialize;
use service::Matches;

use crate::errors::JsonApiError;
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookReviews {
    pub book_id: String,
    pub total_reviews: usize,
    pub reviews: Vec<Review>,
}

#[derive(Serialize)]
pub struct ReviewCreated {
    pub message: &'static str,
    pub review: Review,
}

pub async fn list_reviews(State(state): State<AppState>, Path(book_id): Path<String>) -> Result<Response, JsonApiError> {
    match state.reviews.get_by_book_id(&book_id).await? {
        Matches::Found(reviews) => Ok(Json(BookReviews {
            book_id,
            total_reviews: reviews.len(),
            reviews,
        })
        .into_response()),
        Matches::Empty => Ok((
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"message": "No reviews found for this book ID"})),
        )
            .into_response()),
    }
}

pub async fn create_review(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
    body: Result<Json<NewReview>, JsonRejection>,
) -> Result<(StatusCode, Json<ReviewCreated>), JsonApiError> {
    let Json(input) = body?;
    let review = state.reviews.insert(&book_id, input).await?;
    Ok((StatusCode::CREATED, Json(ReviewCreated { message: "New review added successfully", review })))
}
