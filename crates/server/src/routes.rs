pub mod books;
pub mod reviews;

use axum::{
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;

use common::types::Health;
use service::Matches;

use crate::middleware::{log_access, require_api_key};
use crate::state::AppState;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn hello() -> &'static str {
    "Hello, World! 🌍 from Amana Bookstore API"
}

async fn metrics() -> (StatusCode, String) {
    common::metrics::render()
}

/// 200 with the records, or 404 `{"message": ...}` when nothing matched.
pub(crate) fn matches_response<T: Serialize>(matches: Matches<T>, empty_message: &'static str) -> Response {
    match matches {
        Matches::Found(records) => Json(records).into_response(),
        Matches::Empty => {
            (StatusCode::NOT_FOUND, Json(serde_json::json!({"message": empty_message}))).into_response()
        }
    }
}

/// Build the full application router: public reads, API-key gated writes.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let write_gate = middleware::from_fn_with_state(state.clone(), require_api_key);

    let public = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/api/hello", get(hello));

    let books = Router::new()
        .route(
            "/api/books",
            get(books::list_books).merge(post(books::create_book).route_layer(write_gate.clone())),
        )
        .route("/api/books/published", get(books::published_between))
        .route("/api/books/top-rated", get(books::top_rated))
        .route("/api/books/featured", get(books::featured))
        .route("/api/books/:id", get(books::get_book))
        .route(
            "/api/books/:id/reviews",
            get(reviews::list_reviews).merge(post(reviews::create_review).route_layer(write_gate)),
        );

    public
        .merge(books)
        .with_state(state.clone())
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(
                            DefaultMakeSpan::new()
                                .level(Level::INFO)
                                .include_headers(false),
                        )
                        .on_request(DefaultOnRequest::new().level(Level::INFO))
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .include_headers(false),
                        )
                        .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
                )
                .layer(middleware::from_fn_with_state(state.access_log.clone(), log_access))
                .layer(cors),
        )
}
