use std::sync::Arc;
use std::time::Instant;

use axum::body::HttpBody;
use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use common::metrics;
use common::utils::access_log::{auth_line, request_line, AccessLog};
use service::auth::mask_credential;

use crate::state::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Middleware: writes require a valid `x-api-key` header.
///
/// Every attempt, accepted or not, is appended to the access log.
pub async fn require_api_key(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let key = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());
    let route = req.uri().to_string();

    let ok = state.authorizer.is_authorized(key.as_deref()).await;
    state
        .access_log
        .append(&auth_line(Utc::now(), ok, &mask_credential(key.as_deref()), &route))
        .await;

    if !ok {
        metrics::AUTH_REJECTED_TOTAL.inc();
        return (
            StatusCode::FORBIDDEN,
            Json(serde_json::json!({"error": "Access denied: invalid or missing API key"})),
        )
            .into_response();
    }

    next.run(req).await
}

/// Middleware: one access-log line and one metrics sample per request.
pub async fn log_access(State(log): State<Arc<AccessLog>>, req: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = req.method().to_string();
    let uri = req.uri().to_string();

    let res = next.run(req).await;

    let elapsed = started.elapsed();
    let status = res.status().as_u16();
    let content_length = res
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .or_else(|| res.body().size_hint().exact());
    log.append(&request_line(Utc::now(), &method, &uri, status, content_length, elapsed))
        .await;
    metrics::observe_request(status, elapsed.as_secs_f64());
    res
}
