use axum::http::StatusCode;
use once_cell::sync::Lazy;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Encoder, Histogram, IntCounter,
    IntCounterVec, TextEncoder,
};

// Prometheus metrics (default registry)
pub static REQUESTS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "bookstore_requests_total",
        "Total HTTP requests handled"
    )
    .expect("register requests_total")
});

pub static RESPONSES_BY_CLASS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "bookstore_responses_total",
        "HTTP responses by status class",
        &["class"]
    )
    .expect("register responses_total")
});

pub static REQUEST_DURATION: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "bookstore_request_duration_seconds",
        "Request duration in seconds",
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .expect("register request_duration")
});

pub static AUTH_REJECTED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "bookstore_auth_rejected_total",
        "Write requests rejected by the API key check"
    )
    .expect("register auth_rejected_total")
});

/// Record one finished request.
pub fn observe_request(status: u16, seconds: f64) {
    REQUESTS_TOTAL.inc();
    let class = match status {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        _ => "5xx",
    };
    RESPONSES_BY_CLASS.with_label_values(&[class]).inc();
    REQUEST_DURATION.observe(seconds);
}

/// Encode the default registry in the Prometheus text format.
pub fn render() -> (StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (StatusCode::INTERNAL_SERVER_ERROR, format!("encode error: {e}"));
    }
    match String::from_utf8(buffer) {
        Ok(s) => (StatusCode::OK, s),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, format!("utf8 error: {e}")),
    }
}
