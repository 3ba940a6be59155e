use std::io;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_DIRECTIVES: &str = "info,tower_http=info,axum=info";

fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Compact human-readable logs on stdout.
/// - Respects `RUST_LOG` if set, falls back to `info,tower_http=info,axum=info`
pub fn init_logging_default() {
    let _ = fmt()
        .with_env_filter(env_filter(DEFAULT_DIRECTIVES))
        .with_target(false)
        .compact()
        .with_writer(io::stdout)
        .try_init();
}

/// JSON logs on stdout, one object per event.
/// - Store and service events are emitted at debug unless `RUST_LOG` says otherwise
pub fn init_logging_json() {
    let _ = fmt()
        .with_env_filter(env_filter("info,service=debug,tower_http=info"))
        .with_target(true)
        .json()
        .with_writer(io::stdout)
        .try_init();
}

/// Pick the output format from `logging.json`.
pub fn init_logging(json: bool) {
    if json {
        init_logging_json()
    } else {
        init_logging_default()
    }
}
