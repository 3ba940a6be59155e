use std::sync::Arc;

use axum::Router;
use common::utils::access_log::AccessLog;
use configs::AppConfig;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::errors::StartupError;
use crate::routes;
use crate::state::AppState;
use service::{auth::StaticKeyAuthorizer, runtime, storage::JsonCollectionStore};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Wire storage, authorization and the access log into a ready router.
pub async fn build_app(cfg: &AppConfig) -> Result<Router, StartupError> {
    let store = JsonCollectionStore::new(&cfg.storage.data_dir);
    runtime::prepare_storage(&store, cfg.storage.create_missing)
        .await
        .map_err(|e| StartupError::Runtime(e.to_string()))?;

    let access_log = AccessLog::open(&cfg.logging.access_log).await?;
    let authorizer = Arc::new(StaticKeyAuthorizer::new(cfg.auth.api_key.clone()));
    let state = AppState::new(store, authorizer, access_log);

    Ok(routes::build_router(state, build_cors()))
}

async fn shutdown_signal() {
    wait_for(tokio::signal::ctrl_c()).await
}

/// Resolve when `signal` fires. If the listener cannot be installed, log it
/// and never resolve, so the server keeps running instead of shutting down.
async fn wait_for<F>(signal: F)
where
    F: std::future::Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => info!(event = "shutdown_signal", "received Ctrl+C, shutting down"),
        Err(e) => {
            error!(event = "shutdown_signal", error = %e, "cannot listen for Ctrl+C; graceful shutdown disabled");
            std::future::pending::<()>().await
        }
    }
}

/// Public entry: build the app and run the HTTP server until Ctrl+C.
pub async fn run(mut cfg: AppConfig) -> anyhow::Result<()> {
    cfg.normalize_and_validate()
        .map_err(|e| StartupError::InvalidConfig(e.to_string()))?;

    let app = build_app(&cfg).await?;

    let addr = cfg.bind_addr();
    info!(%addr, data_dir = %cfg.storage.data_dir, access_log = %cfg.logging.access_log, "starting bookstore api");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
