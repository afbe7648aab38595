use std::sync::Arc;

use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use axum::Router;
use index::{BackendConfig, Index};
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::middleware::{api_key_auth, log_requests, request_id};
use crate::routes::{duplicate, health};
use crate::state::ServerState;
use crate::store::OrderStore;

/// Builds the full router: unauthenticated probes at the root, the two
/// duplicate-check endpoints behind API-key auth and rate limiting.
///
/// Middleware order matters — `from_fn` layers wrap outside-in, so
/// `request_id` runs first (every response gets an id, even a 401),
/// `log_requests` runs last among the outer layers (so it sees the final
/// status), and `api_key_auth` only wraps the protected routes.
pub fn build_router(state: Arc<ServerState>) -> Router {
    let protected = Router::new()
        .route("/api/duplicate-check", post(duplicate::duplicate_check))
        .route("/api/duplicate-check-v2", post(duplicate::duplicate_check_v2))
        .route_layer(from_fn_with_state(state.clone(), api_key_auth));

    let public = Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .route("/ready", get(health::ready));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(from_fn(request_id))
                .layer(TraceLayer::new_for_http())
                .layer(from_fn(log_requests))
                .layer(TimeoutLayer::new(state.config.request_timeout()))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Loads configuration, opens the index backend, and serves until a
/// shutdown signal arrives.
pub async fn start_server() -> Result<(), ServerError> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = ServerConfig::load()?;
    let index = Index::open(&BackendConfig::redb(&config.index_path))?;
    let store = OrderStore::new();

    let addr = config.socket_addr()?;
    let state = Arc::new(ServerState::new(config, index, store));
    let app = build_router(state);

    tracing::info!(%addr, "starting codecheck server");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Config(e.to_string()))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServerError::Config(e.to_string()))?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received ctrl-c, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
