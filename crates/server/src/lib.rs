//! HTTP surface of the studygate service.
//!
//! ## Key Components
//!
//! - **`gateway`**: `GET|HEAD` stream routes, by resource id and by
//!   semantic path.
//! - **`lister`**: the `GET /resources` listing with ETag revalidation and
//!   delta sync.
//! - **`mint`**: explicit stream-token minting for logged-in clients.
//! - **`state`**: shared [`AppState`] wiring config, stores, and the rate
//!   limiter together.

use std::sync::Arc;
use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, ETAG, IF_NONE_MATCH, RANGE, RETRY_AFTER};
use axum::http::{HeaderName, Method};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{fmt, EnvFilter};

use studygate_core::constants::{
    RATE_LIMIT_LIMIT_HEADER, RATE_LIMIT_REMAINING_HEADER, RATE_LIMIT_RESET_HEADER,
    RATE_LIMIT_VIOLATIONS_HEADER, STREAM_TOKEN_HEADER,
};
use studygate_core::{Config, Error, Result};

pub mod error;
pub mod fingerprint;
pub mod gateway;
pub mod health;
pub mod lister;
pub mod mint;
pub mod state;

pub use self::state::AppState;

/// Build the service router around shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::HEAD, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, IF_NONE_MATCH, RANGE])
        .expose_headers([
            ETAG,
            RETRY_AFTER,
            HeaderName::from_static(STREAM_TOKEN_HEADER),
            HeaderName::from_static(RATE_LIMIT_LIMIT_HEADER),
            HeaderName::from_static(RATE_LIMIT_REMAINING_HEADER),
            HeaderName::from_static(RATE_LIMIT_RESET_HEADER),
            HeaderName::from_static(RATE_LIMIT_VIOLATIONS_HEADER),
        ])
        .max_age(Duration::from_secs(3600));

    Router::new()
        .route("/health", get(health::health))
        .route("/resources", get(lister::list_resources))
        .route("/resources/stream-token", post(mint::mint_stream_token))
        .route("/resources/:id/stream", get(gateway::stream_by_id))
        .route(
            "/files/:semester/:subject/:unit/:filename",
            get(gateway::stream_by_path),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Load configuration, connect the backends, and serve until shutdown.
pub async fn run() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = Config::from_env()?;
    tracing::info!(?config, "configuration loaded");

    let state = AppState::new(config).await;
    let address = format!("0.0.0.0:{}", state.config.port);
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|e| Error::server(format!("failed to bind {address}: {e}")))?;
    tracing::info!(%address, "listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::server(e.to_string()))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };
    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("failed to install sigterm handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
