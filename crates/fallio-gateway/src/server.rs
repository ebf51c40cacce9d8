// SPDX-FileCopyrightText: 2026 Fallio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, post},
};
use fallio_config::FallioConfig;
use fallio_core::FallioError;
use fallio_storage::Database;
use tower_http::cors::CorsLayer;

use crate::auth::{AuthConfig, auth_middleware};
use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Handle to the SQLite database.
    pub db: Database,
    /// Loaded configuration.
    pub config: Arc<FallioConfig>,
    /// Process start time for uptime reporting.
    pub start_time: Instant,
}

/// Build the gateway router over the given state.
///
/// - `GET /health` is public.
/// - Everything under `/v1` sits behind the bearer-token middleware
///   (a no-op when no token is configured).
pub fn build_router(state: GatewayState) -> Router {
    let auth = AuthConfig {
        bearer_token: state.config.server.bearer_token.clone(),
    };

    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route("/v1/fortunes/generate", post(handlers::post_generate))
        .route("/v1/cron/fortunes", post(handlers::post_process_fortunes))
        .route("/v1/cron/horoscopes", post(handlers::post_horoscopes))
        .route(
            "/v1/cron/horoscope-push",
            post(handlers::post_horoscope_push),
        )
        .route("/v1/models", get(handlers::get_models))
        .route_layer(axum_middleware::from_fn_with_state(auth, auth_middleware))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(CorsLayer::permissive())
}

/// Start the gateway server and serve until the process exits.
pub async fn start_server(db: Database, config: Arc<FallioConfig>) -> Result<(), FallioError> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = GatewayState {
        db,
        config,
        start_time: Instant::now(),
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| FallioError::Http {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| FallioError::Http {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}
