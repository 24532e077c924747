//! ForgePilot site library.
//!
//! The public marketing site and the admin dashboard are one axum
//! application. This crate exposes it as a library so the binary, the CLI
//! and the integration tests all build the same router.
//!
//! # Security
//!
//! The dashboard is gated by a single admin credential stored in the
//! hosted backend (`admin_config`). Every dashboard handler re-checks the
//! signed-in identity against that row; see [`middleware::guard`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod components;
pub mod config;
pub mod content;
pub mod error;
pub mod filters;
pub mod forms;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Router, middleware::from_fn, routing::get};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use middleware::{create_session_layer, csp_nonce_middleware, security_headers_middleware};
use state::AppState;

/// Directory served under `/static`, relative to the workspace root.
pub const STATIC_DIR: &str = "crates/site/static";

/// Build the complete application router.
///
/// Sentry layers are not included; the binary adds them outermost.
pub fn build_router(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(session_layer)
        // Layers run bottom-up: the nonce must exist before the headers read it
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(csp_nonce_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Reads the admin credential row, which every dashboard request needs.
/// Returns 503 Service Unavailable if the backend is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.admin_credential().await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
