//! HTTP routes.
//!
//! # Route Structure
//!
//! ```text
//! GET    /                 - Liveness text
//! GET    /health/ready     - Readiness (pings the document store)
//!
//! # Collections (see gateway::bindings)
//! GET    /users            POST /users       DELETE /users/{id}
//! GET    /contests         POST /contests    GET /contests/{id}   DELETE /contests/{id}
//! GET    /carts            POST /carts       DELETE /carts/{id}
//!
//! # Session
//! POST   /jwt              - Issue the `token` cookie
//! GET    /logout           - Clear the `token` cookie
//! ```

pub mod health;
pub mod session;

use std::time::Duration;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::gateway::contest_routes;
use crate::middleware::{cors_layer, request_id_middleware};
use crate::state::AppState;

/// Create all routes for the service.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .merge(contest_routes().into_router())
        .route("/jwt", post(session::issue))
        .route("/logout", get(session::revoke))
}

/// The complete application: routes, middleware and state.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(state.config());

    routes()
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .layer(cors)
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

#[cfg(test)]
mod tests;
