//! Liveness and readiness probes.

use axum::extract::State;
use axum::http::StatusCode;

use crate::state::AppState;
use crate::store::DocumentStore;

/// Text returned by the liveness route.
pub const LIVENESS_TEXT: &str = "Server Running Smoothly";

/// Liveness check at `/`. Does not touch the store.
pub async fn liveness() -> &'static str {
    LIVENESS_TEXT
}

/// Readiness health check endpoint.
///
/// Pings the document store; 503 Service Unavailable if it does not answer.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
