//! Unified error handling with Sentry integration.
//!
//! Every fault that reaches a caller becomes the same generic
//! `500 Internal Server Error`: the service does no status-code mapping and
//! never exposes internal details. Whether a fault reaches the caller at all
//! is decided per route by [`crate::gateway::FaultPolicy`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use contest_hub_core::DocumentIdError;

use crate::payload::PayloadError;
use crate::session::TokenError;
use crate::store::StoreError;

/// Body sent with every fault response.
pub const FAULT_BODY: &str = "Internal Server Error";

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Document store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A path identifier could not be converted to a document identity.
    #[error("Identity conversion failed: {0}")]
    MalformedId(#[from] DocumentIdError),

    /// A JSON request body could not be turned into a document.
    #[error("Malformed body: {0}")]
    MalformedBody(#[from] PayloadError),

    /// Signing a session token failed.
    #[error("Token error: {0}")]
    Token(#[from] TokenError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let event_id = sentry::capture_error(&self);
        tracing::error!(
            error = %self,
            sentry_event_id = %event_id,
            "Request error"
        );

        (StatusCode::INTERNAL_SERVER_ERROR, FAULT_BODY).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
