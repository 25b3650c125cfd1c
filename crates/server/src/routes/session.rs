//! Session token routes.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::cookie::Cookie;
use tracing::instrument;

use crate::error::Result;
use crate::payload::document_from_body;
use crate::state::AppState;

/// POST /jwt - Sign the posted claims and set the `token` cookie.
///
/// The token is only ever sent in the cookie, never in the body. A body not
/// declared as JSON signs an empty claim set.
#[instrument(skip_all)]
pub async fn issue(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    let claims = document_from_body(&headers, &body)?;
    let cookie = state.sessions().issue(&claims)?;
    tracing::debug!("Session token issued");
    Ok(acknowledge(&cookie))
}

/// GET /logout - Clear the `token` cookie.
///
/// Succeeds whether or not the caller had a cookie.
#[instrument(skip_all)]
pub async fn revoke(State(state): State<AppState>) -> Response {
    acknowledge(&state.sessions().revoke())
}

fn acknowledge(cookie: &Cookie<'_>) -> Response {
    (
        AppendHeaders([(SET_COOKIE, cookie.to_string())]),
        Json(json!({"success": true})),
    )
        .into_response()
}
