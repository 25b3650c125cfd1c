//! Executors for the generic gateway operations.
//!
//! Each executor performs exactly one store call and echoes the store's
//! result; the binding's [`FaultPolicy`](super::FaultPolicy) decides what a
//! failure looks like to the caller.

use std::collections::HashMap;

use axum::{
    Json,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::instrument;

use contest_hub_core::DocumentId;

use super::Binding;
use crate::error::AppError;
use crate::payload::document_from_body;
use crate::state::AppState;
use crate::store::DocumentStore;

/// Every document in the binding's collection.
#[instrument(skip_all, fields(binding = %binding))]
pub async fn list(state: &AppState, binding: &Binding) -> Response {
    let outcome = state
        .store()
        .find_all(binding.collection)
        .await
        .map(Json)
        .map_err(AppError::from);

    binding.policy.settle(binding, outcome).await
}

/// Insert the request body verbatim.
///
/// A body that is not declared as JSON inserts an empty document.
#[instrument(skip_all, fields(binding = %binding))]
pub async fn create(
    state: &AppState,
    binding: &Binding,
    headers: &HeaderMap,
    body: &[u8],
) -> Response {
    let outcome = async {
        let document = document_from_body(headers, body)?;
        let ack = state.store().insert_one(binding.collection, document).await?;
        Ok::<_, AppError>(Json(ack))
    }
    .await;

    binding.policy.settle(binding, outcome).await
}

/// The document whose identity is `raw_id`; an empty `200` when none matches.
#[instrument(skip_all, fields(binding = %binding, id = %raw_id))]
pub async fn get_by_id(state: &AppState, binding: &Binding, raw_id: &str) -> Response {
    let outcome = async {
        let id = DocumentId::parse(raw_id)?;
        let found = state.store().find_one(binding.collection, id).await?;
        Ok::<_, AppError>(found.map_or_else(
            || StatusCode::OK.into_response(),
            |doc| Json(doc).into_response(),
        ))
    }
    .await;

    binding.policy.settle(binding, outcome).await
}

/// Remove the document whose identity is `raw_id`.
#[instrument(skip_all, fields(binding = %binding, id = %raw_id))]
pub async fn delete_by_id(state: &AppState, binding: &Binding, raw_id: &str) -> Response {
    let outcome = async {
        let id = DocumentId::parse(raw_id)?;
        let ack = state.store().delete_one(binding.collection, id).await?;
        Ok::<_, AppError>(Json(ack))
    }
    .await;

    binding.policy.settle(binding, outcome).await
}

/// Documents whose `field` equals the query parameter of the same name.
///
/// A request without the parameter matches nothing.
#[instrument(skip_all, fields(binding = %binding, field = %field))]
pub async fn filter_by_field(
    state: &AppState,
    binding: &Binding,
    field: &str,
    params: &HashMap<String, String>,
) -> Response {
    let outcome = match params.get(field) {
        Some(value) => state
            .store()
            .find_by_field(binding.collection, field, value)
            .await
            .map(Json)
            .map_err(AppError::from),
        None => Ok(Json(Vec::new())),
    };

    binding.policy.settle(binding, outcome).await
}
