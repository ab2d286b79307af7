use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use serde_json::Value;

use arkhyz_types::{Envelope, RecordKind};

use crate::error::ApiError;
use crate::router::AppState;

pub async fn list_bookings(State(state): State<AppState>) -> Result<Json<Envelope>, ApiError> {
    list(state, RecordKind::Booking).await
}

pub async fn list_reviews(State(state): State<AppState>) -> Result<Json<Envelope>, ApiError> {
    list(state, RecordKind::Review).await
}

pub async fn list_investments(State(state): State<AppState>) -> Result<Json<Envelope>, ApiError> {
    list(state, RecordKind::Investment).await
}

async fn list(state: AppState, kind: RecordKind) -> Result<Json<Envelope>, ApiError> {
    let rows = state.dispatcher.list(kind).await?;
    Ok(Json(Envelope::listed(rows)))
}

/// PUT /api/{collection}/{id}: full replacement of the editable fields.
pub async fn update_record(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let (kind, id) = target(&collection, &id)?;
    let Json(payload) = payload?;

    state.dispatcher.update(kind, id, payload).await?;
    Ok(Json(Envelope::done("Record updated")))
}

/// DELETE /api/{collection}/{id}
pub async fn delete_record(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let (kind, id) = target(&collection, &id)?;

    state.dispatcher.delete(kind, id).await?;
    Ok(Json(Envelope::done("Record deleted")))
}

fn target(collection: &str, id: &str) -> Result<(RecordKind, i64), ApiError> {
    let kind = RecordKind::from_collection(collection)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown record type: {collection}")))?;
    let id = id
        .parse::<i64>()
        .map_err(|_| ApiError::BadRequest(format!("Invalid id: {id}")))?;
    Ok((kind, id))
}
