use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::HeaderMap,
};
use serde_json::Value;

use arkhyz_types::api::{IDEMPOTENCY_KEY_HEADER, PingResponse};
use arkhyz_types::Envelope;

use crate::error::ApiError;
use crate::router::AppState;

/// POST /api/submit-form: store a booking, review or investment inquiry.
pub async fn submit_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let Json(payload) = payload?;

    let idempotency_key = headers
        .get(IDEMPOTENCY_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim().to_string());

    let id = state.dispatcher.submit(payload, idempotency_key).await?;
    Ok(Json(Envelope::created(id)))
}

/// GET /ping: liveness probe, also the keep-alive target.
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse::ok())
}
