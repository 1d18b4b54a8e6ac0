//! Handlers for persisted call records

use super::{
    extractor::{AuthGuard, ValidJson},
    AppState,
};
use crate::{
    core::Error,
    store::model::{Call, CallParticipant},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/calls", get(list_calls).post(create_call))
        .route("/calls/join", post(join_call))
        .route("/calls/:call_id/leave", post(leave_call))
}

// ========================// DTOs //======================== //

#[derive(Deserialize, Validate)]
pub struct CreateCallRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub description: Option<String>,
}

#[derive(Deserialize, Validate)]
pub struct JoinCallRequest {
    #[validate(range(min = 1))]
    pub call_id: i64,
}

// ========================// Handlers //======================== //

async fn create_call(
    State(state): State<Arc<AppState>>,
    AuthGuard(claims): AuthGuard,
    ValidJson(req): ValidJson<CreateCallRequest>,
) -> Result<(StatusCode, Json<Call>), Error> {
    let call = state.db.create_call(claims.user_id, &req).await?;
    tracing::info!(call_id = call.id, creator_id = claims.user_id, "call created");
    Ok((StatusCode::CREATED, Json(call)))
}

async fn join_call(
    State(state): State<Arc<AppState>>,
    AuthGuard(claims): AuthGuard,
    ValidJson(req): ValidJson<JoinCallRequest>,
) -> Result<Json<CallParticipant>, Error> {
    let participant = state.db.join_call(req.call_id, claims.user_id).await?;
    Ok(Json(participant))
}

async fn leave_call(
    State(state): State<Arc<AppState>>,
    AuthGuard(claims): AuthGuard,
    Path(call_id): Path<i64>,
) -> Result<(), Error> {
    state.db.leave_call(call_id, claims.user_id).await
}

async fn list_calls(
    State(state): State<Arc<AppState>>,
    AuthGuard(_): AuthGuard,
) -> Result<Json<Vec<Call>>, Error> {
    let calls = state.db.list_active_calls().await?;
    Ok(Json(calls))
}
