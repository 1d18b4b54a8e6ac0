//! Handlers for user accounts and authentication

use super::{
    extractor::{AuthGuard, ValidJson},
    AppState,
};
use crate::{
    core::Error,
    store::model::UserInfo,
    util::{password::verify_password, token::Claims},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/register", post(register))
        .route("/users/login", post(login))
        .route("/users/:id", get(get_user))
}

// ========================// DTOs //======================== //

#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 50))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 50))]
    pub password: String,
}

#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
}

// ========================// Handlers //======================== //

async fn register(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<RegisterRequest>,
) -> Result<(StatusCode, Json<LoginResponse>), Error> {
    let user = state.db.create_user(&req).await?;

    let claims = Claims::new(user.id, &user.email, Duration::hours(state.config.token_duration));
    let token = state.jwt.create(&claims)?;

    tracing::info!(user_id = user.id, "user registered");
    let rsp = LoginResponse {
        token,
        user: user.into(),
    };
    Ok((StatusCode::CREATED, Json(rsp)))
}

async fn login(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> Result<Json<LoginResponse>, Error> {
    let user = state.db.find_user_by_email(&req.email).await?;

    verify_password(&req.password, &user.hashed_password)?;

    let claims = Claims::new(user.id, &user.email, Duration::hours(state.config.token_duration));
    let token = state.jwt.create(&claims)?;

    let rsp = LoginResponse {
        token,
        user: user.into(),
    };
    Ok(Json(rsp))
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    AuthGuard(_): AuthGuard,
    Path(user_id): Path<i64>,
) -> Result<Json<UserInfo>, Error> {
    let user = state.db.get_user(user_id).await?;
    Ok(Json(user.into()))
}
