//! Defines the extractors used by different web services.

use super::AppState;
use crate::{core::Error, util::token::Claims};
use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
    Json,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use serde::{de::DeserializeOwned, Deserialize};
use std::sync::Arc;
use validator::Validate;

/// Extracts the Json data from request body.
///
/// Validate the values of Json data.
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await?;
        data.validate()?;
        Ok(ValidJson(data))
    }
}

/// Extracts the JWT from the request header.
pub struct AuthGuard(pub Claims);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthGuard {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(token)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state).await?;
        let claims = state.jwt.verify(token.token())?;
        Ok(AuthGuard(claims))
    }
}

#[derive(Deserialize)]
struct TokenParam {
    token: Option<String>,
}

/// Extracts the JWT for a websocket handshake.
///
/// Browsers cannot set headers on websocket requests, so the token is
/// also accepted as a query parameter.
pub struct WsGuard(pub Claims);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for WsGuard {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if let Ok(TypedHeader(Authorization(token))) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state).await
        {
            let claims = state.jwt.verify(token.token())?;
            return Ok(WsGuard(claims));
        }

        let Query(param) = Query::<TokenParam>::from_request_parts(parts, state).await?;
        let token = param.token.ok_or(Error::Unauthorized)?;
        let claims = state.jwt.verify(&token)?;
        Ok(WsGuard(claims))
    }
}
