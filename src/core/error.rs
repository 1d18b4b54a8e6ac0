use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::typed_header::TypedHeaderRejection;
use serde_json::json;
use tokio::sync::mpsc;

/// A common error type that can be used throughout the App
#[derive(thiserror::Error, Debug)]
pub enum Error {
    // 203
    #[error("Token is expired")]
    ExpiredToken,

    // 400 Bad Request
    #[error(transparent)]
    Validation(#[from] validator::ValidationErrors),
    #[error("The password doesn't match")]
    WrongPassword,
    #[error("Duplicate value on {0}")]
    UniqueConstraint(String),
    #[error("The call is not active")]
    CallNotActive,

    // 401 Unauthorized
    #[error("Authentication required")]
    Unauthorized,

    // 403 Forbidden
    #[error("Origin not allowed")]
    OriginNotAllowed,

    // 404 NotFound
    #[error("Resource not found")]
    NotFound,

    // 422 UnprocessableEntity
    #[error(transparent)]
    QueryRejection(#[from] QueryRejection),
    #[error(transparent)]
    JsonRejection(#[from] JsonRejection),
    #[error(transparent)]
    TypedHeaderRejection(#[from] TypedHeaderRejection),

    // 500 Internal Server Error
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Bcrypt(#[from] bcrypt::BcryptError),
    #[error("Failed to create token")]
    TokenCreation,

    // Websocket Error
    #[error("Failed to send websocket message")]
    SendMessage,
    #[error("Failed to serialize websocket message")]
    SerializeMessage,
}

// Convert mpsc send error to Error
impl<T> From<mpsc::error::SendError<T>> for Error {
    fn from(_: mpsc::error::SendError<T>) -> Self {
        Self::SendMessage
    }
}

impl Error {
    pub fn into_error(self) -> (StatusCode, String) {
        let status = match self {
            // 203
            Error::ExpiredToken => StatusCode::NON_AUTHORITATIVE_INFORMATION,
            // 400
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::WrongPassword => StatusCode::BAD_REQUEST,
            Error::UniqueConstraint(_) => StatusCode::BAD_REQUEST,
            Error::CallNotActive => StatusCode::BAD_REQUEST,
            // 401
            Error::Unauthorized => StatusCode::UNAUTHORIZED,
            // 403
            Error::OriginNotAllowed => StatusCode::FORBIDDEN,
            // 404
            Error::NotFound => StatusCode::NOT_FOUND,
            // 422
            Error::QueryRejection(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::JsonRejection(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::TypedHeaderRejection(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => {
                tracing::error!("{}", self.to_string());
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server internal error".into(),
                );
            }
        };
        (status, self.to_string())
    }
}

// Axum allows you to return Error which impl IntoResponse
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = self.into_error();
        (status, Json(json!({ "error": message }))).into_response()
    }
}
