use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::services::auth::{AuthErrorCode, AuthFailure};

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Failed to post comment")]
    CommentWrite,

    #[error("{0}")]
    Auth(#[from] AuthFailure),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            AppError::ExternalApi(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::HttpClient(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
            AppError::CommentWrite => (StatusCode::BAD_GATEWAY, self.to_string()),
            AppError::Auth(failure) => {
                let status = match failure.code {
                    AuthErrorCode::UserNotFound | AuthErrorCode::WrongCredential => {
                        StatusCode::UNAUTHORIZED
                    }
                    AuthErrorCode::EmailInUse => StatusCode::CONFLICT,
                    AuthErrorCode::WeakPassword | AuthErrorCode::InvalidEmail => {
                        StatusCode::BAD_REQUEST
                    }
                    AuthErrorCode::Unknown => StatusCode::BAD_GATEWAY,
                };
                (status, failure.message)
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
