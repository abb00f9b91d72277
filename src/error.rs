//! API error type and its HTTP rendering.
//!
//! Every failure maps to exactly one status code and a fixed client message.
//! The underlying cause is logged, never returned to the caller.

use crate::auth::AuthError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid ID")]
    InvalidIdentifier(#[source] uuid::Error),

    #[error("{0}")]
    Unauthenticated(#[from] AuthError),

    #[error("Unable to parse form file")]
    MalformedUpload(String),

    #[error("Uploaded file is not a supported image")]
    UnsupportedMediaType(String),

    #[error("Failed to save a file")]
    StorageWrite(#[source] std::io::Error),

    #[error("Unable to retrieve video metadata")]
    RecordLookup(anyhow::Error),

    #[error("You don't own this video")]
    Forbidden,

    #[error("Error updating video data")]
    Persistence(anyhow::Error),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("{0}")]
    Conflict(String),

    #[error("Video not found")]
    NotFound,

    #[error("Internal server error")]
    Internal(anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidIdentifier(_)
            | ApiError::MalformedUpload(_)
            | ApiError::UnsupportedMediaType(_)
            | ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated(_) | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::StorageWrite(_)
            | ApiError::RecordLookup(_)
            | ApiError::Persistence(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Body deserialization failures become a 400 in the usual error shape.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = ?self, "Request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = ?self, "Request rejected");
        }

        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
