//! Error types shared by the backend client and the page hosts.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::storage::StoreError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Failures talking to the platform backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Backend unreachable: {message}")]
    Transport { message: String },

    #[error("Backend request timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("Backend returned HTTP {status}")]
    Server { status: u16 },

    #[error("Invalid backend response: {message}")]
    InvalidResponse { message: String },

    #[error("Backend rejected the credential")]
    Unauthorized,

    #[error("{message}")]
    Rejected { message: String },
}

impl ApiError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    /// Transport-level failures that a later attempt may not hit
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. }
                | Self::Timeout { .. }
                | Self::Server { .. }
                | Self::InvalidResponse { .. }
        )
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout { seconds: 0 }
        } else if err.is_decode() {
            ApiError::invalid_response(err.to_string())
        } else {
            ApiError::transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::invalid_response(format!("JSON error: {}", err))
    }
}

/// Errors surfaced by the HTTP page hosts
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Please log in to continue")]
    Unauthenticated,

    #[error(transparent)]
    Backend(#[from] ApiError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated | AppError::Backend(ApiError::Unauthorized) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Backend(ApiError::Rejected { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Backend(ApiError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Backend(_) => StatusCode::BAD_GATEWAY,
            AppError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected: {}", self);
        }

        let body = Json(json!({
            "success": false,
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}
