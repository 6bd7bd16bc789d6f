use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RxMatrixError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RxMatrixError {
    /// True for failures that happened on the wire rather than in our own
    /// input handling.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            RxMatrixError::Transport(_) | RxMatrixError::Timeout(_) | RxMatrixError::Upstream(_)
        )
    }

    fn code(&self) -> &'static str {
        match self {
            RxMatrixError::Transport(_) | RxMatrixError::Upstream(_) => "upstream_unavailable",
            RxMatrixError::Timeout(_) => "upstream_timeout",
            RxMatrixError::MalformedResponse(_) => "upstream_malformed",
            RxMatrixError::Validation(_) | RxMatrixError::UrlParse(_) => "invalid_request",
            RxMatrixError::Json(_) | RxMatrixError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for RxMatrixError {
    fn into_response(self) -> Response {
        let status = match &self {
            RxMatrixError::Transport(_) => StatusCode::BAD_GATEWAY,
            RxMatrixError::MalformedResponse(_) => StatusCode::BAD_GATEWAY,
            RxMatrixError::Upstream(_) => StatusCode::BAD_GATEWAY,
            RxMatrixError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            RxMatrixError::Validation(_) => StatusCode::BAD_REQUEST,
            RxMatrixError::UrlParse(_) => StatusCode::BAD_REQUEST,
            RxMatrixError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RxMatrixError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Internal details never leave the process.
        let message = match &self {
            RxMatrixError::Json(_) | RxMatrixError::Internal(_) => {
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, RxMatrixError>;
