//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::{ConsultError, RecommendationFailure};

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
    /// Raw model output, present on 422 responses for diagnosis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthorized,
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {message}")]
    Conflict { code: &'static str, message: String },
    #[error("Unparseable model output")]
    Unprocessable { code: &'static str, raw: String },
    #[error("Upstream failure: {message}")]
    Upstream { code: &'static str, message: String },
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, raw) = match self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHENTICATED",
                "Authentication required".to_string(),
                None,
            ),
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_FAILED", detail, None)
            }
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail, None),
            ApiError::Conflict { code, message } => (StatusCode::CONFLICT, code, message, None),
            ApiError::Unprocessable { code, raw } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                code,
                "Failed to parse model response as JSON".to_string(),
                Some(raw),
            ),
            ApiError::Upstream { code, message } => {
                (StatusCode::BAD_GATEWAY, code, message, None)
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message, raw },
        };
        (status, Json(body)).into_response()
    }
}

impl From<ConsultError> for ApiError {
    fn from(err: ConsultError) -> Self {
        let code = err.code();
        match err {
            ConsultError::Unauthenticated => ApiError::Unauthorized,
            ConsultError::ValidationFailed(detail) => ApiError::BadRequest(detail),
            ConsultError::NotFound(detail) => ApiError::NotFound(detail),
            ConsultError::MalformedModelOutput { raw }
            | ConsultError::RecommendationFailed(RecommendationFailure::MalformedOutput { raw }) => {
                ApiError::Unprocessable { code, raw }
            }
            ConsultError::RecommendationFailed(RecommendationFailure::Upstream(detail))
            | ConsultError::UpstreamServiceFailure(detail)
            | ConsultError::CallTeardownFailure(detail) => ApiError::Upstream {
                code,
                message: detail,
            },
            err @ (ConsultError::ReportInProgress(_) | ConsultError::InvalidCallState { .. }) => {
                ApiError::Conflict {
                    code,
                    message: err.to_string(),
                }
            }
            ConsultError::Storage(detail) => ApiError::Internal(detail),
        }
    }
}
