//! HTTP error mapping
//!
//! Every failure leaves the service as `{ "error": <message>, "code": <code> }`
//! with a status derived from the error's category.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

use crate::storage::StoreError;
use crate::validation::error::{ErrorKind, LocalizationError};

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or incomplete request (400)
    #[error("{message}")]
    Validation { message: String, code: &'static str },

    /// No caller identity (401)
    #[error("{message}")]
    Unauthorized { message: String },

    /// Unknown resource (404)
    #[error("{message}")]
    NotFound { message: String },

    /// Anchor geometry cannot be solved (422)
    #[error("{message}")]
    Geometry { message: String },

    /// Internal server error (500)
    #[error("{message}")]
    Internal { message: String },
}

/// JSON error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            code: "VALIDATION_ERROR",
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Geometry { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { code, .. } => *code,
            Self::Unauthorized { .. } => "UNAUTHORIZED",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Geometry { .. } => "DEGENERATE_GEOMETRY",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<LocalizationError> for ApiError {
    fn from(err: LocalizationError) -> Self {
        match err.kind() {
            ErrorKind::Numerical => Self::Geometry {
                message: err.to_string(),
            },
            ErrorKind::InputValidation | ErrorKind::DomainPrecondition => Self::Validation {
                message: err.to_string(),
                code: err.error_code(),
            },
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unauthenticated => Self::Unauthorized {
                message: err.to_string(),
            },
            StoreError::IncompleteResult => Self::Validation {
                message: err.to_string(),
                code: "INCOMPLETE_RESULT",
            },
            StoreError::NotFound { .. } => Self::NotFound {
                message: err.to_string(),
            },
            StoreError::Io { .. } | StoreError::Serialization(_) => Self::internal(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation {
            message: rejection.body_text(),
            code: "MALFORMED_JSON",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!(status = %status, code = self.error_code(), error = %self, "request failed");
        } else {
            warn!(status = %status, code = self.error_code(), error = %self, "request rejected");
        }

        let body = ErrorBody {
            error: self.to_string(),
            code: self.error_code().to_string(),
        };

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_localization_error_mapping() {
        let err: ApiError = LocalizationError::DegenerateGeometry { determinant: 0.0 }.into();
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        let err: ApiError = LocalizationError::MissingReading { anchor_id: "A2".into() }.into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "MISSING_READING");
        assert_eq!(err.to_string(), "Missing RSSI reading for anchor A2");

        let err: ApiError = LocalizationError::InvalidPathLossExponent { value: 0.0 }.into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_store_error_mapping() {
        assert_eq!(
            ApiError::from(StoreError::Unauthenticated).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(StoreError::IncompleteResult).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(StoreError::NotFound { id: "x".into() }).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(StoreError::Io {
                path: "runs.json".into(),
                message: "denied".into()
            })
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_response_status() {
        let response = ApiError::validation("bad").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
