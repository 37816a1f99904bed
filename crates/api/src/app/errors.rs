//! Error taxonomy and the single translation point into the error envelope.

use std::any::Any;
use std::collections::BTreeMap;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use catalog_core::DomainError;
use catalog_products::ProductError;

/// Field name → validation message.
pub type FieldErrors = BTreeMap<String, String>;

/// Stable error codes. The `code()` strings are the public contract and must
/// keep their meaning once published.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidRequest,
    ValidationError,
    ProductNotFound,
    InternalServerError,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::InvalidRequest | ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::ProductNotFound => StatusCode::NOT_FOUND,
            ErrorCode::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            ErrorCode::InvalidRequest => "COMMON-001",
            ErrorCode::ValidationError => "COMMON-002",
            ErrorCode::ProductNotFound => "PRODUCT-001",
            ErrorCode::InternalServerError => "COMMON-999",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ErrorCode::InvalidRequest => "The request is malformed.",
            ErrorCode::ValidationError => "Request validation failed.",
            ErrorCode::ProductNotFound => "Product not found.",
            ErrorCode::InternalServerError => "An internal server error occurred.",
        }
    }
}

/// Error envelope sent for every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorResponse {
    pub code: &'static str,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
    pub timestamp: DateTime<Utc>,
}

impl ApiErrorResponse {
    pub fn of(code: ErrorCode, at: DateTime<Utc>) -> Self {
        Self {
            code: code.code(),
            message: code.message(),
            errors: None,
            timestamp: at,
        }
    }

    pub fn with_errors(code: ErrorCode, errors: FieldErrors, at: DateTime<Utc>) -> Self {
        Self {
            errors: Some(errors),
            ..Self::of(code, at)
        }
    }
}

/// Every way a request can fail, as seen by the HTTP layer.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be read at all (bad JSON, non-numeric id, ...).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// One or more fields broke a validation rule.
    #[error("validation failed for {} field(s)", .0.len())]
    Validation(FieldErrors),

    /// A domain error with its own bound code.
    #[error("business error {}", .0.code())]
    Business(ErrorCode),

    /// Anything unexpected. Details stay in the server log.
    #[error("internal error: {0:#}")]
    Internal(anyhow::Error),
}

impl ApiError {
    /// Build a validation error from field-level domain errors. The first
    /// message recorded for a field wins.
    pub fn validation(errors: impl IntoIterator<Item = DomainError>) -> Self {
        let mut fields = FieldErrors::new();
        for err in errors {
            let (field, message) = match err {
                DomainError::InvalidField { field, message } => (field.to_string(), message),
                other => ("request".to_string(), other.to_string()),
            };
            fields.entry(field).or_insert(message);
        }
        ApiError::Validation(fields)
    }

    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        ApiError::Internal(err.into())
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            ApiError::InvalidRequest(_) => ErrorCode::InvalidRequest,
            ApiError::Validation(_) => ErrorCode::ValidationError,
            ApiError::Business(code) => *code,
            ApiError::Internal(_) => ErrorCode::InternalServerError,
        }
    }

    /// Translate into status + envelope, logging as appropriate.
    pub fn to_envelope(self, at: DateTime<Utc>) -> (StatusCode, ApiErrorResponse) {
        let code = self.error_code();
        let body = match self {
            ApiError::Validation(fields) => {
                tracing::debug!(?fields, "request validation failed");
                ApiErrorResponse::with_errors(code, fields, at)
            }
            ApiError::Internal(err) => {
                tracing::error!(error = ?err, "unexpected error while handling request");
                ApiErrorResponse::of(code, at)
            }
            ApiError::InvalidRequest(detail) => {
                tracing::debug!(%detail, "rejected malformed request");
                ApiErrorResponse::of(code, at)
            }
            ApiError::Business(_) => ApiErrorResponse::of(code, at),
        };
        (code.status(), body)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.to_envelope(Utc::now());
        (status, Json(body)).into_response()
    }
}

/// Response for a handler that panicked: logged, then sent as COMMON-999.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic payload".to_string()
    };
    ApiError::internal(anyhow::anyhow!("handler panicked: {detail}")).into_response()
}

impl From<ProductError> for ApiError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound(_) => ApiError::Business(ErrorCode::ProductNotFound),
            ProductError::Domain(e @ DomainError::InvalidField { .. }) => ApiError::validation([e]),
            ProductError::Domain(e) => ApiError::internal(e),
            ProductError::Repository(e) => ApiError::internal(e),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}
