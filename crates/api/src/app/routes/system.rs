use axum::http::{Method, StatusCode, Uri};

use crate::app::errors::ApiError;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Fallback for paths no route matches.
pub async fn no_route(uri: Uri) -> ApiError {
    ApiError::InvalidRequest(format!("no route for {}", uri.path()))
}

/// Fallback for a known path called with an unsupported method.
pub async fn method_not_allowed(method: Method, uri: Uri) -> ApiError {
    ApiError::InvalidRequest(format!("{method} is not supported on {}", uri.path()))
}
