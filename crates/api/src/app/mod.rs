//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: repository selection and service construction
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response DTOs, validation and the success envelope
//! - `errors.rs`: error codes and the error envelope
//!
//! Unknown paths, unsupported methods and handler panics all answer with the
//! error envelope too.

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
pub fn build_app(services: services::AppServices) -> Router {
    let services = Arc::new(services);

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .fallback(routes::system::no_route)
        .method_not_allowed_fallback(routes::system::method_not_allowed)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::trace_requests))
                .layer(CatchPanicLayer::custom(errors::panic_response))
                .layer(Extension(services)),
        )
}
