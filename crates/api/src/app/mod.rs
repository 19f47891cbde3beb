//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: storage and access engine wiring
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: query parameters and response envelopes
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(services: AppServices) -> Router {
    let routes = routes::router(&services);

    routes
        .fallback(routes::system::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::trace_request))
                .layer(Extension(Arc::new(services))),
        )
}
