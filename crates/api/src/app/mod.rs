//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection and the collaborators handlers use
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: view models and their validation rules
//! - `mapper.rs`: conversions between stored records and view models
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use crate::config::AppConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod extract;
pub mod links;
pub mod mapper;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router from configuration (public entrypoint used by `main.rs`).
pub async fn build_app(config: &AppConfig) -> anyhow::Result<Router> {
    let services = services::build_services(config).await?;
    Ok(build_router(services))
}

/// Router over already-wired services.
pub fn build_router(services: AppServices) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(Extension(Arc::new(services)))
        .layer(ServiceBuilder::new().layer(axum::middleware::from_fn(middleware::trace_requests)))
}
