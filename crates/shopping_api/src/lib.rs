//! HTTP surface of the shopping app.
//!
//! # Responsibility
//! - Build the axum router mounted under `/api/v1`.
//! - Translate cookies and headers into authenticated users.
//! - Map service errors onto status codes and `{"detail": ...}` bodies.

pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::Router;

pub const API_PREFIX: &str = "/api/v1";

/// The full application router with request logging applied.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .nest(API_PREFIX, routes::router())
        .layer(axum::middleware::from_fn(middleware::log_requests))
        .with_state(state)
}
