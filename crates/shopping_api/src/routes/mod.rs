//! JSON routers, mounted together under `/api/v1`.

pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod items;
pub mod lists;
pub mod stores;

use crate::state::AppState;
use axum::Router;
use serde::Deserialize;
use shopping_core::model::page::DEFAULT_PER_PAGE;
use shopping_core::PageRequest;

pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/stores", stores::router())
        .nest("/items", items::router())
        .nest("/lists", lists::router())
        .nest("/dashboard", dashboard::api_key_router())
        .nest("/session/dashboard", dashboard::session_router())
        .nest("/admin", admin::router())
}

/// `?page&limit` pagination.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct LimitQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl LimitQuery {
    pub fn page_request(self) -> PageRequest {
        page_request(self.page, self.limit)
    }
}

fn page_request(page: Option<i64>, per_page: Option<i64>) -> PageRequest {
    PageRequest::new(
        page.unwrap_or(1),
        per_page.unwrap_or(i64::from(DEFAULT_PER_PAGE)),
    )
}
