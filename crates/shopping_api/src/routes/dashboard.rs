//! Dashboard endpoints, served twice: behind an API key for programmatic
//! clients and behind the session alone for the browser frontend.

use crate::auth::{ApiKeyUser, SessionUser};
use crate::error::ApiResult;
use crate::state::AppState;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use rusqlite::Connection;
use shopping_core::model::clock::today;
use shopping_core::model::user::UserId;
use shopping_core::repo::budget_repo::SqliteBudgetRepository;
use shopping_core::repo::item_repo::SqliteItemRepository;
use shopping_core::repo::list_repo::SqliteShoppingListRepository;
use shopping_core::schema::output::{
    DashboardCurrentSchema, DashboardHistorySchema, DashboardRecentSchema,
};
use shopping_core::service::dashboard_service::DashboardService;

pub fn api_key_router() -> Router<AppState> {
    Router::new()
        .route(
            "/overview",
            get(|state: State<AppState>, ApiKeyUser(user): ApiKeyUser| overview(state, user.id)),
        )
        .route(
            "/recent/items",
            get(|state: State<AppState>, ApiKeyUser(user): ApiKeyUser| {
                recent_items(state, user.id)
            }),
        )
        .route(
            "/history",
            get(|state: State<AppState>, ApiKeyUser(user): ApiKeyUser| history(state, user.id)),
        )
}

pub fn session_router() -> Router<AppState> {
    Router::new()
        .route(
            "/overview",
            get(|state: State<AppState>, SessionUser(user): SessionUser| overview(state, user.id)),
        )
        .route(
            "/recent/items",
            get(|state: State<AppState>, SessionUser(user): SessionUser| {
                recent_items(state, user.id)
            }),
        )
        .route(
            "/history",
            get(|state: State<AppState>, SessionUser(user): SessionUser| history(state, user.id)),
        )
}

type SqliteDashboard<'conn> = DashboardService<
    SqliteShoppingListRepository<'conn>,
    SqliteBudgetRepository<'conn>,
    SqliteItemRepository<'conn>,
>;

fn dashboard(conn: &Connection) -> SqliteDashboard<'_> {
    DashboardService::new(
        SqliteShoppingListRepository::new(conn),
        SqliteBudgetRepository::new(conn),
        SqliteItemRepository::new(conn),
    )
}

async fn overview(
    State(state): State<AppState>,
    user_id: UserId,
) -> ApiResult<Json<DashboardCurrentSchema>> {
    let overview = state
        .run(move |conn| dashboard(conn).overview(user_id, today()))
        .await?;
    Ok(Json(overview))
}

async fn recent_items(
    State(state): State<AppState>,
    user_id: UserId,
) -> ApiResult<Json<DashboardRecentSchema>> {
    let recent = state
        .run(move |conn| dashboard(conn).recent_items(user_id))
        .await?;
    Ok(Json(recent))
}

async fn history(
    State(state): State<AppState>,
    user_id: UserId,
) -> ApiResult<Json<DashboardHistorySchema>> {
    let history = state
        .run(move |conn| dashboard(conn).history(user_id, today()))
        .await?;
    Ok(Json(history))
}
