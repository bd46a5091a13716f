//! Shopping list endpoints; lists are only visible to their owner.

use super::LimitQuery;
use crate::auth::ApiKeyUser;
use crate::error::ApiResult;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use rusqlite::Connection;
use shopping_core::model::clock::today;
use shopping_core::model::item::ItemId;
use shopping_core::model::shopping_list::ListId;
use shopping_core::repo::budget_repo::SqliteBudgetRepository;
use shopping_core::repo::item_repo::SqliteItemRepository;
use shopping_core::repo::list_repo::SqliteShoppingListRepository;
use shopping_core::schema::input::{BudgetInput, ItemQuantityInput, NewShoppingListInput};
use shopping_core::schema::output::{
    MessageSchema, ShoppingListDetail, ShoppingListPage, ShoppingListSchema,
};
use shopping_core::service::list_service::ShoppingListService;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create_list))
        .route("/me", get(get_my_lists))
        .route("/detail/{list_id}", get(get_list_detail))
        .route("/delete/{list_id}", delete(delete_list))
        .route("/{list_id}/items", put(set_item_quantity))
        .route("/{list_id}/items/{item_id}", delete(remove_item))
        .route("/{list_id}/budget", put(set_budget))
}

type SqliteListService<'conn> = ShoppingListService<
    SqliteShoppingListRepository<'conn>,
    SqliteBudgetRepository<'conn>,
    SqliteItemRepository<'conn>,
>;

fn list_service(conn: &Connection) -> SqliteListService<'_> {
    ShoppingListService::new(
        SqliteShoppingListRepository::new(conn),
        SqliteBudgetRepository::new(conn),
        SqliteItemRepository::new(conn),
    )
}

async fn create_list(
    State(state): State<AppState>,
    ApiKeyUser(user): ApiKeyUser,
    Json(input): Json<NewShoppingListInput>,
) -> ApiResult<(StatusCode, Json<ShoppingListSchema>)> {
    let list = state
        .run(move |conn| list_service(conn).create_list(&user, &input, today()))
        .await?;
    Ok((StatusCode::CREATED, Json(list)))
}

async fn get_my_lists(
    State(state): State<AppState>,
    ApiKeyUser(user): ApiKeyUser,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Json<ShoppingListPage>> {
    let lists = state
        .run(move |conn| list_service(conn).get_lists(&user, query.page_request(), today()))
        .await?;
    Ok(Json(lists))
}

async fn get_list_detail(
    State(state): State<AppState>,
    ApiKeyUser(user): ApiKeyUser,
    Path(list_id): Path<ListId>,
) -> ApiResult<Json<ShoppingListDetail>> {
    let detail = state
        .run(move |conn| list_service(conn).get_list_detail(list_id, &user, today()))
        .await?;
    Ok(Json(detail))
}

async fn delete_list(
    State(state): State<AppState>,
    ApiKeyUser(user): ApiKeyUser,
    Path(list_id): Path<ListId>,
) -> ApiResult<Json<MessageSchema>> {
    let message = state
        .run(move |conn| list_service(conn).delete_list(list_id, &user))
        .await?;
    Ok(Json(message))
}

async fn set_item_quantity(
    State(state): State<AppState>,
    ApiKeyUser(user): ApiKeyUser,
    Path(list_id): Path<ListId>,
    Json(input): Json<ItemQuantityInput>,
) -> ApiResult<Json<ShoppingListDetail>> {
    let detail = state
        .run(move |conn| list_service(conn).set_item_quantity(list_id, &user, &input, today()))
        .await?;
    Ok(Json(detail))
}

async fn remove_item(
    State(state): State<AppState>,
    ApiKeyUser(user): ApiKeyUser,
    Path((list_id, item_id)): Path<(ListId, ItemId)>,
) -> ApiResult<Json<ShoppingListDetail>> {
    let detail = state
        .run(move |conn| list_service(conn).remove_item(list_id, &user, item_id, today()))
        .await?;
    Ok(Json(detail))
}

async fn set_budget(
    State(state): State<AppState>,
    ApiKeyUser(user): ApiKeyUser,
    Path(list_id): Path<ListId>,
    Json(input): Json<BudgetInput>,
) -> ApiResult<Json<ShoppingListDetail>> {
    let detail = state
        .run(move |conn| list_service(conn).set_budget(list_id, &user, &input, today()))
        .await?;
    Ok(Json(detail))
}
