//! Item endpoints; every route requires an API key.

use super::{page_request, LimitQuery};
use crate::auth::ApiKeyUser;
use crate::error::ApiResult;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use rusqlite::Connection;
use serde::Deserialize;
use shopping_core::model::item::ItemId;
use shopping_core::model::store::StoreId;
use shopping_core::repo::item_repo::SqliteItemRepository;
use shopping_core::repo::list_repo::SqliteShoppingListRepository;
use shopping_core::repo::store_repo::SqliteStoreRepository;
use shopping_core::schema::input::{ItemSearch, NewItemInput, UpdateItem};
use shopping_core::schema::output::{ItemAggregation, ItemPage, ItemSchema, MessageSchema};
use shopping_core::service::item_service::ItemService;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_items))
        .route("/me", get(get_my_items))
        .route("/create", post(create_item))
        .route("/aggregate", get(aggregate))
        .route("/aggregate/me", get(aggregate_mine))
        .route("/detail/{item_id}", get(get_item_detail))
        .route("/update/{item_id}", patch(update_item))
        .route("/delete/{item_id}", delete(delete_item))
        .route("/search", post(search_items))
}

pub(crate) type SqliteItemService<'conn> = ItemService<
    SqliteItemRepository<'conn>,
    SqliteStoreRepository<'conn>,
    SqliteShoppingListRepository<'conn>,
>;

pub(crate) fn item_service(conn: &Connection) -> SqliteItemService<'_> {
    ItemService::new(
        SqliteItemRepository::new(conn),
        SqliteStoreRepository::new(conn),
        SqliteShoppingListRepository::new(conn),
    )
}

/// `?page&per_page` pagination used by the item listings.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
struct PerPageQuery {
    page: Option<i64>,
    per_page: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SearchItemsQuery {
    page: Option<i64>,
    limit: Option<i64>,
    name: Option<String>,
    #[serde(default)]
    own: bool,
    store: Option<StoreId>,
}

async fn create_item(
    State(state): State<AppState>,
    ApiKeyUser(user): ApiKeyUser,
    Json(input): Json<NewItemInput>,
) -> ApiResult<(StatusCode, Json<ItemSchema>)> {
    let item = state
        .run(move |conn| item_service(conn).create_item(&user, &input))
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn get_items(
    State(state): State<AppState>,
    _user: ApiKeyUser,
    Query(query): Query<PerPageQuery>,
) -> ApiResult<Json<ItemPage>> {
    let page = page_request(query.page, query.per_page);
    let items = state
        .run(move |conn| item_service(conn).get_items(page, None))
        .await?;
    Ok(Json(items))
}

async fn get_my_items(
    State(state): State<AppState>,
    ApiKeyUser(user): ApiKeyUser,
    Query(query): Query<PerPageQuery>,
) -> ApiResult<Json<ItemPage>> {
    let page = page_request(query.page, query.per_page);
    let items = state
        .run(move |conn| item_service(conn).get_items(page, Some(user.id)))
        .await?;
    Ok(Json(items))
}

async fn aggregate(
    State(state): State<AppState>,
    _user: ApiKeyUser,
) -> ApiResult<Json<ItemAggregation>> {
    let result = state
        .run(move |conn| item_service(conn).aggregate(None))
        .await?;
    Ok(Json(result))
}

async fn aggregate_mine(
    State(state): State<AppState>,
    ApiKeyUser(user): ApiKeyUser,
) -> ApiResult<Json<ItemAggregation>> {
    let result = state
        .run(move |conn| item_service(conn).aggregate(Some(user.id)))
        .await?;
    Ok(Json(result))
}

async fn get_item_detail(
    State(state): State<AppState>,
    _user: ApiKeyUser,
    Path(item_id): Path<ItemId>,
) -> ApiResult<Json<ItemSchema>> {
    let item = state
        .run(move |conn| item_service(conn).get_item_detail(item_id))
        .await?;
    Ok(Json(item))
}

async fn update_item(
    State(state): State<AppState>,
    ApiKeyUser(user): ApiKeyUser,
    Path(item_id): Path<ItemId>,
    Json(update): Json<UpdateItem>,
) -> ApiResult<Json<ItemSchema>> {
    let item = state
        .run(move |conn| item_service(conn).update_item(item_id, &user, &update))
        .await?;
    Ok(Json(item))
}

async fn delete_item(
    State(state): State<AppState>,
    ApiKeyUser(user): ApiKeyUser,
    Path(item_id): Path<ItemId>,
) -> ApiResult<Json<MessageSchema>> {
    let message = state
        .run(move |conn| item_service(conn).delete_item(item_id, &user))
        .await?;
    Ok(Json(message))
}

async fn search_items(
    State(state): State<AppState>,
    ApiKeyUser(user): ApiKeyUser,
    Query(query): Query<SearchItemsQuery>,
    Json(search): Json<ItemSearch>,
) -> ApiResult<Json<ItemPage>> {
    let page = LimitQuery {
        page: query.page,
        limit: query.limit,
    }
    .page_request();
    let owner = query.own.then_some(user.id);
    let items = state
        .run(move |conn| {
            item_service(conn).search_items(owner, page, query.name.as_deref(), query.store, &search)
        })
        .await?;
    Ok(Json(items))
}
