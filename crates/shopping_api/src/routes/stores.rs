//! Store endpoints; every route requires an API key.

use super::LimitQuery;
use crate::auth::ApiKeyUser;
use crate::error::ApiResult;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use rusqlite::Connection;
use serde::Deserialize;
use shopping_core::model::store::StoreId;
use shopping_core::repo::item_repo::SqliteItemRepository;
use shopping_core::repo::store_repo::SqliteStoreRepository;
use shopping_core::schema::input::{NewStoreInput, StoreDescription, StoreSearch, StoreTypeInput};
use shopping_core::schema::output::{
    MessageSchema, StoreAggregation, StoreDetailWithItems, StorePage, StoreSchema,
};
use shopping_core::service::store_service::StoreService;
use shopping_core::StoreType;
use std::collections::BTreeMap;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_stores))
        .route("/me", get(get_my_stores))
        .route("/create", post(create_store))
        .route("/types/mapping", get(get_mapping))
        .route("/detail/{store_id}", get(get_store_detail))
        .route("/detail/{store_id}/items", get(get_store_detail_with_items))
        .route("/aggregate", get(aggregate))
        .route("/aggregate/me", get(aggregate_mine))
        .route("/update/{store_id}", patch(update_store))
        .route("/delete/{store_id}", delete(delete_store))
        .route("/search", post(search_stores))
}

fn store_service(conn: &Connection) -> StoreService<SqliteStoreRepository<'_>, SqliteItemRepository<'_>> {
    StoreService::new(
        SqliteStoreRepository::new(conn),
        SqliteItemRepository::new(conn),
    )
}

#[derive(Debug, Clone, Default, Deserialize)]
struct UpdateStoreQuery {
    name: Option<String>,
    store_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SearchStoresQuery {
    page: Option<i64>,
    limit: Option<i64>,
    name: Option<String>,
    #[serde(default)]
    own: bool,
}

/// Query strings carry the type as text; numbers are values, anything else a label.
fn parse_store_type(raw: String) -> StoreTypeInput {
    match raw.parse::<i64>() {
        Ok(value) => StoreTypeInput::Value(value),
        Err(_) => StoreTypeInput::Label(raw),
    }
}

async fn create_store(
    State(state): State<AppState>,
    ApiKeyUser(user): ApiKeyUser,
    Json(input): Json<NewStoreInput>,
) -> ApiResult<(StatusCode, Json<StoreSchema>)> {
    let store = state
        .run(move |conn| store_service(conn).create(&input, &user))
        .await?;
    Ok((StatusCode::CREATED, Json(store)))
}

async fn get_mapping(_user: ApiKeyUser) -> Json<BTreeMap<i64, &'static str>> {
    Json(StoreType::mapping())
}

async fn get_store_detail(
    State(state): State<AppState>,
    _user: ApiKeyUser,
    Path(store_id): Path<StoreId>,
) -> ApiResult<Json<StoreSchema>> {
    let store = state
        .run(move |conn| store_service(conn).get_store_detail(store_id))
        .await?;
    Ok(Json(store))
}

async fn get_store_detail_with_items(
    State(state): State<AppState>,
    _user: ApiKeyUser,
    Path(store_id): Path<StoreId>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Json<StoreDetailWithItems>> {
    let detail = state
        .run(move |conn| {
            store_service(conn).get_store_detail_with_items(store_id, query.page_request())
        })
        .await?;
    Ok(Json(detail))
}

async fn aggregate(
    State(state): State<AppState>,
    _user: ApiKeyUser,
) -> ApiResult<Json<StoreAggregation>> {
    let result = state
        .run(move |conn| store_service(conn).aggregate(None))
        .await?;
    Ok(Json(result))
}

async fn aggregate_mine(
    State(state): State<AppState>,
    ApiKeyUser(user): ApiKeyUser,
) -> ApiResult<Json<StoreAggregation>> {
    let result = state
        .run(move |conn| store_service(conn).aggregate(Some(user.id)))
        .await?;
    Ok(Json(result))
}

async fn get_stores(
    State(state): State<AppState>,
    _user: ApiKeyUser,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Json<StorePage>> {
    let page = state
        .run(move |conn| store_service(conn).get_stores(query.page_request(), None))
        .await?;
    Ok(Json(page))
}

async fn get_my_stores(
    State(state): State<AppState>,
    ApiKeyUser(user): ApiKeyUser,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Json<StorePage>> {
    let page = state
        .run(move |conn| store_service(conn).get_stores(query.page_request(), Some(user.id)))
        .await?;
    Ok(Json(page))
}

async fn update_store(
    State(state): State<AppState>,
    ApiKeyUser(user): ApiKeyUser,
    Path(store_id): Path<StoreId>,
    Query(query): Query<UpdateStoreQuery>,
    body: Option<Json<StoreDescription>>,
) -> ApiResult<Json<StoreSchema>> {
    let description = body.and_then(|Json(body)| body.description);
    let store_type = query.store_type.map(parse_store_type);
    let store = state
        .run(move |conn| {
            store_service(conn).update_store(
                store_id,
                &user,
                query.name.as_deref(),
                store_type.as_ref(),
                description.as_deref(),
            )
        })
        .await?;
    Ok(Json(store))
}

async fn delete_store(
    State(state): State<AppState>,
    ApiKeyUser(user): ApiKeyUser,
    Path(store_id): Path<StoreId>,
) -> ApiResult<Json<MessageSchema>> {
    let message = state
        .run(move |conn| store_service(conn).delete_store(store_id, &user))
        .await?;
    Ok(Json(message))
}

async fn search_stores(
    State(state): State<AppState>,
    ApiKeyUser(user): ApiKeyUser,
    Query(query): Query<SearchStoresQuery>,
    Json(search): Json<StoreSearch>,
) -> ApiResult<Json<StorePage>> {
    let page = LimitQuery {
        page: query.page,
        limit: query.limit,
    }
    .page_request();
    let owner = query.own.then_some(user.id);
    let result = state
        .run(move |conn| {
            store_service(conn).search_stores(page, query.name.as_deref(), owner, &search)
        })
        .await?;
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::parse_store_type;
    use shopping_core::schema::input::StoreTypeInput;

    #[test]
    fn numeric_query_types_become_values() {
        assert_eq!(parse_store_type("2".to_string()), StoreTypeInput::Value(2));
        assert_eq!(
            parse_store_type("In-Store".to_string()),
            StoreTypeInput::Label("In-Store".to_string())
        );
    }
}
