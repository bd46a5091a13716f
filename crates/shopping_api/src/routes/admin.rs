//! Staff moderation: accounts, API clients and forced deletes.

use super::items::item_service;
use crate::auth::StaffUser;
use crate::error::ApiResult;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::routing::{delete, get, patch};
use axum::{Json, Router};
use log::info;
use rusqlite::Connection;
use shopping_core::model::item::ItemId;
use shopping_core::model::store::StoreId;
use shopping_core::model::user::UserId;
use shopping_core::repo::client_repo::SqliteClientRepository;
use shopping_core::repo::item_repo::SqliteItemRepository;
use shopping_core::repo::store_repo::SqliteStoreRepository;
use shopping_core::repo::user_repo::SqliteUserRepository;
use shopping_core::schema::input::UserActiveInput;
use shopping_core::schema::output::{AdminClientSchema, AdminUserSchema, MessageSchema};
use shopping_core::service::admin_service::AdminService;
use shopping_core::service::store_service::StoreService;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/{user_id}/active", patch(set_user_active))
        .route("/clients", get(list_clients))
        .route("/stores/{store_id}", delete(delete_store))
        .route("/items/{item_id}", delete(delete_item))
}

fn admin_service(
    conn: &Connection,
) -> AdminService<SqliteUserRepository<'_>, SqliteClientRepository<'_>> {
    AdminService::new(
        SqliteUserRepository::new(conn),
        SqliteClientRepository::new(conn),
    )
}

async fn list_users(
    State(state): State<AppState>,
    _staff: StaffUser,
) -> ApiResult<Json<Vec<AdminUserSchema>>> {
    let users = state
        .run(move |conn| admin_service(conn).list_users())
        .await?;
    Ok(Json(users))
}

async fn set_user_active(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    Path(user_id): Path<UserId>,
    Json(input): Json<UserActiveInput>,
) -> ApiResult<Json<AdminUserSchema>> {
    let user = state
        .run(move |conn| admin_service(conn).set_user_active(user_id, input.is_active))
        .await?;
    info!(
        "event=admin_action module=admin status=ok action=set_user_active staff_id={} user_id={user_id}",
        staff.id
    );
    Ok(Json(user))
}

async fn list_clients(
    State(state): State<AppState>,
    _staff: StaffUser,
) -> ApiResult<Json<Vec<AdminClientSchema>>> {
    let clients = state
        .run(move |conn| admin_service(conn).list_clients())
        .await?;
    Ok(Json(clients))
}

async fn delete_store(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    Path(store_id): Path<StoreId>,
) -> ApiResult<Json<MessageSchema>> {
    let message = state
        .run(move |conn| {
            StoreService::new(
                SqliteStoreRepository::new(conn),
                SqliteItemRepository::new(conn),
            )
            .force_delete_store(store_id)
        })
        .await?;
    info!(
        "event=admin_action module=admin status=ok action=delete_store staff_id={} store_id={store_id}",
        staff.id
    );
    Ok(Json(message))
}

async fn delete_item(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    Path(item_id): Path<ItemId>,
) -> ApiResult<Json<MessageSchema>> {
    let message = state
        .run(move |conn| item_service(conn).force_delete_item(item_id))
        .await?;
    info!(
        "event=admin_action module=admin status=ok action=delete_item staff_id={} item_id={item_id}",
        staff.id
    );
    Ok(Json(message))
}
