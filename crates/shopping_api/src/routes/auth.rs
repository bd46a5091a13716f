//! Login, logout, registration and API client management.

use crate::auth::{auth_service, expired_session_cookie, session_cookie, MaybeSession, SessionUser};
use crate::error::ApiResult;
use crate::state::AppState;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::response::{AppendHeaders, IntoResponse};
use axum::routing::post;
use axum::{Json, Router};
use shopping_core::repo::client_repo::SqliteClientRepository;
use shopping_core::schema::input::{NewUserInput, UserCredentials};
use shopping_core::schema::output::{MessageSchema, TokenSchema};
use shopping_core::service::client_service::ClientService;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/register", post(register))
        .route("/client/enable", post(enable_client))
        .route("/client/disable", post(disable_client))
}

async fn login(
    State(state): State<AppState>,
    session: MaybeSession,
    Json(credentials): Json<UserCredentials>,
) -> ApiResult<impl IntoResponse> {
    let ttl_ms = state.config.session_ttl_ms;
    let outcome = state
        .run(move |conn| auth_service(conn, ttl_ms).login(session.user.as_ref(), &credentials))
        .await?;

    let cookie = session_cookie(&state.config, &outcome.session.session_key);
    Ok((AppendHeaders([(SET_COOKIE, cookie)]), Json(outcome.response)))
}

async fn logout(
    State(state): State<AppState>,
    session: MaybeSession,
) -> ApiResult<impl IntoResponse> {
    let ttl_ms = state.config.session_ttl_ms;
    let message = state
        .run(move |conn| auth_service(conn, ttl_ms).logout(session.session_key.as_deref()))
        .await?;

    let cookie = expired_session_cookie(&state.config);
    Ok((AppendHeaders([(SET_COOKIE, cookie)]), Json(message)))
}

async fn register(
    State(state): State<AppState>,
    session: MaybeSession,
    Json(input): Json<NewUserInput>,
) -> ApiResult<(StatusCode, Json<MessageSchema>)> {
    let ttl_ms = state.config.session_ttl_ms;
    let logged_in = session.user.is_some();
    let message = state
        .run(move |conn| auth_service(conn, ttl_ms).register(logged_in, &input))
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

async fn enable_client(
    State(state): State<AppState>,
    SessionUser(user): SessionUser,
) -> ApiResult<(StatusCode, Json<TokenSchema>)> {
    let token = state
        .run(move |conn| ClientService::new(SqliteClientRepository::new(conn)).enable_client(&user))
        .await?;
    Ok((StatusCode::CREATED, Json(token)))
}

async fn disable_client(
    State(state): State<AppState>,
    SessionUser(user): SessionUser,
) -> ApiResult<Json<MessageSchema>> {
    let message = state
        .run(move |conn| ClientService::new(SqliteClientRepository::new(conn)).disable_client(&user))
        .await?;
    Ok(Json(message))
}
