//! Request authentication extractors and session cookie helpers.
//!
//! # Responsibility
//! - Resolve the `sessionid` cookie into a [`User`] for session routes.
//! - Require a matching `X-API-Key` on top of the session for API-key routes.
//! - Gate staff routes on `is_staff`.
//!
//! # Invariants
//! - Every authentication failure answers 401 `{"detail":"Unauthorized"}`.
//! - A non-staff user on a staff route answers 403.

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use rusqlite::Connection;
use shopping_core::repo::client_repo::SqliteClientRepository;
use shopping_core::repo::session_repo::SqliteSessionRepository;
use shopping_core::repo::user_repo::SqliteUserRepository;
use shopping_core::service::auth_service::AuthService;
use shopping_core::User;

pub const API_KEY_HEADER: &str = "x-api-key";

pub(crate) type SqliteAuthService<'conn> = AuthService<
    SqliteUserRepository<'conn>,
    SqliteSessionRepository<'conn>,
    SqliteClientRepository<'conn>,
>;

pub(crate) fn auth_service(conn: &Connection, session_ttl_ms: i64) -> SqliteAuthService<'_> {
    AuthService::new(
        SqliteUserRepository::new(conn),
        SqliteSessionRepository::new(conn),
        SqliteClientRepository::new(conn),
        session_ttl_ms,
    )
}

/// Value of the cookie `name`, if the request carries one.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value that stores `session_key` in the browser.
pub fn session_cookie(config: &ApiConfig, session_key: &str) -> String {
    let max_age_secs = config.session_ttl_ms / 1000;
    let mut cookie = format!(
        "{}={session_key}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}",
        config.session_cookie
    );
    if config.secure_cookies {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that removes the session cookie.
pub fn expired_session_cookie(config: &ApiConfig) -> String {
    format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        config.session_cookie
    )
}

/// Whatever session the request carries, valid or not.
#[derive(Debug, Clone, Default)]
pub struct MaybeSession {
    pub session_key: Option<String>,
    pub user: Option<User>,
}

impl FromRequestParts<AppState> for MaybeSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(session_key) = cookie_value(&parts.headers, &state.config.session_cookie) else {
            return Ok(Self::default());
        };

        let ttl_ms = state.config.session_ttl_ms;
        let lookup = session_key.clone();
        let user = state
            .run(move |conn| auth_service(conn, ttl_ms).authenticate_session(&lookup))
            .await?;

        Ok(Self {
            session_key: Some(session_key),
            user,
        })
    }
}

/// A request with a valid, active session.
#[derive(Debug, Clone)]
pub struct SessionUser(pub User);

impl FromRequestParts<AppState> for SessionUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        MaybeSession::from_request_parts(parts, state)
            .await?
            .user
            .map(SessionUser)
            .ok_or_else(ApiError::unauthorized)
    }
}

/// A session user whose request also carries their client secret.
#[derive(Debug, Clone)]
pub struct ApiKeyUser(pub User);

impl FromRequestParts<AppState> for ApiKeyUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let SessionUser(user) = SessionUser::from_request_parts(parts, state).await?;
        let api_key = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let ttl_ms = state.config.session_ttl_ms;
        let checked = user.clone();
        state
            .run(move |conn| {
                auth_service(conn, ttl_ms).authenticate_api_key(&checked, api_key.as_deref())
            })
            .await?;
        Ok(Self(user))
    }
}

/// A session user with staff rights.
#[derive(Debug, Clone)]
pub struct StaffUser(pub User);

impl FromRequestParts<AppState> for StaffUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let SessionUser(user) = SessionUser::from_request_parts(parts, state).await?;
        if !user.is_staff {
            return Err(ApiError::forbidden());
        }
        Ok(Self(user))
    }
}
