//! Maps service failures onto HTTP responses.
//!
//! # Invariants
//! - Every error body is `{"detail": "<message>"}`.
//! - Storage failures never leak their message; they answer 500 and are logged.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use serde_json::json;
use shopping_core::repo::RepoError;
use shopping_core::service::admin_service::AdminServiceError;
use shopping_core::service::auth_service::AuthServiceError;
use shopping_core::service::client_service::ClientServiceError;
use shopping_core::service::item_service::ItemServiceError;
use shopping_core::service::list_service::ListServiceError;
use shopping_core::service::store_service::StoreServiceError;
use std::fmt::{Display, Formatter};

pub type ApiResult<T> = Result<T, ApiError>;

const INTERNAL_DETAIL: &str = "Internal server error.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, detail)
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized")
    }

    pub fn forbidden() -> Self {
        Self::new(StatusCode::FORBIDDEN, "Forbidden")
    }

    /// Logs `cause` and hides it behind the generic 500 body.
    pub fn internal(cause: impl Display) -> Self {
        error!("event=http_error module=api status=error error_code=internal error={cause}");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_DETAIL)
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.status.as_u16(), self.detail)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::bad_request(err.to_string()),
            RepoError::NotFound { .. } => Self::not_found(value.to_string()),
            err if err.is_constraint_violation() => Self::bad_request(err.to_string()),
            err => Self::internal(err),
        }
    }
}

impl From<AuthServiceError> for ApiError {
    fn from(value: AuthServiceError) -> Self {
        match value {
            AuthServiceError::Unauthorized => Self::unauthorized(),
            AuthServiceError::Repo(err) => err.into(),
            other => Self::bad_request(other.to_string()),
        }
    }
}

impl From<ClientServiceError> for ApiError {
    fn from(value: ClientServiceError) -> Self {
        match value {
            ClientServiceError::AlreadyRegistered => Self::bad_request(value.to_string()),
            ClientServiceError::ClientNotFound => Self::not_found(value.to_string()),
            ClientServiceError::Repo(err) => err.into(),
        }
    }
}

impl From<StoreServiceError> for ApiError {
    fn from(value: StoreServiceError) -> Self {
        match value {
            StoreServiceError::StoreNotFound(_) => Self::not_found(value.to_string()),
            StoreServiceError::Repo(err) => err.into(),
            other => Self::bad_request(other.to_string()),
        }
    }
}

impl From<ItemServiceError> for ApiError {
    fn from(value: ItemServiceError) -> Self {
        match value {
            ItemServiceError::ItemNotFound(_) | ItemServiceError::StoreNotFound(_) => {
                Self::not_found(value.to_string())
            }
            ItemServiceError::Repo(err) => err.into(),
            other => Self::bad_request(other.to_string()),
        }
    }
}

impl From<ListServiceError> for ApiError {
    fn from(value: ListServiceError) -> Self {
        match value {
            ListServiceError::ListNotFound(_)
            | ListServiceError::ItemNotFound(_)
            | ListServiceError::ItemNotOnList { .. } => Self::not_found(value.to_string()),
            ListServiceError::Validation(err) => Self::bad_request(err.to_string()),
            ListServiceError::Repo(err) => err.into(),
        }
    }
}

impl From<AdminServiceError> for ApiError {
    fn from(value: AdminServiceError) -> Self {
        match value {
            AdminServiceError::UserNotFound(_) => Self::not_found(value.to_string()),
            AdminServiceError::Repo(err) => err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ApiError;
    use axum::http::StatusCode;
    use shopping_core::service::item_service::ItemServiceError;
    use shopping_core::service::store_service::StoreServiceError;

    #[test]
    fn not_found_errors_keep_their_message() {
        let err = ApiError::from(StoreServiceError::StoreNotFound(7));
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.detail, "Store with id '7' does not exist.");
    }

    #[test]
    fn clashes_are_bad_requests() {
        let err = ApiError::from(ItemServiceError::ItemExists {
            name: "Milk".to_string(),
            store: "Corner".to_string(),
        });
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.detail, "Item ('Milk') already exists @ 'Corner'.");
    }

    #[test]
    fn internal_errors_hide_their_cause() {
        let err = ApiError::internal("disk on fire");
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.detail, "Internal server error.");
    }
}
