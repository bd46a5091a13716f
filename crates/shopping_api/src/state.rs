//! Shared router state: one SQLite connection behind a mutex plus config.
//!
//! # Invariants
//! - Blocking SQLite work only runs on tokio's blocking pool via [`AppState::run`].
//! - A poisoned connection lock answers 500 instead of panicking the handler.

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    pub fn new(conn: Connection, config: ApiConfig) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            config: Arc::new(config),
        }
    }

    /// Runs `work` against the connection on the blocking pool.
    pub async fn run<T, E, F>(&self, work: F) -> ApiResult<T>
    where
        T: Send + 'static,
        E: Into<ApiError> + Send + 'static,
        F: FnOnce(&Connection) -> Result<T, E> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        let joined = tokio::task::spawn_blocking(move || -> ApiResult<T> {
            let conn = db
                .lock()
                .map_err(|_| ApiError::internal("database lock poisoned"))?;
            work(&conn).map_err(Into::into)
        })
        .await;

        match joined {
            Ok(result) => result,
            Err(err) => Err(ApiError::internal(err)),
        }
    }
}
