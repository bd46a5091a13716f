//! Core domain logic for the shopping app: stores, items, shopping lists,
//! budgets, accounts and API clients.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod password;
pub mod repo;
pub mod schema;
pub mod seed;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, LogSettings, LoggingError};
pub use model::page::PageRequest;
pub use model::store::StoreType;
pub use model::user::User;
pub use repo::{RepoError, RepoResult};

