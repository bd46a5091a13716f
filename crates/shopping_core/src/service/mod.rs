//! Use-case services over the repository layer.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Shape domain records into `schema::output` responses.
//! - Carry user-facing failure messages in per-service error enums.

pub mod admin_service;
pub mod auth_service;
pub mod client_service;
pub mod dashboard_service;
pub mod item_service;
pub mod list_service;
pub mod store_service;
