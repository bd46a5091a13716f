//! Domain model for stores, items, shopping lists and their owners.
//!
//! # Responsibility
//! - Define canonical records mirrored by the SQLite tables.
//! - Own field-level validation so repositories never persist invalid rows.
//!
//! # Invariants
//! - Every record is identified by a stable integer row id.
//! - Money is carried as integer cents; `Decimal` only at the edges.
//! - Timestamps are UTC epoch milliseconds.

pub mod clock;
pub mod item;
pub mod money;
pub mod page;
pub mod shopping_list;
pub mod store;
pub mod user;
pub mod validation;
