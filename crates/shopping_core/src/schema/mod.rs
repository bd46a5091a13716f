//! Request and response shapes exchanged with HTTP clients.
//!
//! # Responsibility
//! - `input`: deserializable request bodies and search filters.
//! - `output`: serializable views of domain records.
//!
//! # Invariants
//! - Output schemas never expose password hashes or client secrets.
//! - Money leaves the crate as 2-place decimals; aggregates as floats.

pub mod input;
pub mod output;
