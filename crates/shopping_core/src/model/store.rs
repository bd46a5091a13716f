//! Shopping store model and store-type mapping.
//!
//! # Invariants
//! - `name` is globally unique, 1..=100 characters.
//! - `store_type` is one of the three known kinds.

use super::user::UserId;
use super::validation::{require_text, ValidationError};
use std::collections::BTreeMap;

pub type StoreId = i64;

pub const STORE_NAME_MAX_CHARS: usize = 100;

/// Where a store sells: online, physically, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StoreType {
    Online,
    InStore,
    Both,
}

impl StoreType {
    pub const ALL: [StoreType; 3] = [StoreType::Online, StoreType::InStore, StoreType::Both];

    pub fn value(self) -> i64 {
        match self {
            Self::Online => 1,
            Self::InStore => 2,
            Self::Both => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Online => "Online",
            Self::InStore => "In-Store",
            Self::Both => "Both",
        }
    }

    pub fn from_value(value: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.value() == value)
    }

    /// Exact, case-sensitive label match.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.label() == label)
    }

    /// Value to label mapping as exposed by the API.
    pub fn mapping() -> BTreeMap<i64, &'static str> {
        Self::ALL
            .into_iter()
            .map(|kind| (kind.value(), kind.label()))
            .collect()
    }
}

/// Persisted store joined with its owner's username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    pub store_type: StoreType,
    pub description: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub user_id: UserId,
    pub owner_username: String,
}

/// Insert payload for a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStore {
    pub name: String,
    pub store_type: StoreType,
    pub description: String,
    pub user_id: UserId,
}

impl NewStore {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_store_name(&self.name)
    }
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorePatch {
    pub name: Option<String>,
    pub store_type: Option<StoreType>,
    pub description: Option<String>,
}

impl StorePatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.name.as_deref() {
            Some(name) => validate_store_name(name),
            None => Ok(()),
        }
    }
}

pub fn validate_store_name(name: &str) -> Result<(), ValidationError> {
    require_text("name", name, STORE_NAME_MAX_CHARS)
}

/// Store counts broken down by type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCounts {
    pub total: i64,
    pub online: i64,
    pub in_store: i64,
    pub both: i64,
}
