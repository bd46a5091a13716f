//! Shopping item model.
//!
//! # Invariants
//! - `(name, store_id)` is unique.
//! - `price_cents` is in `0..MAX_CENTS_EXCLUSIVE`.

use super::money::validate_cents;
use super::store::{Store, StoreId};
use super::user::UserId;
use super::validation::{require_text, ValidationError};

pub type ItemId = i64;

pub const ITEM_NAME_MAX_CHARS: usize = 100;

/// Persisted item joined with its store and its owner's username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub created_at: i64,
    pub updated_at: i64,
    pub user_id: UserId,
    pub owner_username: String,
    pub store: Store,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub store_id: StoreId,
    pub user_id: UserId,
}

impl NewItem {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_item_name(&self.name)?;
        validate_price_cents(self.price_cents)
    }
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub store_id: Option<StoreId>,
}

impl ItemPatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = self.name.as_deref() {
            validate_item_name(name)?;
        }
        if let Some(price_cents) = self.price_cents {
            validate_price_cents(price_cents)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price_cents.is_none()
            && self.store_id.is_none()
    }
}

pub fn validate_item_name(name: &str) -> Result<(), ValidationError> {
    require_text("name", name, ITEM_NAME_MAX_CHARS)
}

fn validate_price_cents(price_cents: i64) -> Result<(), ValidationError> {
    validate_cents("price", price_cents)
}

/// Price statistics over a set of items, in cents.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ItemPriceStats {
    pub count: i64,
    pub total_cents: Option<i64>,
    pub average_cents: Option<f64>,
    pub max_cents: Option<i64>,
    pub min_cents: Option<i64>,
}
