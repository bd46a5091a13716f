//! Shopping lists, their item quantities and budgets.
//!
//! # Invariants
//! - `end_date >= start_date`.
//! - A list holds each item at most once, with `1 <= quantity <= i32::MAX`.
//! - A list has at most one budget.
//! - Quantity writes keep the list total within `i64` cents.

use super::clock::format_date;
use super::item::ItemId;
use super::user::UserId;
use super::validation::{require_text, ValidationError};
use chrono::NaiveDate;

pub type ListId = i64;

pub const LIST_NAME_MAX_CHARS: usize = 100;
pub const MAX_QUANTITY: i64 = i32::MAX as i64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingList {
    pub id: ListId,
    pub name: String,
    pub description: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub user_id: UserId,
}

impl ShoppingList {
    /// Whether `today` falls inside the list's inclusive date range.
    pub fn is_current(&self, today: NaiveDate) -> bool {
        self.start_date <= today && today <= self.end_date
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShoppingList {
    pub name: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub user_id: UserId,
}

impl NewShoppingList {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name, LIST_NAME_MAX_CHARS)?;
        if self.end_date < self.start_date {
            return Err(ValidationError::InvalidDateRange {
                start: format_date(self.start_date),
                end: format_date(self.end_date),
            });
        }
        Ok(())
    }
}

/// One item line on a list, joined with the item's price and store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub item_id: ItemId,
    pub item_name: String,
    pub store_name: String,
    pub price_cents: i64,
    pub quantity: i64,
}

impl ListEntry {
    /// `price * quantity`, saturating at `i64::MAX`.
    pub fn line_total_cents(&self) -> i64 {
        self.price_cents.saturating_mul(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Budget {
    pub id: i64,
    pub amount_cents: i64,
    pub list_id: ListId,
    pub user_id: UserId,
}

pub fn validate_quantity(quantity: i64) -> Result<(), ValidationError> {
    if !(1..=MAX_QUANTITY).contains(&quantity) {
        return Err(ValidationError::InvalidQuantity(quantity));
    }
    Ok(())
}

/// Sums `(price_cents, quantity)` lines without overflowing.
pub fn sum_line_totals(lines: impl IntoIterator<Item = (i64, i64)>) -> i128 {
    lines
        .into_iter()
        .map(|(price_cents, quantity)| i128::from(price_cents) * i128::from(quantity))
        .sum()
}

/// Narrows a list total to stored cents, rejecting totals beyond `i64`.
pub fn checked_total_cents(total: i128) -> Result<i64, ValidationError> {
    i64::try_from(total).map_err(|_| ValidationError::TotalTooLarge)
}

/// Budget left after spending: zero when no budget is set or it is exhausted.
pub fn budget_remaining_cents(budget_cents: i64, spent_cents: i64) -> i64 {
    if budget_cents <= 0 {
        return 0;
    }
    (budget_cents - spent_cents).max(0)
}

#[cfg(test)]
mod tests {
    use super::{
        budget_remaining_cents, checked_total_cents, sum_line_totals, validate_quantity, ListEntry,
        NewShoppingList, ShoppingList, MAX_QUANTITY,
    };
    use crate::model::validation::ValidationError;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn current_range_is_inclusive() {
        let list = ShoppingList {
            id: 1,
            name: "weekly".to_string(),
            description: String::new(),
            created_at: 0,
            updated_at: 0,
            start_date: date(2024, 3, 1),
            end_date: date(2024, 3, 7),
            user_id: 1,
        };
        assert!(list.is_current(date(2024, 3, 1)));
        assert!(list.is_current(date(2024, 3, 7)));
        assert!(!list.is_current(date(2024, 3, 8)));
    }

    #[test]
    fn reversed_dates_are_rejected() {
        let list = NewShoppingList {
            name: "weekly".to_string(),
            description: String::new(),
            start_date: date(2024, 3, 7),
            end_date: date(2024, 3, 1),
            user_id: 1,
        };
        assert!(matches!(
            list.validate(),
            Err(ValidationError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn remaining_budget_never_goes_negative() {
        assert_eq!(budget_remaining_cents(0, 500), 0);
        assert_eq!(budget_remaining_cents(1_000, 400), 600);
        assert_eq!(budget_remaining_cents(1_000, 4_000), 0);
    }

    #[test]
    fn quantity_must_be_positive() {
        assert_eq!(validate_quantity(0), Err(ValidationError::InvalidQuantity(0)));
        assert!(validate_quantity(3).is_ok());
        assert!(validate_quantity(MAX_QUANTITY).is_ok());
        assert_eq!(
            validate_quantity(MAX_QUANTITY + 1),
            Err(ValidationError::InvalidQuantity(MAX_QUANTITY + 1))
        );
    }

    #[test]
    fn totals_beyond_i64_are_rejected_instead_of_wrapping() {
        let max_price = 9_999_999_999;
        let total = sum_line_totals([(max_price, MAX_QUANTITY), (max_price, MAX_QUANTITY)]);
        assert!(total > i128::from(i64::MAX));
        assert_eq!(checked_total_cents(total), Err(ValidationError::TotalTooLarge));
        assert_eq!(checked_total_cents(sum_line_totals([(250, 4), (199, 1)])), Ok(1_199));

        let entry = ListEntry {
            item_id: 1,
            item_name: "Gold".to_string(),
            store_name: "Vault".to_string(),
            price_cents: i64::MAX,
            quantity: 2,
        };
        assert_eq!(entry.line_total_cents(), i64::MAX);
    }
}
