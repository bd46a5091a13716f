//! Incoming request bodies.
//!
//! Missing text fields deserialize as empty strings so services can report
//! the domain message instead of a generic decode failure.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserCredentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUserInput {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirmation: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
}

/// Store type as sent by clients: the numeric value or the display label.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum StoreTypeInput {
    Value(i64),
    Label(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewStoreInput {
    pub name: String,
    pub store_type: StoreTypeInput,
    #[serde(default)]
    pub description: String,
}

/// Optional body of the store update endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreDescription {
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreSearch {
    pub ids: Option<Vec<i64>>,
    pub store_types: Option<Vec<i64>>,
    pub created_on: Option<NaiveDate>,
    pub created_before: Option<NaiveDate>,
    pub created_after: Option<NaiveDate>,
    pub updated_on: Option<NaiveDate>,
    pub updated_before: Option<NaiveDate>,
    pub updated_after: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewItemInput {
    pub store_id: i64,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateItem {
    pub store_id: Option<i64>,
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ItemSearch {
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub price_is_gt: Option<Decimal>,
    pub price_is_lt: Option<Decimal>,
    pub created_on: Option<NaiveDate>,
    pub created_after: Option<NaiveDate>,
    pub created_before: Option<NaiveDate>,
    pub updated_on: Option<NaiveDate>,
    pub updated_after: Option<NaiveDate>,
    pub updated_before: Option<NaiveDate>,
    pub ids: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewShoppingListInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ItemQuantityInput {
    pub item_id: i64,
    pub quantity: i64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BudgetInput {
    pub amount: Decimal,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct UserActiveInput {
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::{ItemSearch, NewStoreInput, NewUserInput, StoreSearch, StoreTypeInput};
    use chrono::NaiveDate;

    #[test]
    fn store_type_accepts_value_or_label() {
        let by_value: NewStoreInput =
            serde_json::from_str(r#"{"name":"A","store_type":2,"description":""}"#).unwrap();
        assert_eq!(by_value.store_type, StoreTypeInput::Value(2));

        let by_label: NewStoreInput =
            serde_json::from_str(r#"{"name":"A","store_type":"Both"}"#).unwrap();
        assert_eq!(by_label.store_type, StoreTypeInput::Label("Both".to_string()));
        assert_eq!(by_label.description, "");
    }

    #[test]
    fn missing_registration_fields_become_empty() {
        let input: NewUserInput = serde_json::from_str(r#"{"username":"bob"}"#).unwrap();
        assert_eq!(input.username, "bob");
        assert!(input.email.is_empty());
        assert!(input.password_confirmation.is_empty());
    }

    #[test]
    fn search_bodies_default_every_field() {
        let stores: StoreSearch = serde_json::from_str("{}").unwrap();
        assert_eq!(stores, StoreSearch::default());

        let items: ItemSearch =
            serde_json::from_str(r#"{"created_on":"2024-05-01","price_is_gt":"1.50"}"#).unwrap();
        assert_eq!(items.created_on, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(items.price_is_gt.map(|price| price.to_string()), Some("1.50".to_string()));
    }
}
