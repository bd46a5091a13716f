//! Outgoing response bodies and their conversions from domain records.

use crate::model::clock::ms_to_datetime;
use crate::model::item::{Item, ItemPriceStats};
use crate::model::money::{cents_to_decimal, cents_to_f64, round2};
use crate::model::page::PageWindow;
use crate::model::shopping_list::{ListEntry, ShoppingList};
use crate::model::store::{Store, StoreCounts};
use crate::model::user::{ApiClient, User};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSchema {
    pub username: String,
}

/// `{message, detail}` acknowledgement used by auth and delete endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageSchema {
    pub message: String,
    pub detail: String,
}

impl MessageSchema {
    pub fn new(message: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenSchema {
    pub token: String,
}

/// Page position shared by every paginated response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub total: i64,
    pub page_number: i64,
    pub total_pages: i64,
    pub has_previous: bool,
    pub previous_page: Option<i64>,
    pub has_next: bool,
    pub next_page: Option<i64>,
}

impl From<PageWindow> for Pagination {
    fn from(window: PageWindow) -> Self {
        Self {
            total: window.total,
            page_number: window.page_number,
            total_pages: window.total_pages,
            has_previous: window.has_previous(),
            previous_page: window.previous_page(),
            has_next: window.has_next(),
            next_page: window.next_page(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreSchemaNoUser {
    pub id: i64,
    pub name: String,
    pub store_type: i64,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Store> for StoreSchemaNoUser {
    fn from(store: &Store) -> Self {
        Self {
            id: store.id,
            name: store.name.clone(),
            store_type: store.store_type.value(),
            description: store.description.clone(),
            created_at: ms_to_datetime(store.created_at),
            updated_at: ms_to_datetime(store.updated_at),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreSchema {
    #[serde(flatten)]
    pub store: StoreSchemaNoUser,
    pub user: Option<UserSchema>,
}

impl From<&Store> for StoreSchema {
    fn from(store: &Store) -> Self {
        Self {
            store: StoreSchemaNoUser::from(store),
            user: Some(UserSchema {
                username: store.owner_username.clone(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorePage {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub stores: Vec<StoreSchema>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreAggregation {
    pub total_stores: i64,
    pub online_stores: i64,
    pub in_store_stores: i64,
    pub combined_stores: i64,
    pub combined_online_stores: i64,
    pub combined_in_store_stores: i64,
}

impl From<StoreCounts> for StoreAggregation {
    fn from(counts: StoreCounts) -> Self {
        Self {
            total_stores: counts.total,
            online_stores: counts.online,
            in_store_stores: counts.in_store,
            combined_stores: counts.both,
            combined_online_stores: counts.online + counts.both,
            combined_in_store_stores: counts.in_store + counts.both,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemSchema {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user: Option<UserSchema>,
    pub store: Option<StoreSchemaNoUser>,
    /// Only present on detail responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_count: Option<i64>,
}

impl From<&Item> for ItemSchema {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            description: item.description.clone(),
            price: cents_to_decimal(item.price_cents),
            created_at: ms_to_datetime(item.created_at),
            updated_at: ms_to_datetime(item.updated_at),
            user: Some(UserSchema {
                username: item.owner_username.clone(),
            }),
            store: Some(StoreSchemaNoUser::from(&item.store)),
            list_count: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemPage {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub items: Vec<ItemSchema>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ItemAggregation {
    pub total_items: Option<i64>,
    pub total_price: Option<f64>,
    pub average_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_price: Option<f64>,
}

impl From<ItemPriceStats> for ItemAggregation {
    fn from(stats: ItemPriceStats) -> Self {
        Self {
            total_items: Some(stats.count),
            total_price: stats.total_cents.map(cents_to_f64),
            average_price: stats.average_cents.map(|cents| round2(cents / 100.0)),
            max_price: stats.max_cents.map(cents_to_f64),
            min_price: stats.min_cents.map(cents_to_f64),
        }
    }
}

/// A store together with one page of its items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreDetailWithItems {
    pub store: StoreSchema,
    pub items: ItemPage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShoppingListSchema {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_current: bool,
}

impl ShoppingListSchema {
    pub fn from_list(list: &ShoppingList, today: NaiveDate) -> Self {
        Self {
            id: list.id,
            name: list.name.clone(),
            description: list.description.clone(),
            start_date: list.start_date,
            end_date: list.end_date,
            created_at: ms_to_datetime(list.created_at),
            updated_at: ms_to_datetime(list.updated_at),
            is_current: list.is_current(today),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShoppingListPage {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub lists: Vec<ShoppingListSchema>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListEntrySchema {
    pub item_id: i64,
    pub item_name: String,
    pub store_name: String,
    pub price: Decimal,
    pub quantity: i64,
    pub line_total: Decimal,
}

impl From<&ListEntry> for ListEntrySchema {
    fn from(entry: &ListEntry) -> Self {
        Self {
            item_id: entry.item_id,
            item_name: entry.item_name.clone(),
            store_name: entry.store_name.clone(),
            price: cents_to_decimal(entry.price_cents),
            quantity: entry.quantity,
            line_total: cents_to_decimal(entry.line_total_cents()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShoppingListDetail {
    #[serde(flatten)]
    pub list: ShoppingListSchema,
    pub entries: Vec<ListEntrySchema>,
    pub total_items: i64,
    pub total_price: Decimal,
    pub budget: Decimal,
    pub budget_remaining: Decimal,
}

/// Figures for the list that is current today; all `None` without one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DashboardCurrentSchema {
    pub total: Option<i64>,
    pub total_price: Option<f64>,
    pub budget_remaining: Option<f64>,
    pub average_item_price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardRecentSchema {
    pub recent_items: Vec<ItemSchema>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChartDataset {
    pub label: String,
    pub data: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardHistorySchema {
    pub labels: Vec<String>,
    pub datasets: Vec<BarChartDataset>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminUserSchema {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub date_joined: DateTime<Utc>,
}

impl From<&User> for AdminUserSchema {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_active: user.is_active,
            is_staff: user.is_staff,
            date_joined: ms_to_datetime(user.date_joined),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminClientSchema {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub is_active: bool,
}

impl AdminClientSchema {
    pub fn new(client: &ApiClient, username: String) -> Self {
        Self {
            id: client.id,
            name: client.name.clone(),
            username,
            is_active: client.is_active,
        }
    }
}
