//! Shopping item repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - CRUD over `items`, joined with the item's store and both owners.
//! - Search filters, price statistics and recency queries.
//!
//! # Invariants
//! - Listing order is `updated_at DESC, id DESC`.
//! - Item `after`/`before` date filters are strict; `on` matches the UTC day.
//! - `(name, store_id)` uniqueness is checked by the caller and backed by an index.

use super::sql::{exists, fetch_all, fetch_page, SqlFilter};
use super::store_repo::parse_store_row;
use super::{RepoError, RepoResult};
use crate::model::clock::now_ms;
use crate::model::item::{Item, ItemId, ItemPatch, ItemPriceStats, NewItem};
use crate::model::page::{PageRequest, PageWindow};
use crate::model::store::StoreId;
use crate::model::user::UserId;
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const ITEM_SELECT_SQL: &str = "SELECT
    i.id AS item_id,
    i.name AS item_name,
    i.description AS item_description,
    i.price_cents,
    i.created_at AS item_created_at,
    i.updated_at AS item_updated_at,
    i.user_id AS item_user_id,
    iu.username AS item_owner_username,
    s.id,
    s.name,
    s.store_type,
    s.description,
    s.created_at,
    s.updated_at,
    s.user_id,
    su.username AS owner_username";

const ITEM_FROM_SQL: &str = "FROM items i
    INNER JOIN users iu ON iu.id = i.user_id
    INNER JOIN stores s ON s.id = i.store_id
    INNER JOIN users su ON su.id = s.user_id";

const ITEM_ORDER_SQL: &str = "i.updated_at DESC, i.id DESC";

/// Filter options for item listing and search; unset fields do not constrain.
///
/// Price bounds are in cents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    pub name: Option<String>,
    pub store_id: Option<StoreId>,
    pub user_id: Option<UserId>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub price_gt_cents: Option<i64>,
    pub price_lt_cents: Option<i64>,
    pub created_on: Option<NaiveDate>,
    pub created_after: Option<NaiveDate>,
    pub created_before: Option<NaiveDate>,
    pub updated_on: Option<NaiveDate>,
    pub updated_after: Option<NaiveDate>,
    pub updated_before: Option<NaiveDate>,
    pub ids: Vec<ItemId>,
}

pub trait ItemRepository {
    fn create_item(&self, item: &NewItem) -> RepoResult<Item>;
    fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>>;
    fn get_item_for_user(&self, id: ItemId, user_id: UserId) -> RepoResult<Option<Item>>;
    /// Whether `name` is taken in `store_id`, ignoring `exclude_id` when given.
    fn item_exists(
        &self,
        name: &str,
        store_id: StoreId,
        exclude_id: Option<ItemId>,
    ) -> RepoResult<bool>;
    fn update_item(&self, id: ItemId, user_id: UserId, patch: &ItemPatch) -> RepoResult<Item>;
    fn delete_item(&self, id: ItemId, user_id: UserId) -> RepoResult<()>;
    fn force_delete_item(&self, id: ItemId) -> RepoResult<()>;
    fn filter_items(
        &self,
        filter: &ItemFilter,
        page: PageRequest,
    ) -> RepoResult<(PageWindow, Vec<Item>)>;
    fn price_stats(&self, user_id: Option<UserId>) -> RepoResult<ItemPriceStats>;
    /// Most recently updated items of `user_id`, newest first.
    fn recent_items(&self, user_id: UserId, limit: u32) -> RepoResult<Vec<Item>>;
}

pub struct SqliteItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteItemRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_one(&self, where_sql: &str, binds: &[Value]) -> RepoResult<Option<Item>> {
        self.conn
            .query_row(
                &format!("{ITEM_SELECT_SQL} {ITEM_FROM_SQL} WHERE {where_sql};"),
                params_from_iter(binds),
                |row| Ok(parse_item_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn require_item(&self, id: ItemId) -> RepoResult<Item> {
        self.get_item(id)?
            .ok_or(RepoError::NotFound { entity: "item", id })
    }
}

impl ItemRepository for SqliteItemRepository<'_> {
    fn create_item(&self, item: &NewItem) -> RepoResult<Item> {
        item.validate()?;

        let now = now_ms();
        self.conn.execute(
            "INSERT INTO items (
                name,
                description,
                price_cents,
                created_at,
                updated_at,
                store_id,
                user_id
            ) VALUES (?1, ?2, ?3, ?4, ?4, ?5, ?6);",
            params![
                item.name.as_str(),
                item.description.as_str(),
                item.price_cents,
                now,
                item.store_id,
                item.user_id,
            ],
        )?;

        self.require_item(self.conn.last_insert_rowid())
    }

    fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>> {
        self.query_one("i.id = ?", &[Value::Integer(id)])
    }

    fn get_item_for_user(&self, id: ItemId, user_id: UserId) -> RepoResult<Option<Item>> {
        self.query_one(
            "i.id = ? AND i.user_id = ?",
            &[Value::Integer(id), Value::Integer(user_id)],
        )
    }

    fn item_exists(
        &self,
        name: &str,
        store_id: StoreId,
        exclude_id: Option<ItemId>,
    ) -> RepoResult<bool> {
        exists(
            self.conn,
            "SELECT EXISTS(
                SELECT 1 FROM items
                WHERE name = ?1
                  AND store_id = ?2
                  AND (?3 IS NULL OR id <> ?3)
             );",
            &[
                Value::Text(name.to_string()),
                Value::Integer(store_id),
                exclude_id.map_or(Value::Null, Value::Integer),
            ],
        )
    }

    fn update_item(&self, id: ItemId, user_id: UserId, patch: &ItemPatch) -> RepoResult<Item> {
        patch.validate()?;

        let changed = self.conn.execute(
            "UPDATE items
             SET
                name = COALESCE(?3, name),
                description = COALESCE(?4, description),
                price_cents = COALESCE(?5, price_cents),
                store_id = COALESCE(?6, store_id),
                updated_at = MAX(?7, updated_at + 1)
             WHERE id = ?1
               AND user_id = ?2;",
            params![
                id,
                user_id,
                patch.name.as_deref(),
                patch.description.as_deref(),
                patch.price_cents,
                patch.store_id,
                now_ms(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound { entity: "item", id });
        }
        self.require_item(id)
    }

    fn delete_item(&self, id: ItemId, user_id: UserId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM items WHERE id = ?1 AND user_id = ?2;",
            params![id, user_id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "item", id });
        }
        Ok(())
    }

    fn force_delete_item(&self, id: ItemId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM items WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "item", id });
        }
        Ok(())
    }

    fn filter_items(
        &self,
        filter: &ItemFilter,
        page: PageRequest,
    ) -> RepoResult<(PageWindow, Vec<Item>)> {
        let mut sql_filter = SqlFilter::new();

        if let Some(name) = filter.name.as_deref().filter(|name| !name.is_empty()) {
            sql_filter.push_contains("i.name", name);
        }
        if let Some(store_id) = filter.store_id {
            sql_filter.push("i.store_id = ?", store_id);
        }
        if let Some(user_id) = filter.user_id {
            sql_filter.push("i.user_id = ?", user_id);
        }
        if let Some(description) = filter
            .description
            .as_deref()
            .filter(|description| !description.is_empty())
        {
            sql_filter.push_contains("i.description", description);
        }
        if let Some(price_cents) = filter.price_cents {
            sql_filter.push("i.price_cents = ?", price_cents);
        }
        if let Some(price_cents) = filter.price_gt_cents {
            sql_filter.push("i.price_cents > ?", price_cents);
        }
        if let Some(price_cents) = filter.price_lt_cents {
            sql_filter.push("i.price_cents < ?", price_cents);
        }
        if let Some(date) = filter.created_on {
            sql_filter.date_on("i.created_at", date);
        }
        if let Some(date) = filter.created_after {
            sql_filter.date_after("i.created_at", date);
        }
        if let Some(date) = filter.created_before {
            sql_filter.date_before("i.created_at", date);
        }
        if let Some(date) = filter.updated_on {
            sql_filter.date_on("i.updated_at", date);
        }
        if let Some(date) = filter.updated_after {
            sql_filter.date_after("i.updated_at", date);
        }
        if let Some(date) = filter.updated_before {
            sql_filter.date_before("i.updated_at", date);
        }
        sql_filter.push_in("i.id", &filter.ids);

        fetch_page(
            self.conn,
            ITEM_SELECT_SQL,
            ITEM_FROM_SQL,
            &sql_filter,
            ITEM_ORDER_SQL,
            page,
            parse_item_row,
        )
    }

    fn price_stats(&self, user_id: Option<UserId>) -> RepoResult<ItemPriceStats> {
        let stats = self.conn.query_row(
            "SELECT
                COUNT(*),
                SUM(price_cents),
                AVG(price_cents),
                MAX(price_cents),
                MIN(price_cents)
             FROM items
             WHERE (?1 IS NULL OR user_id = ?1);",
            [user_id],
            |row| {
                Ok(ItemPriceStats {
                    count: row.get(0)?,
                    total_cents: row.get(1)?,
                    average_cents: row.get(2)?,
                    max_cents: row.get(3)?,
                    min_cents: row.get(4)?,
                })
            },
        )?;
        Ok(stats)
    }

    fn recent_items(&self, user_id: UserId, limit: u32) -> RepoResult<Vec<Item>> {
        fetch_all(
            self.conn,
            &format!(
                "{ITEM_SELECT_SQL} {ITEM_FROM_SQL}
                 WHERE i.user_id = ?
                 ORDER BY {ITEM_ORDER_SQL}
                 LIMIT ?;"
            ),
            &[Value::Integer(user_id), Value::Integer(i64::from(limit))],
            parse_item_row,
        )
    }
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<Item> {
    Ok(Item {
        id: row.get("item_id")?,
        name: row.get("item_name")?,
        description: row.get("item_description")?,
        price_cents: row.get("price_cents")?,
        created_at: row.get("item_created_at")?,
        updated_at: row.get("item_updated_at")?,
        user_id: row.get("item_user_id")?,
        owner_username: row.get("item_owner_username")?,
        store: parse_store_row(row)?,
    })
}
