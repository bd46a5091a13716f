//! Shopping list repository: lists and their item quantities.
//!
//! # Responsibility
//! - CRUD over `shopping_lists`, scoped to the owning user.
//! - Quantity upserts and the totals derived from them.
//!
//! # Invariants
//! - Dates are stored as `YYYY-MM-DD` text, so text comparison is date order.
//! - Every quantity change bumps the parent list's `updated_at`.

use super::sql::{fetch_all, fetch_page, SqlFilter};
use super::{RepoError, RepoResult};
use crate::model::clock::{day_start_ms, format_date, now_ms, parse_date};
use crate::model::item::ItemId;
use crate::model::page::{PageRequest, PageWindow};
use crate::model::shopping_list::{
    checked_total_cents, sum_line_totals, validate_quantity, ListEntry, ListId, NewShoppingList,
    ShoppingList,
};
use crate::model::user::UserId;
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension, Row};

const LIST_SELECT_SQL: &str = "SELECT
    l.id,
    l.name,
    l.description,
    l.created_at,
    l.updated_at,
    l.start_date,
    l.end_date,
    l.user_id";

const LIST_FROM_SQL: &str = "FROM shopping_lists l";

pub trait ShoppingListRepository {
    fn create_list(&self, list: &NewShoppingList) -> RepoResult<ShoppingList>;
    fn get_list(&self, id: ListId) -> RepoResult<Option<ShoppingList>>;
    fn get_list_for_user(&self, id: ListId, user_id: UserId) -> RepoResult<Option<ShoppingList>>;
    fn lists_for_user(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> RepoResult<(PageWindow, Vec<ShoppingList>)>;
    fn delete_list(&self, id: ListId, user_id: UserId) -> RepoResult<()>;
    /// The lowest-id list of `user_id` whose date range contains `today`.
    fn get_current(&self, user_id: UserId, today: NaiveDate) -> RepoResult<Option<ShoppingList>>;
    /// Sum of quantities on the list.
    fn number_of_items(&self, list_id: ListId) -> RepoResult<i64>;
    /// Sum of `price * quantity` on the list, in cents, saturating at `i64::MAX`.
    fn total_price_cents(&self, list_id: ListId) -> RepoResult<i64>;
    /// Inserts or replaces the quantity of `item_id` on the list.
    ///
    /// Nothing is written when the resulting list total would not fit in `i64` cents.
    fn set_item_quantity(&self, list_id: ListId, item_id: ItemId, quantity: i64) -> RepoResult<()>;
    /// Returns whether the item was on the list.
    fn remove_item(&self, list_id: ListId, item_id: ItemId) -> RepoResult<bool>;
    fn entries(&self, list_id: ListId) -> RepoResult<Vec<ListEntry>>;
    fn count_lists_linked_to_item(&self, item_id: ItemId) -> RepoResult<i64>;
    fn lists_created_in_year(&self, user_id: UserId, year: i32) -> RepoResult<Vec<ShoppingList>>;
}

pub struct SqliteShoppingListRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteShoppingListRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// `(price_cents, quantity)` of every line, optionally skipping one item.
    fn line_amounts(
        &self,
        list_id: ListId,
        except_item: Option<ItemId>,
    ) -> RepoResult<Vec<(i64, i64)>> {
        fetch_all(
            self.conn,
            "SELECT i.price_cents, q.quantity
             FROM shopping_item_quantities q
             INNER JOIN items i ON i.id = q.item_id
             WHERE q.list_id = ?1
               AND (?2 IS NULL OR q.item_id <> ?2);",
            &[
                Value::Integer(list_id),
                except_item.map_or(Value::Null, Value::Integer),
            ],
            |row| Ok((row.get("price_cents")?, row.get("quantity")?)),
        )
    }

    fn touch_list(&self, list_id: ListId) -> RepoResult<()> {
        self.conn.execute(
            "UPDATE shopping_lists SET updated_at = MAX(?2, updated_at + 1) WHERE id = ?1;",
            params![list_id, now_ms()],
        )?;
        Ok(())
    }
}

impl ShoppingListRepository for SqliteShoppingListRepository<'_> {
    fn create_list(&self, list: &NewShoppingList) -> RepoResult<ShoppingList> {
        list.validate()?;

        let now = now_ms();
        self.conn.execute(
            "INSERT INTO shopping_lists (
                name,
                description,
                created_at,
                updated_at,
                start_date,
                end_date,
                user_id
            ) VALUES (?1, ?2, ?3, ?3, ?4, ?5, ?6);",
            params![
                list.name.as_str(),
                list.description.as_str(),
                now,
                format_date(list.start_date),
                format_date(list.end_date),
                list.user_id,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        self.get_list(id)?
            .ok_or(RepoError::NotFound { entity: "shopping list", id })
    }

    fn get_list(&self, id: ListId) -> RepoResult<Option<ShoppingList>> {
        self.conn
            .query_row(
                &format!("{LIST_SELECT_SQL} {LIST_FROM_SQL} WHERE l.id = ?1;"),
                [id],
                |row| Ok(parse_list_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn get_list_for_user(&self, id: ListId, user_id: UserId) -> RepoResult<Option<ShoppingList>> {
        self.conn
            .query_row(
                &format!("{LIST_SELECT_SQL} {LIST_FROM_SQL} WHERE l.id = ?1 AND l.user_id = ?2;"),
                params![id, user_id],
                |row| Ok(parse_list_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn lists_for_user(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> RepoResult<(PageWindow, Vec<ShoppingList>)> {
        let mut filter = SqlFilter::new();
        filter.push("l.user_id = ?", user_id);
        fetch_page(
            self.conn,
            LIST_SELECT_SQL,
            LIST_FROM_SQL,
            &filter,
            "l.updated_at DESC, l.id DESC",
            page,
            parse_list_row,
        )
    }

    fn delete_list(&self, id: ListId, user_id: UserId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM shopping_lists WHERE id = ?1 AND user_id = ?2;",
            params![id, user_id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "shopping list",
                id,
            });
        }
        Ok(())
    }

    fn get_current(&self, user_id: UserId, today: NaiveDate) -> RepoResult<Option<ShoppingList>> {
        self.conn
            .query_row(
                &format!(
                    "{LIST_SELECT_SQL} {LIST_FROM_SQL}
                     WHERE l.user_id = ?1
                       AND l.start_date <= ?2
                       AND l.end_date >= ?2
                     ORDER BY l.id ASC
                     LIMIT 1;"
                ),
                params![user_id, format_date(today)],
                |row| Ok(parse_list_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn number_of_items(&self, list_id: ListId) -> RepoResult<i64> {
        let total = self.conn.query_row(
            "SELECT COALESCE(SUM(quantity), 0)
             FROM shopping_item_quantities
             WHERE list_id = ?1;",
            [list_id],
            |row| row.get(0),
        )?;
        Ok(total)
    }

    fn total_price_cents(&self, list_id: ListId) -> RepoResult<i64> {
        let total = sum_line_totals(self.line_amounts(list_id, None)?);
        // Item price edits after the quantity write can still push the sum past i64.
        Ok(checked_total_cents(total).unwrap_or(i64::MAX))
    }

    fn set_item_quantity(&self, list_id: ListId, item_id: ItemId, quantity: i64) -> RepoResult<()> {
        validate_quantity(quantity)?;

        let price_cents: i64 = self
            .conn
            .query_row(
                "SELECT price_cents FROM items WHERE id = ?1;",
                [item_id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(RepoError::NotFound {
                entity: "item",
                id: item_id,
            })?;
        let other_lines = sum_line_totals(self.line_amounts(list_id, Some(item_id))?);
        checked_total_cents(other_lines + i128::from(price_cents) * i128::from(quantity))?;

        self.conn.execute(
            "INSERT INTO shopping_item_quantities (quantity, item_id, list_id)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (list_id, item_id) DO UPDATE SET quantity = excluded.quantity;",
            params![quantity, item_id, list_id],
        )?;
        self.touch_list(list_id)
    }

    fn remove_item(&self, list_id: ListId, item_id: ItemId) -> RepoResult<bool> {
        let removed = self.conn.execute(
            "DELETE FROM shopping_item_quantities WHERE list_id = ?1 AND item_id = ?2;",
            params![list_id, item_id],
        )?;
        if removed > 0 {
            self.touch_list(list_id)?;
        }
        Ok(removed > 0)
    }

    fn entries(&self, list_id: ListId) -> RepoResult<Vec<ListEntry>> {
        fetch_all(
            self.conn,
            "SELECT
                i.id AS item_id,
                i.name AS item_name,
                s.name AS store_name,
                i.price_cents,
                q.quantity
             FROM shopping_item_quantities q
             INNER JOIN items i ON i.id = q.item_id
             INNER JOIN stores s ON s.id = i.store_id
             WHERE q.list_id = ?
             ORDER BY q.id ASC;",
            &[Value::Integer(list_id)],
            |row| {
                Ok(ListEntry {
                    item_id: row.get("item_id")?,
                    item_name: row.get("item_name")?,
                    store_name: row.get("store_name")?,
                    price_cents: row.get("price_cents")?,
                    quantity: row.get("quantity")?,
                })
            },
        )
    }

    fn count_lists_linked_to_item(&self, item_id: ItemId) -> RepoResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(DISTINCT list_id)
             FROM shopping_item_quantities
             WHERE item_id = ?1;",
            [item_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn lists_created_in_year(&self, user_id: UserId, year: i32) -> RepoResult<Vec<ShoppingList>> {
        let (start, end) = year_bounds_ms(year)?;
        fetch_all(
            self.conn,
            &format!(
                "{LIST_SELECT_SQL} {LIST_FROM_SQL}
                 WHERE l.user_id = ?
                   AND l.created_at >= ?
                   AND l.created_at < ?
                 ORDER BY l.id ASC;"
            ),
            &[
                Value::Integer(user_id),
                Value::Integer(start),
                Value::Integer(end),
            ],
            parse_list_row,
        )
    }
}

/// Epoch millisecond bounds `[Jan 1 of year, Jan 1 of year + 1)` in UTC.
fn year_bounds_ms(year: i32) -> RepoResult<(i64, i64)> {
    let first_day = |year: i32| {
        NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| RepoError::InvalidData(format!("year `{year}` is out of range")))
    };
    Ok((day_start_ms(first_day(year)?), day_start_ms(first_day(year + 1)?)))
}

fn parse_list_row(row: &Row<'_>) -> RepoResult<ShoppingList> {
    Ok(ShoppingList {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        start_date: parse_stored_date("shopping_lists.start_date", row.get("start_date")?)?,
        end_date: parse_stored_date("shopping_lists.end_date", row.get("end_date")?)?,
        user_id: row.get("user_id")?,
    })
}

fn parse_stored_date(column: &str, value: String) -> RepoResult<NaiveDate> {
    parse_date(&value)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid date `{value}` in {column}")))
}
