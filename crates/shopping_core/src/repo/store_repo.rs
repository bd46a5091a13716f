//! Shopping store repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - CRUD over `stores`, always joined with the owner's username.
//! - Filtered, paginated listing and per-type counting.
//!
//! # Invariants
//! - Listing order is `updated_at DESC, id DESC`.
//! - Store date filters are inclusive on both `before` and `after` bounds.
//! - Every update bumps `updated_at` strictly forward.

use super::sql::{exists, fetch_page, SqlFilter};
use super::{RepoError, RepoResult};
use crate::model::clock::now_ms;
use crate::model::page::{PageRequest, PageWindow};
use crate::model::store::{NewStore, Store, StoreCounts, StoreId, StorePatch, StoreType};
use crate::model::user::UserId;
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const STORE_SELECT_SQL: &str = "SELECT
    s.id,
    s.name,
    s.store_type,
    s.description,
    s.created_at,
    s.updated_at,
    s.user_id,
    u.username AS owner_username";

const STORE_FROM_SQL: &str = "FROM stores s INNER JOIN users u ON u.id = s.user_id";

const STORE_ORDER_SQL: &str = "s.updated_at DESC, s.id DESC";

/// Filter options for store listing; unset fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreFilter {
    /// Case-insensitive substring of the store name.
    pub name: Option<String>,
    pub ids: Vec<StoreId>,
    /// Raw store-type values; values outside the known types match nothing.
    pub store_types: Vec<i64>,
    pub created_on: Option<NaiveDate>,
    pub created_before: Option<NaiveDate>,
    pub created_after: Option<NaiveDate>,
    pub updated_on: Option<NaiveDate>,
    pub updated_before: Option<NaiveDate>,
    pub updated_after: Option<NaiveDate>,
    pub user_id: Option<UserId>,
}

pub trait StoreRepository {
    fn create_store(&self, store: &NewStore) -> RepoResult<Store>;
    fn get_store(&self, id: StoreId) -> RepoResult<Option<Store>>;
    fn find_store_by_name(&self, name: &str) -> RepoResult<Option<Store>>;
    fn name_exists(&self, name: &str) -> RepoResult<bool>;
    /// Applies `patch` to a store owned by `user_id`.
    fn update_store(&self, id: StoreId, user_id: UserId, patch: &StorePatch) -> RepoResult<Store>;
    fn delete_store(&self, id: StoreId, user_id: UserId) -> RepoResult<()>;
    /// Deletes regardless of owner; moderation only.
    fn force_delete_store(&self, id: StoreId) -> RepoResult<()>;
    fn filter_stores(
        &self,
        filter: &StoreFilter,
        page: PageRequest,
    ) -> RepoResult<(PageWindow, Vec<Store>)>;
    fn count_stores(&self, user_id: Option<UserId>) -> RepoResult<StoreCounts>;
}

pub struct SqliteStoreRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStoreRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_one(&self, where_sql: &str, binds: &[Value]) -> RepoResult<Option<Store>> {
        self.conn
            .query_row(
                &format!("{STORE_SELECT_SQL} {STORE_FROM_SQL} WHERE {where_sql};"),
                params_from_iter(binds),
                |row| Ok(parse_store_row(row)),
            )
            .optional()?
            .transpose()
    }
}

impl StoreRepository for SqliteStoreRepository<'_> {
    fn create_store(&self, store: &NewStore) -> RepoResult<Store> {
        store.validate()?;

        let now = now_ms();
        self.conn.execute(
            "INSERT INTO stores (
                name,
                store_type,
                description,
                created_at,
                updated_at,
                user_id
            ) VALUES (?1, ?2, ?3, ?4, ?4, ?5);",
            params![
                store.name.as_str(),
                store.store_type.value(),
                store.description.as_str(),
                now,
                store.user_id,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        self.get_store(id)?
            .ok_or(RepoError::NotFound { entity: "store", id })
    }

    fn get_store(&self, id: StoreId) -> RepoResult<Option<Store>> {
        self.query_one("s.id = ?", &[Value::Integer(id)])
    }

    fn find_store_by_name(&self, name: &str) -> RepoResult<Option<Store>> {
        self.query_one("s.name = ?", &[Value::Text(name.to_string())])
    }

    fn name_exists(&self, name: &str) -> RepoResult<bool> {
        exists(
            self.conn,
            "SELECT EXISTS(SELECT 1 FROM stores WHERE name = ?1);",
            &[Value::Text(name.to_string())],
        )
    }

    fn update_store(&self, id: StoreId, user_id: UserId, patch: &StorePatch) -> RepoResult<Store> {
        patch.validate()?;

        let changed = self.conn.execute(
            "UPDATE stores
             SET
                name = COALESCE(?3, name),
                store_type = COALESCE(?4, store_type),
                description = COALESCE(?5, description),
                updated_at = MAX(?6, updated_at + 1)
             WHERE id = ?1
               AND user_id = ?2;",
            params![
                id,
                user_id,
                patch.name.as_deref(),
                patch.store_type.map(StoreType::value),
                patch.description.as_deref(),
                now_ms(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound { entity: "store", id });
        }

        self.get_store(id)?
            .ok_or(RepoError::NotFound { entity: "store", id })
    }

    fn delete_store(&self, id: StoreId, user_id: UserId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM stores WHERE id = ?1 AND user_id = ?2;",
            params![id, user_id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "store", id });
        }
        Ok(())
    }

    fn force_delete_store(&self, id: StoreId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM stores WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "store", id });
        }
        Ok(())
    }

    fn filter_stores(
        &self,
        filter: &StoreFilter,
        page: PageRequest,
    ) -> RepoResult<(PageWindow, Vec<Store>)> {
        let mut sql_filter = SqlFilter::new();

        if let Some(name) = filter.name.as_deref().filter(|name| !name.is_empty()) {
            sql_filter.push_contains("s.name", name);
        }
        sql_filter.push_in("s.id", &filter.ids);
        sql_filter.push_in("s.store_type", &filter.store_types);
        if let Some(date) = filter.created_on {
            sql_filter.date_on("s.created_at", date);
        }
        if let Some(date) = filter.created_before {
            sql_filter.date_on_or_before("s.created_at", date);
        }
        if let Some(date) = filter.created_after {
            sql_filter.date_on_or_after("s.created_at", date);
        }
        if let Some(date) = filter.updated_on {
            sql_filter.date_on("s.updated_at", date);
        }
        if let Some(date) = filter.updated_before {
            sql_filter.date_on_or_before("s.updated_at", date);
        }
        if let Some(date) = filter.updated_after {
            sql_filter.date_on_or_after("s.updated_at", date);
        }
        if let Some(user_id) = filter.user_id {
            sql_filter.push("s.user_id = ?", user_id);
        }

        fetch_page(
            self.conn,
            STORE_SELECT_SQL,
            STORE_FROM_SQL,
            &sql_filter,
            STORE_ORDER_SQL,
            page,
            parse_store_row,
        )
    }

    fn count_stores(&self, user_id: Option<UserId>) -> RepoResult<StoreCounts> {
        let counts = self.conn.query_row(
            "SELECT
                COUNT(*),
                COALESCE(SUM(CASE WHEN store_type = 1 THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN store_type = 2 THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN store_type = 3 THEN 1 ELSE 0 END), 0)
             FROM stores
             WHERE (?1 IS NULL OR user_id = ?1);",
            [user_id],
            |row| {
                Ok(StoreCounts {
                    total: row.get(0)?,
                    online: row.get(1)?,
                    in_store: row.get(2)?,
                    both: row.get(3)?,
                })
            },
        )?;
        Ok(counts)
    }
}

pub(crate) fn parse_store_row(row: &Row<'_>) -> RepoResult<Store> {
    let type_value: i64 = row.get("store_type")?;
    let store_type = StoreType::from_value(type_value).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid store type `{type_value}` in stores.store_type"
        ))
    })?;

    Ok(Store {
        id: row.get("id")?,
        name: row.get("name")?,
        store_type,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        user_id: row.get("user_id")?,
        owner_username: row.get("owner_username")?,
    })
}
