//! Shopping list budget repository.

use super::sql::fetch_all;
use super::{RepoError, RepoResult};
use crate::model::clock::parse_date;
use crate::model::shopping_list::{Budget, ListId};
use crate::model::user::UserId;
use crate::model::money::validate_cents;
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension, Row};

pub trait BudgetRepository {
    /// Creates or replaces the budget of `list_id`.
    fn set_budget(&self, list_id: ListId, user_id: UserId, amount_cents: i64) -> RepoResult<Budget>;
    fn get_budget(&self, list_id: ListId) -> RepoResult<Option<Budget>>;
    /// Budget amount of the list in cents, zero when none is set.
    fn total_budget_cents(&self, list_id: ListId) -> RepoResult<i64>;
    /// Budgets of `list_ids`, each paired with its list's end date.
    fn budgets_for_lists(&self, list_ids: &[ListId]) -> RepoResult<Vec<(Budget, NaiveDate)>>;
}

pub struct SqliteBudgetRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBudgetRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl BudgetRepository for SqliteBudgetRepository<'_> {
    fn set_budget(&self, list_id: ListId, user_id: UserId, amount_cents: i64) -> RepoResult<Budget> {
        validate_cents("amount", amount_cents)?;

        self.conn.execute(
            "INSERT INTO shopping_budgets (amount_cents, list_id, user_id)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (list_id) DO UPDATE SET amount_cents = excluded.amount_cents;",
            params![amount_cents, list_id, user_id],
        )?;

        self.get_budget(list_id)?.ok_or(RepoError::NotFound {
            entity: "shopping budget",
            id: list_id,
        })
    }

    fn get_budget(&self, list_id: ListId) -> RepoResult<Option<Budget>> {
        self.conn
            .query_row(
                "SELECT id, amount_cents, list_id, user_id
                 FROM shopping_budgets
                 WHERE list_id = ?1;",
                [list_id],
                |row| Ok(parse_budget_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn total_budget_cents(&self, list_id: ListId) -> RepoResult<i64> {
        Ok(self
            .get_budget(list_id)?
            .map_or(0, |budget| budget.amount_cents))
    }

    fn budgets_for_lists(&self, list_ids: &[ListId]) -> RepoResult<Vec<(Budget, NaiveDate)>> {
        if list_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; list_ids.len()].join(", ");
        let binds: Vec<Value> = list_ids.iter().copied().map(Value::Integer).collect();
        fetch_all(
            self.conn,
            &format!(
                "SELECT b.id, b.amount_cents, b.list_id, b.user_id, l.end_date
                 FROM shopping_budgets b
                 INNER JOIN shopping_lists l ON l.id = b.list_id
                 WHERE b.list_id IN ({placeholders})
                 ORDER BY b.list_id ASC;"
            ),
            &binds,
            |row| {
                let end_date: String = row.get("end_date")?;
                let end_date = parse_date(&end_date).ok_or_else(|| {
                    RepoError::InvalidData(format!(
                        "invalid date `{end_date}` in shopping_lists.end_date"
                    ))
                })?;
                Ok((parse_budget_row(row)?, end_date))
            },
        )
    }
}

fn parse_budget_row(row: &Row<'_>) -> RepoResult<Budget> {
    Ok(Budget {
        id: row.get("id")?,
        amount_cents: row.get("amount_cents")?,
        list_id: row.get("list_id")?,
        user_id: row.get("user_id")?,
    })
}
