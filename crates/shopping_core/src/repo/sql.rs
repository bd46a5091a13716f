//! Shared SQL building blocks: dynamic WHERE clauses and paged fetches.

use super::{RepoError, RepoResult};
use crate::model::clock::{day_start_ms, next_day_start_ms};
use crate::model::page::{PageRequest, PageWindow};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};

/// Conjunction of SQL predicates with positional bind values.
#[derive(Debug, Default)]
pub(crate) struct SqlFilter {
    clauses: Vec<String>,
    binds: Vec<Value>,
}

impl SqlFilter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, clause: &str, value: impl Into<Value>) {
        self.clauses.push(clause.to_string());
        self.binds.push(value.into());
    }

    /// `column IN (...)`; an empty set adds no predicate.
    pub(crate) fn push_in(&mut self, column: &str, values: &[i64]) {
        if values.is_empty() {
            return;
        }
        let placeholders = vec!["?"; values.len()].join(", ");
        self.clauses.push(format!("{column} IN ({placeholders})"));
        self.binds
            .extend(values.iter().copied().map(Value::Integer));
    }

    /// Case-insensitive substring match.
    pub(crate) fn push_contains(&mut self, column: &str, needle: &str) {
        self.push(
            &format!("{column} LIKE ? ESCAPE '\\'"),
            like_contains_pattern(needle),
        );
    }

    pub(crate) fn date_on(&mut self, column: &str, date: NaiveDate) {
        self.date_on_or_after(column, date);
        self.date_on_or_before(column, date);
    }

    pub(crate) fn date_on_or_after(&mut self, column: &str, date: NaiveDate) {
        self.push(&format!("{column} >= ?"), day_start_ms(date));
    }

    pub(crate) fn date_on_or_before(&mut self, column: &str, date: NaiveDate) {
        self.push(&format!("{column} < ?"), next_day_start_ms(date));
    }

    pub(crate) fn date_after(&mut self, column: &str, date: NaiveDate) {
        self.push(&format!("{column} >= ?"), next_day_start_ms(date));
    }

    pub(crate) fn date_before(&mut self, column: &str, date: NaiveDate) {
        self.push(&format!("{column} < ?"), day_start_ms(date));
    }

    pub(crate) fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    pub(crate) fn binds(&self) -> &[Value] {
        &self.binds
    }
}

/// Runs `SELECT COUNT(*)` then one page of `select_sql`.
///
/// `from_sql` is the shared `FROM ... JOIN ...` tail used by both queries.
pub(crate) fn fetch_page<T>(
    conn: &Connection,
    select_sql: &str,
    from_sql: &str,
    filter: &SqlFilter,
    order_by: &str,
    request: PageRequest,
    map_row: impl Fn(&Row<'_>) -> RepoResult<T>,
) -> RepoResult<(PageWindow, Vec<T>)> {
    let where_sql = filter.where_sql();
    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) {from_sql}{where_sql};"),
        params_from_iter(filter.binds()),
        |row| row.get(0),
    )?;

    let window = PageWindow::resolve(request, total);
    let mut binds = filter.binds().to_vec();
    binds.push(Value::Integer(window.limit()));
    binds.push(Value::Integer(window.offset()));

    let mut stmt = conn.prepare(&format!(
        "{select_sql} {from_sql}{where_sql} ORDER BY {order_by} LIMIT ? OFFSET ?;"
    ))?;
    let mut rows = stmt.query(params_from_iter(binds))?;
    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        records.push(map_row(row)?);
    }

    Ok((window, records))
}

/// Runs `sql` and maps every row.
pub(crate) fn fetch_all<T>(
    conn: &Connection,
    sql: &str,
    binds: &[Value],
    map_row: impl Fn(&Row<'_>) -> RepoResult<T>,
) -> RepoResult<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params_from_iter(binds))?;
    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        records.push(map_row(row)?);
    }
    Ok(records)
}

pub(crate) fn exists(conn: &Connection, sql: &str, binds: &[Value]) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(sql, params_from_iter(binds), |row| row.get(0))?;
    Ok(exists == 1)
}

pub(crate) fn like_contains_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

pub(crate) fn int_to_bool(column: &str, value: i64) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}
