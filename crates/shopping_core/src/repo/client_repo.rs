//! API client repository.

use super::sql::{bool_to_int, fetch_all, int_to_bool};
use super::{RepoError, RepoResult};
use crate::model::user::{ApiClient, UserId};
use rusqlite::{params, Connection, OptionalExtension, Row};

const CLIENT_SELECT_SQL: &str = "SELECT
    c.id,
    c.name,
    c.user_id,
    c.is_active,
    c.client_secret
FROM api_clients c";

pub trait ClientRepository {
    fn find_for_user(&self, user_id: UserId) -> RepoResult<Option<ApiClient>>;
    fn create_client(&self, user_id: UserId, name: &str, secret_hash: &str) -> RepoResult<ApiClient>;
    /// Sets the active flag and, when given, replaces the stored secret hash.
    fn update_client(
        &self,
        id: i64,
        is_active: bool,
        secret_hash: Option<&str>,
    ) -> RepoResult<ApiClient>;
    /// All clients with their owner's username, ordered by id.
    fn list_clients(&self) -> RepoResult<Vec<(ApiClient, String)>>;
}

pub struct SqliteClientRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteClientRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn get_client(&self, id: i64) -> RepoResult<ApiClient> {
        self.conn
            .query_row(
                &format!("{CLIENT_SELECT_SQL} WHERE c.id = ?1;"),
                [id],
                |row| Ok(parse_client_row(row)),
            )
            .optional()?
            .ok_or(RepoError::NotFound {
                entity: "api client",
                id,
            })?
    }
}

impl ClientRepository for SqliteClientRepository<'_> {
    fn find_for_user(&self, user_id: UserId) -> RepoResult<Option<ApiClient>> {
        self.conn
            .query_row(
                &format!("{CLIENT_SELECT_SQL} WHERE c.user_id = ?1;"),
                [user_id],
                |row| Ok(parse_client_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn create_client(&self, user_id: UserId, name: &str, secret_hash: &str) -> RepoResult<ApiClient> {
        self.conn.execute(
            "INSERT INTO api_clients (name, user_id, is_active, client_secret)
             VALUES (?1, ?2, 1, ?3);",
            params![name, user_id, secret_hash],
        )?;
        self.get_client(self.conn.last_insert_rowid())
    }

    fn update_client(
        &self,
        id: i64,
        is_active: bool,
        secret_hash: Option<&str>,
    ) -> RepoResult<ApiClient> {
        let changed = self.conn.execute(
            "UPDATE api_clients
             SET
                is_active = ?2,
                client_secret = COALESCE(?3, client_secret)
             WHERE id = ?1;",
            params![id, bool_to_int(is_active), secret_hash],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "api client",
                id,
            });
        }
        self.get_client(id)
    }

    fn list_clients(&self) -> RepoResult<Vec<(ApiClient, String)>> {
        fetch_all(
            self.conn,
            "SELECT
                c.id,
                c.name,
                c.user_id,
                c.is_active,
                c.client_secret,
                u.username
             FROM api_clients c
             INNER JOIN users u ON u.id = c.user_id
             ORDER BY c.id ASC;",
            &[],
            |row| Ok((parse_client_row(row)?, row.get("username")?)),
        )
    }
}

fn parse_client_row(row: &Row<'_>) -> RepoResult<ApiClient> {
    Ok(ApiClient {
        id: row.get("id")?,
        name: row.get("name")?,
        user_id: row.get("user_id")?,
        is_active: int_to_bool("api_clients.is_active", row.get("is_active")?)?,
        client_secret: row.get("client_secret")?,
    })
}
