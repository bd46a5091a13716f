//! User account repository.
//!
//! # Invariants
//! - Username uniqueness is enforced by the `users.username` index.
//! - Password hashes never leave this module except through
//!   `find_credentials`.

use super::sql::{bool_to_int, exists, fetch_all, int_to_bool};
use super::{RepoError, RepoResult};
use crate::model::clock::now_ms;
use crate::model::user::{NewUser, User, UserId};
use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension, Row};

const USER_SELECT_SQL: &str = "SELECT
    id,
    username,
    email,
    first_name,
    last_name,
    is_active,
    is_staff,
    date_joined
FROM users";

/// Repository interface for user accounts.
pub trait UserRepository {
    fn create_user(&self, user: &NewUser) -> RepoResult<User>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    /// Returns the user and its stored password hash.
    fn find_credentials(&self, username: &str) -> RepoResult<Option<(User, String)>>;
    fn username_exists(&self, username: &str) -> RepoResult<bool>;
    fn email_exists(&self, email: &str) -> RepoResult<bool>;
    fn list_users(&self) -> RepoResult<Vec<User>>;
    fn set_user_active(&self, id: UserId, is_active: bool) -> RepoResult<User>;
}

pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn require_user(&self, id: UserId) -> RepoResult<User> {
        self.get_user(id)?
            .ok_or(RepoError::NotFound { entity: "user", id })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &NewUser) -> RepoResult<User> {
        user.validate()?;

        self.conn.execute(
            "INSERT INTO users (
                username,
                email,
                first_name,
                last_name,
                password_hash,
                is_active,
                is_staff,
                date_joined
            ) VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?7);",
            params![
                user.username.as_str(),
                user.email.as_str(),
                user.first_name.as_str(),
                user.last_name.as_str(),
                user.password_hash.as_str(),
                bool_to_int(user.is_staff),
                now_ms(),
            ],
        )?;

        self.require_user(self.conn.last_insert_rowid())
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        self.conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE id = ?1;"),
                [id],
                |row| Ok(parse_user_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn find_credentials(&self, username: &str) -> RepoResult<Option<(User, String)>> {
        let found = self
            .conn
            .query_row(
                "SELECT
                    id,
                    username,
                    email,
                    first_name,
                    last_name,
                    is_active,
                    is_staff,
                    date_joined,
                    password_hash
                 FROM users
                 WHERE username = ?1;",
                [username],
                |row| Ok((parse_user_row(row), row.get::<_, String>("password_hash")?)),
            )
            .optional()?;

        match found {
            Some((user, hash)) => Ok(Some((user?, hash))),
            None => Ok(None),
        }
    }

    fn username_exists(&self, username: &str) -> RepoResult<bool> {
        exists(
            self.conn,
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1);",
            &[Value::Text(username.to_string())],
        )
    }

    fn email_exists(&self, email: &str) -> RepoResult<bool> {
        exists(
            self.conn,
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1 COLLATE NOCASE);",
            &[Value::Text(email.to_string())],
        )
    }

    fn list_users(&self) -> RepoResult<Vec<User>> {
        fetch_all(
            self.conn,
            &format!("{USER_SELECT_SQL} ORDER BY id ASC;"),
            &[],
            parse_user_row,
        )
    }

    fn set_user_active(&self, id: UserId, is_active: bool) -> RepoResult<User> {
        let changed = self.conn.execute(
            "UPDATE users SET is_active = ?2 WHERE id = ?1;",
            params![id, bool_to_int(is_active)],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "user", id });
        }
        self.require_user(id)
    }
}

pub(crate) fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
        email: row.get("email")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        is_active: int_to_bool("users.is_active", row.get("is_active")?)?,
        is_staff: int_to_bool("users.is_staff", row.get("is_staff")?)?,
        date_joined: row.get("date_joined")?,
    })
}
