//! Login session repository.
//!
//! # Invariants
//! - Session keys are random, 32 lowercase hex characters.
//! - Expired sessions and sessions of inactive users never authenticate.

use super::user_repo::parse_user_row;
use super::RepoResult;
use crate::model::user::{Session, User, UserId};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

pub trait SessionRepository {
    fn create_session(&self, user_id: UserId, now_ms: i64, ttl_ms: i64) -> RepoResult<Session>;
    /// Resolves a session key to its active user when still valid at `now_ms`.
    fn find_session_user(&self, session_key: &str, now_ms: i64) -> RepoResult<Option<User>>;
    /// Returns whether a session row was removed.
    fn delete_session(&self, session_key: &str) -> RepoResult<bool>;
    fn purge_expired_sessions(&self, now_ms: i64) -> RepoResult<usize>;
}

pub struct SqliteSessionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSessionRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SessionRepository for SqliteSessionRepository<'_> {
    fn create_session(&self, user_id: UserId, now_ms: i64, ttl_ms: i64) -> RepoResult<Session> {
        let session = Session {
            session_key: Uuid::new_v4().simple().to_string(),
            user_id,
            created_at: now_ms,
            expires_at: now_ms.saturating_add(ttl_ms),
        };

        self.conn.execute(
            "INSERT INTO sessions (session_key, user_id, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                session.session_key.as_str(),
                session.user_id,
                session.created_at,
                session.expires_at,
            ],
        )?;

        Ok(session)
    }

    fn find_session_user(&self, session_key: &str, now_ms: i64) -> RepoResult<Option<User>> {
        self.conn
            .query_row(
                "SELECT
                    u.id,
                    u.username,
                    u.email,
                    u.first_name,
                    u.last_name,
                    u.is_active,
                    u.is_staff,
                    u.date_joined
                 FROM sessions s
                 INNER JOIN users u ON u.id = s.user_id
                 WHERE s.session_key = ?1
                   AND s.expires_at > ?2
                   AND u.is_active = 1;",
                params![session_key, now_ms],
                |row| Ok(parse_user_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn delete_session(&self, session_key: &str) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM sessions WHERE session_key = ?1;", [session_key])?;
        Ok(changed > 0)
    }

    fn purge_expired_sessions(&self, now_ms: i64) -> RepoResult<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM sessions WHERE expires_at <= ?1;", [now_ms])?;
        Ok(removed)
    }
}
