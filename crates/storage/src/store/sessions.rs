#![forbid(unsafe_code)]

use super::*;
use super::users::{USER_COLUMNS, map_user};
use rusqlite::{OptionalExtension, params};

impl SqliteStore {
    pub fn create_session(
        &mut self,
        user_id: &str,
        token: &str,
        ttl_ms: i64,
    ) -> Result<SessionRow, StoreError> {
        let now_ms = now_ms();
        let expires_ms = now_ms.saturating_add(ttl_ms);
        self.conn.execute(
            "INSERT INTO sessions(token, user_id, created_ms, expires_ms) VALUES (?1, ?2, ?3, ?4)",
            params![token, user_id, now_ms, expires_ms],
        )?;
        Ok(SessionRow {
            token: token.to_string(),
            user_id: user_id.to_string(),
            created_ms: now_ms,
            expires_ms,
        })
    }

    /// Resolves a bearer token to its user. Expired sessions and sessions
    /// pointing at deleted users resolve to `None`.
    pub fn session_user(&self, token: &str) -> Result<Option<UserRow>, StoreError> {
        let now_ms = now_ms();
        Ok(self
            .conn
            .query_row(
                &format!(
                    "SELECT {USER_COLUMNS} FROM users \
                     JOIN sessions ON sessions.user_id = users.id \
                     WHERE sessions.token = ?1 AND sessions.expires_ms > ?2"
                ),
                params![token, now_ms],
                map_user,
            )
            .optional()?)
    }

    pub fn delete_session(&mut self, token: &str) -> Result<bool, StoreError> {
        let deleted = self
            .conn
            .execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
        Ok(deleted > 0)
    }

    pub fn purge_expired_sessions(&mut self) -> Result<usize, StoreError> {
        let now_ms = now_ms();
        Ok(self.conn.execute(
            "DELETE FROM sessions WHERE expires_ms <= ?1",
            params![now_ms],
        )?)
    }
}
