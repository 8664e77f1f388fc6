#![forbid(unsafe_code)]

use super::*;
use rusqlite::{OptionalExtension, Transaction, params};

pub(crate) fn map_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        phone: row.get(5)?,
        role: row.get(6)?,
        is_active: row.get(7)?,
        last_login_ms: row.get(8)?,
        created_ms: row.get(9)?,
        updated_ms: row.get(10)?,
    })
}

pub(crate) const USER_COLUMNS: &str =
    "users.id, users.email, users.password_hash, users.first_name, users.last_name, \
     users.phone, users.role, users.is_active, users.last_login_ms, users.created_ms, users.updated_ms";

impl SqliteStore {
    pub fn create_user(&mut self, request: NewUser) -> Result<UserRow, StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;
        let user = insert_user_tx(&tx, &request, now_ms)?;
        tx.commit()?;
        Ok(user)
    }

    pub fn user_by_id(&self, id: &str) -> Result<Option<UserRow>, StoreError> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id],
                map_user,
            )
            .optional()?)
    }

    pub fn user_by_email(&self, email: &str) -> Result<Option<UserRow>, StoreError> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
                params![email],
                map_user,
            )
            .optional()?)
    }

    pub fn user_lite(&self, id: &str) -> Result<Option<UserLite>, StoreError> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, first_name, last_name, email FROM users WHERE id = ?1",
                params![id],
                |row| {
                    Ok(UserLite {
                        id: row.get(0)?,
                        first_name: row.get(1)?,
                        last_name: row.get(2)?,
                        email: row.get(3)?,
                    })
                },
            )
            .optional()?)
    }

    pub fn email_taken(&self, email: &str) -> Result<bool, StoreError> {
        Ok(self
            .conn
            .query_row(
                "SELECT 1 FROM users WHERE email = ?1",
                params![email],
                |_| Ok(()),
            )
            .optional()?
            .is_some())
    }

    pub fn count_users(&self) -> Result<i64, StoreError> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?)
    }

    pub fn touch_last_login(&mut self, user_id: &str) -> Result<(), StoreError> {
        let now_ms = now_ms();
        self.conn.execute(
            "UPDATE users SET last_login_ms = ?2, updated_ms = ?2 WHERE id = ?1",
            params![user_id, now_ms],
        )?;
        Ok(())
    }
}

pub(crate) fn insert_user_tx(
    tx: &Transaction<'_>,
    request: &NewUser,
    now_ms: i64,
) -> Result<UserRow, StoreError> {
    let taken = tx
        .query_row(
            "SELECT 1 FROM users WHERE email = ?1",
            params![request.email],
            |_| Ok(()),
        )
        .optional()?
        .is_some();
    if taken {
        return Err(StoreError::EmailTaken);
    }

    let id = next_id_tx(tx, "user", "USR")?;
    tx.execute(
        r#"
        INSERT INTO users(id, email, password_hash, first_name, last_name, phone, role, is_active, created_ms, updated_ms)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8, ?8)
        "#,
        params![
            id,
            request.email,
            request.password_hash,
            request.first_name,
            request.last_name,
            request.phone,
            request.role,
            now_ms
        ],
    )?;

    Ok(UserRow {
        id,
        email: request.email.clone(),
        password_hash: request.password_hash.clone(),
        first_name: request.first_name.clone(),
        last_name: request.last_name.clone(),
        phone: request.phone.clone(),
        role: request.role.clone(),
        is_active: true,
        last_login_ms: None,
        created_ms: now_ms,
        updated_ms: now_ms,
    })
}
