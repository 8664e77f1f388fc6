#![forbid(unsafe_code)]

use super::*;
use rusqlite::{OptionalExtension, Transaction, params};

pub(crate) const NOTIFICATION_COLUMNS: &str =
    "notifications.id, notifications.user_id, notifications.type, notifications.title, \
     notifications.message, notifications.entity_id, notifications.entity_type, \
     notifications.is_read, notifications.read_ms, notifications.created_ms";

pub(crate) fn map_notification(row: &rusqlite::Row<'_>) -> rusqlite::Result<NotificationRow> {
    Ok(NotificationRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        notif_type: row.get(2)?,
        title: row.get(3)?,
        message: row.get(4)?,
        entity_id: row.get(5)?,
        entity_type: row.get(6)?,
        is_read: row.get(7)?,
        read_ms: row.get(8)?,
        created_ms: row.get(9)?,
    })
}

impl SqliteStore {
    pub fn notify(&mut self, request: NewNotification) -> Result<NotificationRow, StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;
        let row = insert_notification_tx(&tx, &request, now_ms)?;
        tx.commit()?;
        Ok(row)
    }

    pub fn notification_by_id(&self, id: &str) -> Result<Option<NotificationRow>, StoreError> {
        Ok(self
            .conn
            .query_row(
                &format!(
                    "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE notifications.id = ?1"
                ),
                params![id],
                map_notification,
            )
            .optional()?)
    }

    pub fn list_notifications(
        &self,
        filter: &NotificationFilter,
    ) -> Result<(Vec<NotificationRow>, i64), StoreError> {
        let unread_sql = if filter.unread_only {
            " AND is_read = 0"
        } else {
            ""
        };

        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM notifications WHERE user_id = ?1{unread_sql}"),
            params![filter.user_id],
            |row| row.get(0),
        )?;

        let sql = format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications \
             WHERE user_id = ?1{unread_sql} \
             ORDER BY created_ms DESC, id DESC LIMIT ?2 OFFSET ?3"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![filter.user_id, filter.limit as i64, filter.offset as i64],
            map_notification,
        )?;
        let notifications = rows.collect::<Result<Vec<_>, _>>()?;
        Ok((notifications, total))
    }

    pub fn unread_count(&self, user_id: &str) -> Result<i64, StoreError> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM notifications WHERE user_id = ?1 AND is_read = 0",
            params![user_id],
            |row| row.get(0),
        )?)
    }

    pub fn mark_notification_read(&mut self, id: &str) -> Result<NotificationRow, StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;
        let current = tx
            .query_row(
                &format!(
                    "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE notifications.id = ?1"
                ),
                params![id],
                map_notification,
            )
            .optional()?;
        let Some(current) = current else {
            return Err(StoreError::UnknownId);
        };
        tx.execute(
            "UPDATE notifications SET is_read = 1, read_ms = ?2 WHERE id = ?1",
            params![id, now_ms],
        )?;
        tx.commit()?;
        Ok(NotificationRow {
            is_read: true,
            read_ms: Some(now_ms),
            ..current
        })
    }

    /// Returns how many notifications flipped from unread to read.
    pub fn mark_all_notifications_read(&mut self, user_id: &str) -> Result<usize, StoreError> {
        let now_ms = now_ms();
        Ok(self.conn.execute(
            "UPDATE notifications SET is_read = 1, read_ms = ?2 \
             WHERE user_id = ?1 AND is_read = 0",
            params![user_id, now_ms],
        )?)
    }
}

pub(crate) fn insert_notification_tx(
    tx: &Transaction<'_>,
    request: &NewNotification,
    now_ms: i64,
) -> Result<NotificationRow, StoreError> {
    let id = next_id_tx(tx, "notification", "NTF")?;
    tx.execute(
        r#"
        INSERT INTO notifications(id, user_id, type, title, message, entity_id, entity_type, is_read, read_ms, created_ms)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, NULL, ?8)
        "#,
        params![
            id,
            request.user_id,
            request.notif_type,
            request.title,
            request.message,
            request.entity_id,
            request.entity_type,
            now_ms
        ],
    )?;
    Ok(NotificationRow {
        id,
        user_id: request.user_id.clone(),
        notif_type: request.notif_type.clone(),
        title: request.title.clone(),
        message: request.message.clone(),
        entity_id: request.entity_id.clone(),
        entity_type: request.entity_type.clone(),
        is_read: false,
        read_ms: None,
        created_ms: now_ms,
    })
}
