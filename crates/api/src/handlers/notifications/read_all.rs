#![forbid(unsafe_code)]

use crate::server::{ApiResponse, internal_error};
use om_storage::{SqliteStore, UserRow};
use serde_json::json;

pub(crate) fn read_all(store: &mut SqliteStore, user: &UserRow) -> ApiResponse {
    let count = match store.mark_all_notifications_read(&user.id) {
        Ok(count) => count,
        Err(err) => return internal_error(err),
    };
    (
        "200 OK",
        json!({
            "message": format!("{count} notifications marquées comme lues"),
            "count": count,
        }),
    )
}
