#![forbid(unsafe_code)]

use crate::server::{ApiResponse, HttpRequest, internal_error};
use om_storage::{NotificationFilter, SqliteStore, UserRow};
use serde_json::{Value, json};

/// Own inbox only, newest first.
pub(crate) fn list(store: &mut SqliteStore, user: &UserRow, request: &HttpRequest) -> ApiResponse {
    let page = crate::page_param(&request.path);
    let limit = crate::limit_param(&request.path, 20);
    let unread_only = crate::query_param(&request.path, "unreadOnly").as_deref() == Some("true");

    let filter = NotificationFilter {
        user_id: user.id.clone(),
        unread_only,
        limit,
        offset: (page - 1) * limit,
    };
    let (notifications, total) = match store.list_notifications(&filter) {
        Ok(result) => result,
        Err(err) => return internal_error(err),
    };
    let unread_count = match store.unread_count(&user.id) {
        Ok(count) => count,
        Err(err) => return internal_error(err),
    };

    let items: Vec<Value> = notifications
        .iter()
        .map(crate::notification_json)
        .collect();
    (
        "200 OK",
        json!({
            "notifications": items,
            "pagination": crate::pagination_json(page, limit, total),
            "unreadCount": unread_count,
        }),
    )
}
