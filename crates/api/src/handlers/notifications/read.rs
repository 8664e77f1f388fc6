#![forbid(unsafe_code)]

use crate::server::{ApiResponse, forbidden, internal_error, not_found};
use om_storage::{SqliteStore, StoreError, UserRow};
use serde_json::json;

pub(crate) fn read(store: &mut SqliteStore, user: &UserRow, id: &str) -> ApiResponse {
    let notification = match store.notification_by_id(id) {
        Ok(Some(notification)) => notification,
        Ok(None) => return not_found("Notification non trouvée"),
        Err(err) => return internal_error(err),
    };
    if notification.user_id != user.id {
        return forbidden("Accès non autorisé à cette notification");
    }
    if notification.is_read {
        return (
            "200 OK",
            json!({"message": "Notification déjà marquée comme lue"}),
        );
    }

    let updated = match store.mark_notification_read(id) {
        Ok(updated) => updated,
        Err(StoreError::UnknownId) => return not_found("Notification non trouvée"),
        Err(err) => return internal_error(err),
    };
    (
        "200 OK",
        json!({
            "notification": crate::notification_json(&updated),
            "message": "Notification marquée comme lue",
        }),
    )
}
