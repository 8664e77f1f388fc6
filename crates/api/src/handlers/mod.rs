#![forbid(unsafe_code)]

pub(crate) mod analytics;
pub(crate) mod auth;
pub(crate) mod consultants;
pub(crate) mod notifications;
pub(crate) mod projects;
pub(crate) mod tasks;
pub(crate) mod transactions;

use om_core::notify::NotificationType;
use om_storage::{NewNotification, SqliteStore};

/// Best-effort notification insert: a failed write never fails the
/// request that triggered it.
pub(crate) fn notify(
    store: &mut SqliteStore,
    user_id: &str,
    kind: NotificationType,
    title: &str,
    message: String,
    entity: Option<(&str, &str)>,
) {
    let _ = store.notify(NewNotification {
        user_id: user_id.to_string(),
        notif_type: kind.as_str().to_string(),
        title: title.to_string(),
        message,
        entity_id: entity.map(|(id, _)| id.to_string()),
        entity_type: entity.map(|(_, kind)| kind.to_string()),
    });
}
