#![forbid(unsafe_code)]

use crate::server::{ApiResponse, HttpRequest, bad_request, forbidden, internal_error, not_found};
use om_core::notify::NotificationType;
use om_core::status::TaskStatus;
use om_storage::{SqliteStore, StoreError, UserRow};
use serde_json::Value;

pub(crate) fn status(
    store: &mut SqliteStore,
    user: &UserRow,
    id: &str,
    request: &HttpRequest,
) -> ApiResponse {
    let task = match store.task_by_id(id) {
        Ok(Some(task)) => task,
        Ok(None) => return not_found("Tâche non trouvée"),
        Err(err) => return internal_error(err),
    };
    let project = match store.project_by_id(&task.project_id) {
        Ok(Some(project)) => project,
        Ok(None) => return not_found("Projet non trouvé"),
        Err(err) => return internal_error(err),
    };
    let assigned_to_caller = task.assigned_user_id.as_deref() == Some(user.id.as_str());
    if !assigned_to_caller && !crate::handlers::projects::can_edit_project(user, &project) {
        return forbidden("Permissions insuffisantes");
    }

    let body = match crate::parse_json_body(&request.body) {
        Ok(body) => body,
        Err(resp) => return resp,
    };
    let status = match body.get("status").and_then(Value::as_str) {
        Some(value) => match TaskStatus::parse(value) {
            Some(status) => status,
            None => return bad_request("Statut invalide"),
        },
        None => return bad_request("Statut invalide"),
    };
    let actual_hours = crate::optional_f64(&body, "actualHours");
    if let Some(hours) = actual_hours
        && hours < 0.0
    {
        return bad_request("Les heures réelles doivent être positives");
    }
    // `comment` is accepted but not stored; there is no comment thread.

    let change = match store.set_task_status(id, status.as_str(), actual_hours) {
        Ok(change) => change,
        Err(StoreError::UnknownId) => return not_found("Tâche non trouvée"),
        Err(err) => return internal_error(err),
    };

    // Everyone involved except the caller hears about the change.
    let mut recipients = vec![change.project_creator_id.clone()];
    if let Some(manager_id) = &change.project_manager_id {
        recipients.push(manager_id.clone());
    }
    if let Some(assignee_id) = &change.task.assigned_user_id {
        recipients.push(assignee_id.clone());
    }
    recipients.sort();
    recipients.dedup();
    for recipient in recipients.iter().filter(|id| id.as_str() != user.id) {
        crate::handlers::notify(
            store,
            recipient,
            NotificationType::ChangementStatut,
            "Statut de tâche modifié",
            format!(
                "La tâche \"{}\" est maintenant \"{}\"",
                change.task.title,
                status.as_str()
            ),
            Some((&change.task.id, "task")),
        );
    }

    if let Some(payment) = &change.payment
        && let Some(assignee_id) = &change.task.assigned_user_id
    {
        crate::handlers::notify(
            store,
            assignee_id,
            NotificationType::Paiement,
            "Paiement généré",
            format!(
                "Un paiement de {} FCFA a été généré pour la tâche \"{}\"",
                crate::format_amount(payment.amount),
                change.task.title
            ),
            Some((&payment.id, "transaction")),
        );
    }

    match super::task_with_assignee_json(store, &change.task) {
        Ok(payload) => ("200 OK", payload),
        Err(resp) => resp,
    }
}
