#![forbid(unsafe_code)]

use crate::server::{ApiResponse, HttpRequest, bad_request, forbidden, internal_error, not_found};
use om_core::email::is_valid_email;
use om_core::status::{Priority, ProjectStatus};
use om_storage::{ProjectUpdate, SqliteStore, StoreError, UserRow};
use serde_json::Value;

pub(crate) fn update(
    store: &mut SqliteStore,
    user: &UserRow,
    id: &str,
    request: &HttpRequest,
) -> ApiResponse {
    let project = match store.project_by_id(id) {
        Ok(Some(project)) => project,
        Ok(None) => return not_found("Projet non trouvé"),
        Err(err) => return internal_error(err),
    };
    if !super::can_edit_project(user, &project) {
        return forbidden("Permissions insuffisantes pour modifier ce projet");
    }
    let body = match crate::parse_json_body(&request.body) {
        Ok(body) => body,
        Err(resp) => return resp,
    };

    let mut changes = ProjectUpdate::default();
    if body.contains_key("title") {
        changes.title = match crate::require_string(
            &body,
            "title",
            3,
            "Le titre doit contenir au moins 3 caractères",
        ) {
            Ok(value) => Some(value),
            Err(resp) => return resp,
        };
    }
    if body.contains_key("description") {
        changes.description = match crate::require_string(
            &body,
            "description",
            10,
            "La description doit contenir au moins 10 caractères",
        ) {
            Ok(value) => Some(value),
            Err(resp) => return resp,
        };
    }
    if let Some(budget) = crate::optional_f64(&body, "budget") {
        if budget < 0.0 {
            return bad_request("Le budget doit être positif");
        }
        changes.budget = Some(budget);
    }
    if let Some(hours) = crate::optional_f64(&body, "estimatedHours") {
        if hours < 1.0 {
            return bad_request("Les heures estimées doivent être supérieures à 0");
        }
        changes.estimated_hours = Some(hours);
    }
    if let Some(hours) = crate::optional_f64(&body, "actualHours") {
        if hours < 0.0 {
            return bad_request("Les heures réelles doivent être positives");
        }
        changes.actual_hours = Some(hours);
    }
    if let Some(value) = body.get("status").and_then(Value::as_str) {
        match ProjectStatus::parse(value) {
            Some(status) => changes.status = Some(status.as_str().to_string()),
            None => return bad_request("Statut invalide"),
        }
    }
    if let Some(value) = body.get("priority").and_then(Value::as_str) {
        match Priority::parse(value) {
            Some(priority) => changes.priority = Some(priority.as_str().to_string()),
            None => return bad_request("Priorité invalide"),
        }
    }
    changes.start_ms = match crate::optional_date(&body, "startDate", "Date de début invalide") {
        Ok(value) => value,
        Err(resp) => return resp,
    };
    changes.end_ms = match crate::optional_date(&body, "endDate", "Date de fin invalide") {
        Ok(value) => value,
        Err(resp) => return resp,
    };
    changes.deadline_ms = match crate::optional_date(&body, "deadline", "Date limite invalide") {
        Ok(value) => value,
        Err(resp) => return resp,
    };
    changes.client_name = crate::optional_string(&body, "clientName");
    if let Some(email) = crate::optional_string(&body, "clientEmail") {
        if !is_valid_email(&email) {
            return bad_request("Email client invalide");
        }
        changes.client_email = Some(email);
    }
    changes.client_phone = crate::optional_string(&body, "clientPhone");
    if let Some(manager_id) = crate::optional_string(&body, "managerId") {
        match store.user_by_id(&manager_id) {
            Ok(Some(_)) => changes.manager_id = Some(manager_id),
            Ok(None) => return not_found("Utilisateur non trouvé"),
            Err(err) => return internal_error(err),
        }
    }

    let updated = match store.update_project(id, changes) {
        Ok(project) => project,
        Err(StoreError::UnknownId) => return not_found("Projet non trouvé"),
        Err(err) => return internal_error(err),
    };
    match super::project_with_parties_json(store, &updated) {
        Ok(payload) => ("200 OK", payload),
        Err(resp) => resp,
    }
}
