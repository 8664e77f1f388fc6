#![forbid(unsafe_code)]

use crate::server::{ApiResponse, HttpRequest, bad_request, internal_error, not_found};
use om_core::email::is_valid_email;
use om_core::notify::NotificationType;
use om_core::roles::UserRole;
use om_core::status::Priority;
use om_storage::{NewProject, SqliteStore, UserRow};
use serde_json::Value;

pub(crate) fn create(
    store: &mut SqliteStore,
    user: &UserRow,
    request: &HttpRequest,
) -> ApiResponse {
    if let Err(resp) = crate::require_role(user, UserRole::Consultant) {
        return resp;
    }
    let body = match crate::parse_json_body(&request.body) {
        Ok(body) => body,
        Err(resp) => return resp,
    };

    let title = match crate::require_string(
        &body,
        "title",
        3,
        "Le titre doit contenir au moins 3 caractères",
    ) {
        Ok(value) => value,
        Err(resp) => return resp,
    };
    let description = match crate::require_string(
        &body,
        "description",
        10,
        "La description doit contenir au moins 10 caractères",
    ) {
        Ok(value) => value,
        Err(resp) => return resp,
    };
    let budget = match crate::require_f64(&body, "budget", "Le budget doit être positif") {
        Ok(value) if value >= 0.0 => value,
        Ok(_) => return bad_request("Le budget doit être positif"),
        Err(resp) => return resp,
    };
    let estimated_hours = match crate::require_f64(
        &body,
        "estimatedHours",
        "Les heures estimées doivent être supérieures à 0",
    ) {
        Ok(value) if value >= 1.0 => value,
        Ok(_) => return bad_request("Les heures estimées doivent être supérieures à 0"),
        Err(resp) => return resp,
    };
    let priority = match body.get("priority").and_then(Value::as_str) {
        Some(value) => match Priority::parse(value) {
            Some(priority) => priority,
            None => return bad_request("Priorité invalide"),
        },
        None => Priority::Moyenne,
    };
    let start_ms = match crate::optional_date(&body, "startDate", "Date de début invalide") {
        Ok(value) => value,
        Err(resp) => return resp,
    };
    let end_ms = match crate::optional_date(&body, "endDate", "Date de fin invalide") {
        Ok(value) => value,
        Err(resp) => return resp,
    };
    let deadline_ms = match crate::optional_date(&body, "deadline", "Date limite invalide") {
        Ok(value) => value,
        Err(resp) => return resp,
    };
    let client_email = crate::optional_string(&body, "clientEmail");
    if let Some(email) = &client_email
        && !is_valid_email(email)
    {
        return bad_request("Email client invalide");
    }
    let manager_id = crate::optional_string(&body, "managerId");
    if let Some(manager_id) = &manager_id {
        match store.user_by_id(manager_id) {
            Ok(Some(_)) => {}
            Ok(None) => return not_found("Utilisateur non trouvé"),
            Err(err) => return internal_error(err),
        }
    }

    let project = match store.create_project(NewProject {
        title,
        description,
        budget,
        estimated_hours,
        priority: priority.as_str().to_string(),
        start_ms,
        end_ms,
        deadline_ms,
        client_name: crate::optional_string(&body, "clientName"),
        client_email,
        client_phone: crate::optional_string(&body, "clientPhone"),
        creator_id: user.id.clone(),
        manager_id: manager_id.clone(),
    }) {
        Ok(project) => project,
        Err(err) => return internal_error(err),
    };

    if let Some(manager_id) = &manager_id
        && manager_id != &user.id
    {
        crate::handlers::notify(
            store,
            manager_id,
            NotificationType::AssignationTache,
            "Nouveau projet assigné",
            format!(
                "Vous avez été assigné comme manager du projet \"{}\"",
                project.title
            ),
            Some((&project.id, "project")),
        );
    }

    match super::project_with_parties_json(store, &project) {
        Ok(payload) => ("201 Created", payload),
        Err(resp) => resp,
    }
}
