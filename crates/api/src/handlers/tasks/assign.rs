#![forbid(unsafe_code)]

use crate::server::{ApiResponse, HttpRequest, bad_request, forbidden, internal_error, not_found};
use om_core::notify::NotificationType;
use om_core::roles::UserRole;
use om_storage::{SqliteStore, StoreError, TaskAssignment, UserRow};

pub(crate) fn assign(
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
    if !crate::handlers::projects::can_edit_project(user, &project) {
        return forbidden("Permissions insuffisantes pour assigner cette tâche");
    }

    let body = match crate::parse_json_body(&request.body) {
        Ok(body) => body,
        Err(resp) => return resp,
    };
    let assigned_user_id = match crate::require_string(&body, "assignedUserId", 1, "Utilisateur requis")
    {
        Ok(value) => value,
        Err(resp) => return resp,
    };
    let estimated_hours = crate::optional_f64(&body, "estimatedHours");
    if let Some(hours) = estimated_hours
        && hours < 1.0
    {
        return bad_request("Les heures estimées doivent être supérieures à 0");
    }
    let budget = crate::optional_f64(&body, "budget");
    if let Some(budget) = budget
        && budget < 0.0
    {
        return bad_request("Le budget doit être positif");
    }

    let assignee = match store.user_by_id(&assigned_user_id) {
        Ok(Some(assignee)) => assignee,
        Ok(None) => return not_found("Utilisateur non trouvé"),
        Err(err) => return internal_error(err),
    };
    if UserRole::parse(&assignee.role) != Some(UserRole::Consultant) {
        return bad_request("Seuls les consultants peuvent être assignés aux tâches");
    }

    let task = match store.assign_task(
        id,
        TaskAssignment {
            assigned_user_id: assigned_user_id.clone(),
            estimated_hours,
            budget,
        },
    ) {
        Ok(task) => task,
        Err(StoreError::UnknownId) => return not_found("Tâche non trouvée"),
        Err(err) => return internal_error(err),
    };

    crate::handlers::notify(
        store,
        &assigned_user_id,
        NotificationType::AssignationTache,
        "Nouvelle tâche assignée",
        format!(
            "Vous avez été assigné à la tâche \"{}\" du projet \"{}\"",
            task.title, project.title
        ),
        Some((&task.id, "task")),
    );

    match super::task_with_assignee_json(store, &task) {
        Ok(payload) => ("200 OK", payload),
        Err(resp) => resp,
    }
}
