#![forbid(unsafe_code)]

mod assign;
mod create;
mod detail;
mod list;
mod status;

pub(crate) use assign::*;
pub(crate) use create::*;
pub(crate) use detail::*;
pub(crate) use list::*;
pub(crate) use status::*;

use crate::server::{ApiResponse, bad_request, internal_error, not_found};
use om_core::notify::NotificationType;
use om_core::status::Priority;
use om_storage::{NewTask, ProjectRow, SqliteStore, StoreError, TaskRow, UserRow};
use serde_json::{Map, Value, json};

pub(crate) fn task_with_assignee_json(
    store: &SqliteStore,
    task: &TaskRow,
) -> Result<Value, ApiResponse> {
    let mut payload = crate::task_json(task);
    let assignee = match &task.assigned_user_id {
        Some(user_id) => store
            .user_lite(user_id)
            .map_err(internal_error)?
            .map(|lite| crate::user_lite_json(&lite))
            .unwrap_or(Value::Null),
        None => Value::Null,
    };
    if let Some(map) = payload.as_object_mut() {
        map.insert("assignee".to_string(), assignee);
    }
    Ok(payload)
}

/// Listing/detail shape: assignee plus a project digest.
pub(crate) fn task_with_project_json(
    store: &SqliteStore,
    task: &TaskRow,
) -> Result<Value, ApiResponse> {
    let mut payload = task_with_assignee_json(store, task)?;
    let project = store.project_by_id(&task.project_id).map_err(internal_error)?;
    let digest = match project {
        Some(project) => json!({
            "id": project.id,
            "title": project.title,
            "status": project.status,
        }),
        None => Value::Null,
    };
    if let Some(map) = payload.as_object_mut() {
        map.insert("project".to_string(), digest);
    }
    Ok(payload)
}

/// Shared task-creation core behind `POST /api/tasks` and
/// `POST /api/projects/{id}/tasks`: validation, the project budget
/// guard, and the assignee notification.
pub(crate) fn create_in_project(
    store: &mut SqliteStore,
    user: &UserRow,
    project: &ProjectRow,
    body: &Map<String, Value>,
) -> Result<TaskRow, ApiResponse> {
    let title = crate::require_string(body, "title", 3, "Le titre doit contenir au moins 3 caractères")?;
    let description = crate::require_string(
        body,
        "description",
        5,
        "La description doit contenir au moins 5 caractères",
    )?;
    let budget = crate::optional_f64(body, "budget").unwrap_or(0.0);
    if budget < 0.0 {
        return Err(bad_request("Le budget doit être positif"));
    }
    let estimated_hours = crate::require_f64(
        body,
        "estimatedHours",
        "Les heures estimées doivent être supérieures à 0",
    )?;
    if estimated_hours < 1.0 {
        return Err(bad_request("Les heures estimées doivent être supérieures à 0"));
    }
    let priority = match body.get("priority").and_then(Value::as_str) {
        Some(value) => match Priority::parse(value) {
            Some(priority) => priority,
            None => return Err(bad_request("Priorité invalide")),
        },
        None => Priority::Moyenne,
    };
    let deadline_ms = crate::optional_date(body, "deadline", "Date limite invalide")?;

    let assigned_user_id = crate::optional_string(body, "assignedUserId");
    if let Some(assignee_id) = &assigned_user_id {
        match store.user_by_id(assignee_id) {
            Ok(Some(_)) => {}
            Ok(None) => return Err(not_found("Utilisateur non trouvé")),
            Err(err) => return Err(internal_error(err)),
        }
    }
    let parent_task_id = crate::optional_string(body, "parentTaskId");
    if let Some(parent_id) = &parent_task_id {
        match store.task_by_id(parent_id) {
            Ok(Some(parent)) if parent.project_id == project.id => {}
            Ok(_) => {
                return Err(bad_request("La tâche parente doit appartenir au même projet"));
            }
            Err(err) => return Err(internal_error(err)),
        }
    }

    let task = match store.create_task(NewTask {
        project_id: project.id.clone(),
        title,
        description,
        budget,
        estimated_hours,
        priority: priority.as_str().to_string(),
        deadline_ms,
        assigned_user_id: assigned_user_id.clone(),
        parent_task_id,
    }) {
        Ok(task) => task,
        Err(StoreError::BudgetExceeded { remaining }) => {
            return Err(crate::server::api_error(
                "400 Bad Request",
                "INVALID_INPUT",
                "Budget insuffisant pour cette tâche",
                Some(&format!(
                    "Budget restant: {} FCFA",
                    crate::format_amount(remaining)
                )),
            ));
        }
        Err(StoreError::UnknownId) => return Err(not_found("Projet non trouvé")),
        Err(err) => return Err(internal_error(err)),
    };

    if let Some(assignee_id) = &assigned_user_id
        && assignee_id != &user.id
    {
        crate::handlers::notify(
            store,
            assignee_id,
            NotificationType::AssignationTache,
            "Nouvelle tâche assignée",
            format!("Vous avez une nouvelle tâche: \"{}\"", task.title),
            Some((&task.id, "task")),
        );
    }
    Ok(task)
}
