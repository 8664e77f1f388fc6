#![forbid(unsafe_code)]

use crate::server::{ApiResponse, forbidden, internal_error, not_found};
use om_storage::{SqliteStore, UserRow};
use serde_json::Value;

/// Consultants who only reach the project through an assignment get
/// their own tasks; directors, creators and managers get all of them.
pub(crate) fn task_list(store: &mut SqliteStore, user: &UserRow, id: &str) -> ApiResponse {
    let project = match store.project_by_id(id) {
        Ok(Some(project)) => project,
        Ok(None) => return not_found("Projet non trouvé"),
        Err(err) => return internal_error(err),
    };
    let assignee_scope = if super::can_edit_project(user, &project) {
        None
    } else {
        Some(user.id.as_str())
    };
    let tasks = match store.list_project_tasks(&project.id, assignee_scope) {
        Ok(tasks) => tasks,
        Err(err) => return internal_error(err),
    };
    if assignee_scope.is_some() && tasks.is_empty() {
        return forbidden("Accès non autorisé");
    }

    let mut items = Vec::with_capacity(tasks.len());
    for task in &tasks {
        match crate::handlers::tasks::task_with_assignee_json(store, task) {
            Ok(payload) => items.push(payload),
            Err(resp) => return resp,
        }
    }
    ("200 OK", Value::Array(items))
}
