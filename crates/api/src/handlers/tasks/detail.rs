#![forbid(unsafe_code)]

use crate::server::{ApiResponse, forbidden, internal_error, not_found};
use om_storage::{SqliteStore, UserRow};

pub(crate) fn detail(store: &mut SqliteStore, user: &UserRow, id: &str) -> ApiResponse {
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
        return forbidden("Accès non autorisé à cette tâche");
    }

    match super::task_with_project_json(store, &task) {
        Ok(payload) => ("200 OK", payload),
        Err(resp) => resp,
    }
}
