#![forbid(unsafe_code)]

use crate::server::{ApiResponse, HttpRequest, forbidden, internal_error, not_found};
use om_core::roles::UserRole;
use om_storage::{SqliteStore, UserRow};

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
    let project_id = match crate::require_string(&body, "projectId", 1, "Projet requis") {
        Ok(value) => value,
        Err(resp) => return resp,
    };
    let project = match store.project_by_id(&project_id) {
        Ok(Some(project)) => project,
        Ok(None) => return not_found("Projet non trouvé"),
        Err(err) => return internal_error(err),
    };
    if !crate::handlers::projects::can_edit_project(user, &project) {
        return forbidden("Permissions insuffisantes pour créer une tâche sur ce projet");
    }

    let task = match super::create_in_project(store, user, &project, &body) {
        Ok(task) => task,
        Err(resp) => return resp,
    };
    match super::task_with_assignee_json(store, &task) {
        Ok(payload) => ("201 Created", payload),
        Err(resp) => resp,
    }
}
