#![forbid(unsafe_code)]

use crate::server::{ApiResponse, HttpRequest, forbidden, internal_error, not_found};
use om_storage::{SqliteStore, UserRow};

pub(crate) fn task_create(
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
        return forbidden("Permissions insuffisantes");
    }
    let body = match crate::parse_json_body(&request.body) {
        Ok(body) => body,
        Err(resp) => return resp,
    };

    let task = match crate::handlers::tasks::create_in_project(store, user, &project, &body) {
        Ok(task) => task,
        Err(resp) => return resp,
    };
    match crate::handlers::tasks::task_with_assignee_json(store, &task) {
        Ok(payload) => ("201 Created", payload),
        Err(resp) => resp,
    }
}
