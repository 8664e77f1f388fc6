#![forbid(unsafe_code)]

use crate::server::{ApiResponse, HttpRequest, internal_error};
use om_storage::{ProjectFilter, SqliteStore, UserRow};
use serde_json::json;

pub(crate) fn list(store: &mut SqliteStore, user: &UserRow, request: &HttpRequest) -> ApiResponse {
    let page = crate::page_param(&request.path);
    let limit = crate::limit_param(&request.path, 10);
    let viewer = if crate::is_director(user) {
        None
    } else {
        Some(user.id.clone())
    };
    let filter = ProjectFilter {
        viewer,
        status: crate::query_param(&request.path, "status"),
        search: crate::query_param(&request.path, "search"),
        limit,
        offset: (page - 1) * limit,
    };

    let (projects, total) = match store.list_projects(&filter) {
        Ok(result) => result,
        Err(err) => return internal_error(err),
    };
    let mut items = Vec::with_capacity(projects.len());
    for project in &projects {
        match super::project_card_json(store, project) {
            Ok(payload) => items.push(payload),
            Err(resp) => return resp,
        }
    }

    (
        "200 OK",
        json!({
            "projects": items,
            "pagination": crate::pagination_json(page, limit, total),
        }),
    )
}
