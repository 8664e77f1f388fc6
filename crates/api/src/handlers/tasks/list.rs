#![forbid(unsafe_code)]

use crate::server::{ApiResponse, HttpRequest, internal_error};
use om_storage::{SqliteStore, TaskFilter, TaskSort, UserRow};
use serde_json::json;

pub(crate) fn list(store: &mut SqliteStore, user: &UserRow, request: &HttpRequest) -> ApiResponse {
    let page = crate::page_param(&request.path);
    let limit = crate::limit_param(&request.path, 20);
    let sort_by = match crate::query_param(&request.path, "sortBy").as_deref() {
        Some("deadline") => TaskSort::Deadline,
        Some("priority") => TaskSort::Priority,
        Some("title") => TaskSort::Title,
        _ => TaskSort::CreatedAt,
    };
    let sort_desc = crate::query_param(&request.path, "sortOrder").as_deref() != Some("asc");
    let assigned_user_id =
        if crate::query_param(&request.path, "assignedToMe").as_deref() == Some("true") {
            Some(user.id.clone())
        } else {
            None
        };
    let viewer = if crate::is_director(user) {
        None
    } else {
        Some(user.id.clone())
    };

    let filter = TaskFilter {
        viewer,
        search: crate::query_param(&request.path, "search"),
        status: crate::query_param(&request.path, "status"),
        priority: crate::query_param(&request.path, "priority"),
        project_id: crate::query_param(&request.path, "projectId"),
        assigned_user_id,
        sort_by,
        sort_desc,
        limit,
        offset: (page - 1) * limit,
    };
    let (tasks, total) = match store.list_tasks(&filter) {
        Ok(result) => result,
        Err(err) => return internal_error(err),
    };

    let mut items = Vec::with_capacity(tasks.len());
    for task in &tasks {
        match super::task_with_project_json(store, task) {
            Ok(payload) => items.push(payload),
            Err(resp) => return resp,
        }
    }
    (
        "200 OK",
        json!({
            "tasks": items,
            "pagination": crate::pagination_json(page, limit, total),
        }),
    )
}
