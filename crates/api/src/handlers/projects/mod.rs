#![forbid(unsafe_code)]

mod budget;
mod create;
mod delete;
mod detail;
mod list;
mod task_create;
mod task_list;
mod update;

pub(crate) use budget::*;
pub(crate) use create::*;
pub(crate) use delete::*;
pub(crate) use detail::*;
pub(crate) use list::*;
pub(crate) use task_create::*;
pub(crate) use task_list::*;
pub(crate) use update::*;

use crate::server::{ApiResponse, internal_error};
use om_storage::{ProjectRow, SqliteStore, UserRow};
use serde_json::{Value, json};

pub(crate) fn can_edit_project(user: &UserRow, project: &ProjectRow) -> bool {
    crate::is_director(user)
        || project.creator_id == user.id
        || project.manager_id.as_deref() == Some(user.id.as_str())
}

/// Viewing additionally covers consultants assigned to any task of the
/// project.
pub(crate) fn can_view_project(
    store: &SqliteStore,
    user: &UserRow,
    project: &ProjectRow,
) -> Result<bool, ApiResponse> {
    if can_edit_project(user, project) {
        return Ok(true);
    }
    let own_tasks = store
        .list_project_tasks(&project.id, Some(&user.id))
        .map_err(internal_error)?;
    Ok(!own_tasks.is_empty())
}

fn lite_or_null(store: &SqliteStore, user_id: Option<&str>) -> Result<Value, ApiResponse> {
    let Some(user_id) = user_id else {
        return Ok(Value::Null);
    };
    let user = store.user_lite(user_id).map_err(internal_error)?;
    Ok(user
        .map(|lite| crate::user_lite_json(&lite))
        .unwrap_or(Value::Null))
}

/// Project plus creator/manager contact summaries, the shape returned
/// by the create and update endpoints.
pub(crate) fn project_with_parties_json(
    store: &SqliteStore,
    project: &ProjectRow,
) -> Result<Value, ApiResponse> {
    let mut payload = crate::project_json(project);
    if let Some(map) = payload.as_object_mut() {
        map.insert(
            "creator".to_string(),
            lite_or_null(store, Some(&project.creator_id))?,
        );
        map.insert(
            "manager".to_string(),
            lite_or_null(store, project.manager_id.as_deref())?,
        );
    }
    Ok(payload)
}

/// Listing entry: parties plus a task digest and row counts.
pub(crate) fn project_card_json(
    store: &SqliteStore,
    project: &ProjectRow,
) -> Result<Value, ApiResponse> {
    let mut payload = project_with_parties_json(store, project)?;
    let tasks = store
        .list_project_tasks(&project.id, None)
        .map_err(internal_error)?;
    let mut digest = Vec::with_capacity(tasks.len());
    for task in &tasks {
        digest.push(json!({
            "id": task.id,
            "status": task.status,
            "assignee": lite_or_null(store, task.assigned_user_id.as_deref())?,
        }));
    }
    let (task_count, transaction_count) = store
        .project_counts(&project.id)
        .map_err(internal_error)?;
    if let Some(map) = payload.as_object_mut() {
        map.insert("tasks".to_string(), Value::Array(digest));
        map.insert(
            "counts".to_string(),
            json!({ "tasks": task_count, "transactions": transaction_count }),
        );
    }
    Ok(payload)
}
