#![forbid(unsafe_code)]

use crate::server::{ApiResponse, forbidden, internal_error, not_found};
use om_storage::{SqliteStore, UserRow};
use serde_json::Value;
use std::collections::HashMap;

pub(crate) fn detail(store: &mut SqliteStore, user: &UserRow, id: &str) -> ApiResponse {
    let project = match store.project_by_id(id) {
        Ok(Some(project)) => project,
        Ok(None) => return not_found("Projet non trouvé"),
        Err(err) => return internal_error(err),
    };
    match super::can_view_project(store, user, &project) {
        Ok(true) => {}
        Ok(false) => return forbidden("Accès non autorisé à ce projet"),
        Err(resp) => return resp,
    }

    let mut payload = match super::project_with_parties_json(store, &project) {
        Ok(payload) => payload,
        Err(resp) => return resp,
    };

    let tasks = match store.list_project_tasks(&project.id, None) {
        Ok(tasks) => tasks,
        Err(err) => return internal_error(err),
    };
    // Nest subtasks under their parent; ordering inside each level is
    // the storage order (position, then created).
    let mut children: HashMap<String, Vec<Value>> = HashMap::new();
    for task in tasks.iter().filter(|task| task.parent_task_id.is_some()) {
        let entry = match crate::handlers::tasks::task_with_assignee_json(store, task) {
            Ok(entry) => entry,
            Err(resp) => return resp,
        };
        if let Some(parent_id) = &task.parent_task_id {
            children.entry(parent_id.clone()).or_default().push(entry);
        }
    }
    let mut roots = Vec::new();
    for task in tasks.iter().filter(|task| task.parent_task_id.is_none()) {
        let mut entry = match crate::handlers::tasks::task_with_assignee_json(store, task) {
            Ok(entry) => entry,
            Err(resp) => return resp,
        };
        if let Some(map) = entry.as_object_mut() {
            map.insert(
                "subtasks".to_string(),
                Value::Array(children.remove(&task.id).unwrap_or_default()),
            );
        }
        roots.push(entry);
    }

    let transactions = match store.project_transactions(&project.id, 5) {
        Ok(rows) => rows,
        Err(err) => return internal_error(err),
    };
    let (task_count, transaction_count) = match store.project_counts(&project.id) {
        Ok(counts) => counts,
        Err(err) => return internal_error(err),
    };

    if let Some(map) = payload.as_object_mut() {
        map.insert("tasks".to_string(), Value::Array(roots));
        map.insert(
            "transactions".to_string(),
            Value::Array(
                transactions
                    .iter()
                    .map(crate::transaction_json)
                    .collect::<Vec<_>>(),
            ),
        );
        map.insert(
            "counts".to_string(),
            serde_json::json!({ "tasks": task_count, "transactions": transaction_count }),
        );
    }
    ("200 OK", payload)
}
