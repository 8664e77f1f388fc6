#![forbid(unsafe_code)]

use crate::server::{ApiResponse, internal_error};
use om_storage::{SqliteStore, TransactionFilter, UserRow};
use serde_json::{Value, json};

/// Director dashboard: global counters, task split, cash position and
/// the latest activity.
pub(crate) fn overview(store: &mut SqliteStore, user: &UserRow) -> ApiResponse {
    if let Err(resp) = crate::require_director(user) {
        return resp;
    }
    let counters = match store.dashboard_counters() {
        Ok(counters) => counters,
        Err(err) => return internal_error(err),
    };
    let unread = match store.unread_count(&user.id) {
        Ok(count) => count,
        Err(err) => return internal_error(err),
    };
    let by_status = match store.task_status_totals() {
        Ok(counts) => counts,
        Err(err) => return internal_error(err),
    };
    let summary = match store.transaction_summary(&TransactionFilter::default()) {
        Ok(summary) => summary,
        Err(err) => return internal_error(err),
    };
    let recent_transactions = match store.list_transactions(&TransactionFilter {
        limit: 5,
        ..TransactionFilter::default()
    }) {
        Ok((rows, _)) => rows,
        Err(err) => return internal_error(err),
    };
    let recent_projects = match store.recent_projects(5) {
        Ok(rows) => rows,
        Err(err) => return internal_error(err),
    };

    let transactions_json: Vec<Value> = recent_transactions
        .iter()
        .map(crate::transaction_json)
        .collect();
    let projects_json: Vec<Value> = recent_projects
        .iter()
        .map(|project| {
            json!({
                "id": project.id,
                "title": project.title,
                "status": project.status,
                "createdAt": crate::ts_ms_to_rfc3339(project.created_ms),
            })
        })
        .collect();

    (
        "200 OK",
        json!({
            "counters": {
                "projects": counters.projects,
                "tasks": counters.tasks,
                "consultants": counters.consultants,
                "unreadNotifications": unread,
            },
            "tasks": {
                "byStatus": {
                    "aFaire": by_status.a_faire,
                    "enCours": by_status.en_cours,
                    "termine": by_status.termine,
                },
            },
            "finance": {
                "totalEntrees": summary.total_entrees,
                "totalSorties": summary.total_sorties,
                "balance": summary.balance(),
            },
            "recent": {
                "transactions": transactions_json,
                "projects": projects_json,
            },
            "generatedAt": crate::now_rfc3339(),
        }),
    )
}
