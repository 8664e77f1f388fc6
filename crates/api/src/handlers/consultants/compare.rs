#![forbid(unsafe_code)]

use crate::server::{ApiResponse, HttpRequest, bad_request, internal_error, not_found};
use om_storage::{ConsultantRow, SqliteStore, UserRow};
use serde_json::{Value, json};

/// Side-by-side view of exactly two consultants. The hour ratio here is
/// uncapped, unlike the per-consultant stats endpoint.
pub(crate) fn compare(store: &mut SqliteStore, user: &UserRow, request: &HttpRequest) -> ApiResponse {
    if let Err(resp) = crate::require_director(user) {
        return resp;
    }
    let ids_param = match crate::query_param(&request.path, "ids") {
        Some(value) => value,
        None => return bad_request("Paramètre ids requis"),
    };
    let ids: Vec<&str> = ids_param
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .collect();
    if ids.len() != 2 {
        return bad_request("Exactement 2 consultants doivent être comparés");
    }

    let mut consultants: Vec<ConsultantRow> = Vec::with_capacity(2);
    for id in &ids {
        match store.consultant_by_id(id) {
            Ok(Some(consultant)) => consultants.push(consultant),
            Ok(None) => return not_found("Un ou plusieurs consultants non trouvés"),
            Err(err) => return internal_error(err),
        }
    }

    let mut sides: Vec<Value> = Vec::with_capacity(2);
    for consultant in &consultants {
        let payload = match super::consultant_with_user_json(store, consultant) {
            Ok(payload) => payload,
            Err(resp) => return resp,
        };
        let activity = match store.consultant_activity(consultant) {
            Ok(activity) => activity,
            Err(err) => return internal_error(err),
        };
        let completion_rate = if activity.total_tasks > 0 {
            (activity.completed_tasks as f64 * 100.0 / activity.total_tasks as f64).round() as i64
        } else {
            0
        };
        sides.push(json!({
            "consultant": payload,
            "stats": {
                "totalTasks": activity.total_tasks,
                "completedTasks": activity.completed_tasks,
                "completionRate": completion_rate,
                "timeAccuracy": (activity.avg_ratio_raw * 100.0).round() as i64,
                "reliability": ((2.0 - activity.avg_ratio_raw) * 100.0).round() as i64,
                "totalHours": activity.total_hours_worked,
                "totalEarnings": activity.total_earnings,
                "avgTaskDuration": activity.avg_task_duration_days,
                "recentProjects": activity.recent_project_titles,
            },
        }));
    }

    (
        "200 OK",
        json!({
            "consultants": sides,
            "comparisonDate": crate::now_rfc3339(),
        }),
    )
}
