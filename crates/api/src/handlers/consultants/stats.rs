#![forbid(unsafe_code)]

use crate::server::{ApiResponse, forbidden, internal_error, not_found};
use om_storage::{SqliteStore, UserRow};
use serde_json::{Value, json};

/// Twelve-month performance view: task counters, hour-accuracy derived
/// reliability, salary totals and a month-by-month timeline.
pub(crate) fn stats(store: &mut SqliteStore, user: &UserRow, id: &str) -> ApiResponse {
    let consultant = match store.consultant_by_id(id) {
        Ok(Some(consultant)) => consultant,
        Ok(None) => return not_found("Consultant non trouvé"),
        Err(err) => return internal_error(err),
    };
    if !crate::is_director(user) && consultant.user_id != user.id {
        return forbidden("Permissions insuffisantes");
    }

    let activity = match store.consultant_activity(&consultant) {
        Ok(activity) => activity,
        Err(err) => return internal_error(err),
    };
    let months = crate::trailing_months(12);
    let timeline = match store.consultant_timeline(&consultant, &months) {
        Ok(buckets) => buckets,
        Err(err) => return internal_error(err),
    };
    let recent = match store.recent_assigned_tasks(&consultant.user_id, 10) {
        Ok(rows) => rows,
        Err(err) => return internal_error(err),
    };

    let completion_rate = if activity.total_tasks > 0 {
        (activity.completed_tasks as f64 * 100.0 / activity.total_tasks as f64).round() as i64
    } else {
        0
    };
    let avg_hours_per_task = if activity.timed_tasks > 0 {
        (activity.timed_hours / activity.timed_tasks as f64).round()
    } else {
        0.0
    };
    let avg_earnings_per_task = if activity.completed_tasks > 0 {
        (activity.total_earnings / activity.completed_tasks as f64).round()
    } else {
        0.0
    };

    let timeline_json: Vec<Value> = timeline
        .iter()
        .map(|bucket| {
            json!({
                "month": bucket.month,
                "tasksCompleted": bucket.tasks_completed,
                "hoursWorked": bucket.hours_worked,
                "earnings": bucket.earnings,
            })
        })
        .collect();
    let recent_json: Vec<Value> = recent
        .iter()
        .map(|(task, project_title)| {
            json!({
                "id": task.id,
                "title": task.title,
                "status": task.status,
                "project": project_title,
                "estimatedHours": task.estimated_hours,
                "actualHours": task.actual_hours,
                "createdAt": crate::ts_ms_to_rfc3339(task.created_ms),
            })
        })
        .collect();

    (
        "200 OK",
        json!({
            "overview": {
                "totalTasks": activity.total_tasks,
                "completedTasks": activity.completed_tasks,
                "inProgressTasks": activity.in_progress_tasks,
                "pendingTasks": activity.pending_tasks,
                "completionRate": completion_rate,
                "uniqueProjects": activity.unique_projects,
            },
            "performance": {
                "timeAccuracy": (activity.avg_ratio_capped * 100.0).round() as i64,
                "reliability": ((2.0 - activity.avg_ratio_capped) * 100.0).round() as i64,
                "avgHoursPerTask": avg_hours_per_task,
                "totalHoursWorked": activity.total_hours_worked,
            },
            "financial": {
                "totalEarnings": activity.total_earnings,
                "paidEarnings": activity.paid_earnings,
                "pendingEarnings": activity.total_earnings - activity.paid_earnings,
                "avgEarningsPerTask": avg_earnings_per_task,
                "totalTransactions": activity.salary_transactions,
            },
            "timeline": timeline_json,
            "recentTasks": recent_json,
        }),
    )
}
