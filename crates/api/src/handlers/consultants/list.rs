#![forbid(unsafe_code)]

use crate::server::{ApiResponse, HttpRequest, internal_error};
use om_storage::{ConsultantFilter, ConsultantSort, SqliteStore};
use serde_json::json;

pub(crate) fn list(store: &mut SqliteStore, request: &HttpRequest) -> ApiResponse {
    let page = crate::page_param(&request.path);
    let limit = crate::limit_param(&request.path, 20);
    let sort_by = match crate::query_param(&request.path, "sortBy").as_deref() {
        Some("experience") => ConsultantSort::Experience,
        Some("tjm") => ConsultantSort::Tjm,
        Some("name") => ConsultantSort::Name,
        _ => ConsultantSort::Reliability,
    };
    let sort_desc = crate::query_param(&request.path, "sortOrder").as_deref() != Some("asc");
    let available = match crate::query_param(&request.path, "available").as_deref() {
        Some("true") => Some(true),
        Some("false") => Some(false),
        _ => None,
    };

    let filter = ConsultantFilter {
        search: crate::query_param(&request.path, "search"),
        skill: crate::query_param(&request.path, "skill"),
        available,
        sort_by,
        sort_desc,
        limit,
        offset: (page - 1) * limit,
    };
    let (consultants, total) = match store.list_consultants(&filter) {
        Ok(result) => result,
        Err(err) => return internal_error(err),
    };

    let mut items = Vec::with_capacity(consultants.len());
    for consultant in &consultants {
        let mut payload = match super::consultant_with_user_json(store, consultant) {
            Ok(payload) => payload,
            Err(resp) => return resp,
        };
        let snapshot = match store.consultant_snapshot(consultant) {
            Ok(snapshot) => snapshot,
            Err(err) => return internal_error(err),
        };
        if let Some(map) = payload.as_object_mut() {
            map.insert(
                "stats".to_string(),
                json!({
                    "totalTasks": snapshot.total_tasks,
                    "completedTasks": snapshot.completed_tasks,
                    "completionRate": snapshot.completion_rate,
                    "avgReliability": snapshot.reliability,
                    "totalEarnings": snapshot.total_earnings,
                }),
            );
        }
        items.push(payload);
    }

    (
        "200 OK",
        json!({
            "consultants": items,
            "pagination": crate::pagination_json(page, limit, total),
        }),
    )
}
