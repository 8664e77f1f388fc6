#![forbid(unsafe_code)]

use crate::server::{ApiResponse, HttpRequest, internal_error};
use om_storage::{PeriodGroup, SqliteStore, TransactionFilter, UserRow};
use serde_json::{Value, json};

/// Finance dashboard: filtered totals, category split, top
/// counterparties and a bucketed timeline.
pub(crate) fn stats(store: &mut SqliteStore, user: &UserRow, request: &HttpRequest) -> ApiResponse {
    if let Err(resp) = crate::require_director(user) {
        return resp;
    }
    let period = crate::query_param(&request.path, "period").unwrap_or_else(|| "12m".to_string());
    // Unknown period values fall through to the all-time view.
    let min_ms = match period.as_str() {
        "1m" => Some(crate::month_start_ms(0)),
        "3m" => Some(crate::month_start_ms(2)),
        "6m" => Some(crate::month_start_ms(5)),
        "12m" => Some(crate::month_start_ms(11)),
        _ => None,
    };
    let group = match crate::query_param(&request.path, "groupBy").as_deref() {
        Some("day") => PeriodGroup::Day,
        Some("week") => PeriodGroup::Week,
        _ => PeriodGroup::Month,
    };
    let periods = match group {
        PeriodGroup::Month => match period.as_str() {
            "1m" => 1,
            "3m" => 3,
            "6m" => 6,
            _ => 12,
        },
        PeriodGroup::Week => match period.as_str() {
            "1m" => 4,
            "3m" => 12,
            "6m" => 26,
            _ => 52,
        },
        PeriodGroup::Day => match period.as_str() {
            "1m" => 30,
            "3m" => 90,
            "6m" => 180,
            _ => 365,
        },
    };

    let filter = TransactionFilter {
        min_ms,
        ..TransactionFilter::default()
    };
    let summary = match store.transaction_summary(&filter) {
        Ok(summary) => summary,
        Err(err) => return internal_error(err),
    };
    let categories = match store.category_breakdown(min_ms) {
        Ok(rows) => rows,
        Err(err) => return internal_error(err),
    };
    let top_projects = match store.top_projects(min_ms, 10) {
        Ok(rows) => rows,
        Err(err) => return internal_error(err),
    };
    let top_consultants = match store.top_consultants(min_ms, 10) {
        Ok(rows) => rows,
        Err(err) => return internal_error(err),
    };
    let timeline = match store.transaction_timeline(group, periods) {
        Ok(buckets) => buckets,
        Err(err) => return internal_error(err),
    };

    let category_json: Vec<Value> = categories
        .iter()
        .map(|row| {
            json!({
                "category": row.category,
                "type": row.tx_type,
                "amount": row.amount,
                "count": row.count,
            })
        })
        .collect();
    let projects_json: Vec<Value> = top_projects
        .iter()
        .map(|row| {
            json!({
                "projectId": row.id,
                "project": row.label.as_deref().unwrap_or("Projet supprimé"),
                "amount": row.amount,
                "count": row.count,
            })
        })
        .collect();
    let consultants_json: Vec<Value> = top_consultants
        .iter()
        .map(|row| {
            json!({
                "consultantId": row.id,
                "consultant": row.label.as_deref().unwrap_or("Consultant supprimé"),
                "amount": row.amount,
                "count": row.count,
            })
        })
        .collect();
    let timeline_json: Vec<Value> = timeline
        .iter()
        .map(|bucket| {
            json!({
                "period": bucket.period,
                "entrees": bucket.entrees,
                "sorties": bucket.sorties,
                "balance": bucket.entrees - bucket.sorties,
            })
        })
        .collect();

    (
        "200 OK",
        json!({
            "summary": {
                "total": {"amount": summary.total_amount, "count": summary.total_transactions},
                "entrees": {"amount": summary.total_entrees, "count": summary.entrees_count},
                "sorties": {"amount": summary.total_sorties, "count": summary.sorties_count},
                "balance": summary.balance(),
            },
            "categoryBreakdown": category_json,
            "topProjects": projects_json,
            "topConsultants": consultants_json,
            "timeline": timeline_json,
            "period": period,
            "generatedAt": crate::now_rfc3339(),
        }),
    )
}
