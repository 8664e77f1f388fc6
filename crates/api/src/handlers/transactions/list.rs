#![forbid(unsafe_code)]

use crate::server::{ApiResponse, HttpRequest, bad_request, internal_error};
use om_storage::{SqliteStore, TransactionFilter, UserRow};
use serde_json::json;

pub(crate) fn list(store: &mut SqliteStore, user: &UserRow, request: &HttpRequest) -> ApiResponse {
    if let Err(resp) = crate::require_director(user) {
        return resp;
    }
    let page = crate::page_param(&request.path);
    let limit = crate::limit_param(&request.path, 20);

    let min_ms = match crate::query_param(&request.path, "startDate") {
        Some(raw) => match crate::parse_date_ms(&raw) {
            Some(ms) => Some(ms),
            None => return bad_request("Date de début invalide"),
        },
        None => None,
    };
    let max_ms = match crate::query_param(&request.path, "endDate") {
        Some(raw) => match crate::parse_date_ms(&raw) {
            Some(ms) => Some(ms),
            None => return bad_request("Date de fin invalide"),
        },
        None => None,
    };
    let is_paid = match crate::query_param(&request.path, "isPaid").as_deref() {
        Some("true") => Some(true),
        Some("false") => Some(false),
        _ => None,
    };

    let filter = TransactionFilter {
        tx_type: crate::query_param(&request.path, "type"),
        category: crate::query_param(&request.path, "category"),
        project_id: crate::query_param(&request.path, "projectId"),
        consultant_id: crate::query_param(&request.path, "consultantId"),
        min_ms,
        max_ms,
        is_paid,
        limit,
        offset: (page - 1) * limit,
    };
    let (transactions, total) = match store.list_transactions(&filter) {
        Ok(result) => result,
        Err(err) => return internal_error(err),
    };
    // The summary spans the whole filter, not just the current page.
    let summary = match store.transaction_summary(&filter) {
        Ok(summary) => summary,
        Err(err) => return internal_error(err),
    };

    let mut items = Vec::with_capacity(transactions.len());
    for transaction in &transactions {
        match super::transaction_with_links_json(store, transaction) {
            Ok(payload) => items.push(payload),
            Err(resp) => return resp,
        }
    }

    (
        "200 OK",
        json!({
            "transactions": items,
            "pagination": crate::pagination_json(page, limit, total),
            "summary": {
                "totalTransactions": summary.total_transactions,
                "totalAmount": summary.total_amount,
                "totalEntrees": summary.total_entrees,
                "totalSorties": summary.total_sorties,
                "balance": summary.balance(),
            },
        }),
    )
}
