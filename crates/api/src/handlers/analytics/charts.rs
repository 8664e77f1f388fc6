#![forbid(unsafe_code)]

use crate::server::{ApiResponse, internal_error};
use om_storage::{SqliteStore, UserRow};
use serde_json::{Value, json};

/// Twelve zero-filled calendar months of revenue, spend and opened
/// projects, oldest first.
pub(crate) fn charts(store: &mut SqliteStore, user: &UserRow) -> ApiResponse {
    if let Err(resp) = crate::require_director(user) {
        return resp;
    }
    let months = crate::trailing_months(12);
    let buckets = match store.monthly_finance(&months) {
        Ok(buckets) => buckets,
        Err(err) => return internal_error(err),
    };

    let items: Vec<Value> = buckets
        .iter()
        .map(|bucket| {
            json!({
                "month": bucket.month,
                "revenus": bucket.revenus,
                "depenses": bucket.depenses,
                "projets": bucket.projets,
            })
        })
        .collect();
    ("200 OK", Value::Array(items))
}
