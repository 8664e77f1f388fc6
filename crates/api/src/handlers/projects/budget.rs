#![forbid(unsafe_code)]

use crate::server::{ApiResponse, HttpRequest, bad_request, forbidden, internal_error, not_found};
use om_storage::{SqliteStore, StoreError, UserRow};
use serde_json::json;

pub(crate) fn budget(
    store: &mut SqliteStore,
    user: &UserRow,
    id: &str,
    request: &HttpRequest,
) -> ApiResponse {
    let project = match store.project_by_id(id) {
        Ok(Some(project)) => project,
        Ok(None) => return not_found("Projet non trouvé"),
        Err(err) => return internal_error(err),
    };
    if !super::can_edit_project(user, &project) {
        return forbidden("Permissions insuffisantes pour modifier ce projet");
    }
    let body = match crate::parse_json_body(&request.body) {
        Ok(body) => body,
        Err(resp) => return resp,
    };
    let budget = match crate::require_f64(&body, "budget", "Le budget doit être positif") {
        Ok(value) if value >= 0.0 => value,
        Ok(_) => return bad_request("Le budget doit être positif"),
        Err(resp) => return resp,
    };
    let mut description = format!("Modification budget projet: {}", project.title);
    if let Some(reason) = crate::optional_string(&body, "reason") {
        description.push_str(" - ");
        description.push_str(&reason);
    }

    let (updated, transaction) = match store.update_project_budget(id, budget, &description) {
        Ok(result) => result,
        Err(StoreError::UnknownId) => return not_found("Projet non trouvé"),
        Err(err) => return internal_error(err),
    };
    (
        "200 OK",
        json!({
            "project": crate::project_json(&updated),
            "transaction": transaction.as_ref().map(crate::transaction_json),
        }),
    )
}
