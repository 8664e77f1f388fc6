#![forbid(unsafe_code)]

use crate::server::{ApiResponse, internal_error, not_found};
use om_storage::{SqliteStore, UserRow};
use serde_json::json;

/// Projects with tasks are archived rather than removed so their
/// history stays reachable from the ledger.
pub(crate) fn delete(store: &mut SqliteStore, user: &UserRow, id: &str) -> ApiResponse {
    if let Err(resp) = crate::require_director(user) {
        return resp;
    }
    match store.project_by_id(id) {
        Ok(Some(_)) => {}
        Ok(None) => return not_found("Projet non trouvé"),
        Err(err) => return internal_error(err),
    }
    match store.delete_project(id) {
        Ok(true) => ("200 OK", json!({ "message": "Projet archivé avec succès" })),
        Ok(false) => ("200 OK", json!({ "message": "Projet supprimé avec succès" })),
        Err(err) => internal_error(err),
    }
}
