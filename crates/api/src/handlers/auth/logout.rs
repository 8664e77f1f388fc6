#![forbid(unsafe_code)]

use crate::server::{ApiResponse, HttpRequest, internal_error};
use om_storage::SqliteStore;
use serde_json::json;

pub(crate) fn logout(store: &mut SqliteStore, request: &HttpRequest) -> ApiResponse {
    let token = request.bearer.as_deref().unwrap_or("");
    match store.delete_session(token) {
        Ok(_) => ("200 OK", json!({ "message": "Déconnexion réussie" })),
        Err(err) => internal_error(err),
    }
}
