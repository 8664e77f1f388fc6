#![forbid(unsafe_code)]

use crate::server::{ApiResponse, internal_error, not_found};
use om_storage::{SqliteStore, StoreError, UserRow};
use serde_json::json;

/// Settles a pending transaction; repeated calls are no-ops.
pub(crate) fn pay(store: &mut SqliteStore, user: &UserRow, id: &str) -> ApiResponse {
    if let Err(resp) = crate::require_director(user) {
        return resp;
    }
    let (transaction, already_paid) = match store.mark_transaction_paid(id) {
        Ok(result) => result,
        Err(StoreError::UnknownId) => return not_found("Transaction non trouvée"),
        Err(err) => return internal_error(err),
    };
    if already_paid {
        return ("200 OK", json!({"message": "Transaction déjà payée"}));
    }
    (
        "200 OK",
        json!({
            "transaction": crate::transaction_json(&transaction),
            "message": "Transaction marquée comme payée",
        }),
    )
}
