#![forbid(unsafe_code)]

use crate::server::{ApiResponse, internal_error};
use om_storage::{SqliteStore, UserRow};
use serde_json::json;

pub(crate) fn me(store: &mut SqliteStore, user: &UserRow) -> ApiResponse {
    let consultant = match store.consultant_by_user(&user.id) {
        Ok(consultant) => consultant,
        Err(err) => return internal_error(err),
    };
    (
        "200 OK",
        json!({ "user": crate::auth_user_json(user, consultant.as_ref()) }),
    )
}
