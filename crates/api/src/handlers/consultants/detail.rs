#![forbid(unsafe_code)]

use crate::server::{ApiResponse, internal_error, not_found};
use om_storage::{SqliteStore, UserRow};
use serde_json::json;

/// Directors and the consultant themself see the full record; everyone
/// else gets the public card without contact data or rates.
pub(crate) fn detail(store: &mut SqliteStore, user: &UserRow, id: &str) -> ApiResponse {
    let consultant = match store.consultant_by_id(id) {
        Ok(Some(consultant)) => consultant,
        Ok(None) => return not_found("Consultant non trouvé"),
        Err(err) => return internal_error(err),
    };

    let full_view = crate::is_director(user) || consultant.user_id == user.id;
    if !full_view {
        let lite = match store.user_lite(&consultant.user_id) {
            Ok(lite) => lite,
            Err(err) => return internal_error(err),
        };
        let user_digest = lite
            .map(|lite| json!({"firstName": lite.first_name, "lastName": lite.last_name}))
            .unwrap_or(serde_json::Value::Null);
        return (
            "200 OK",
            json!({
                "id": consultant.id,
                "user": user_digest,
                "specialization": consultant.specialization,
                "skills": consultant.skills,
                "experience": consultant.experience_years,
                "reliability": consultant.reliability,
                "isAvailable": consultant.is_available,
            }),
        );
    }

    match super::consultant_with_user_json(store, &consultant) {
        Ok(payload) => ("200 OK", payload),
        Err(resp) => resp,
    }
}
