#![forbid(unsafe_code)]

use crate::server::{ApiResponse, HttpRequest, api_error, forbidden, internal_error};
use om_storage::SqliteStore;
use serde_json::json;

pub(crate) fn login(store: &mut SqliteStore, request: &HttpRequest) -> ApiResponse {
    let body = match crate::parse_json_body(&request.body) {
        Ok(body) => body,
        Err(resp) => return resp,
    };
    let email = match crate::require_string(&body, "email", 1, "Email invalide") {
        Ok(value) => value.to_lowercase(),
        Err(resp) => return resp,
    };
    let password = match crate::require_string(&body, "password", 1, "Mot de passe requis") {
        Ok(value) => value,
        Err(resp) => return resp,
    };

    // Opportunistic sweep; stale sessions only ever die here or on read.
    let _ = store.purge_expired_sessions();

    let user = match store.user_by_email(&email) {
        Ok(user) => user,
        Err(err) => return internal_error(err),
    };
    let Some(user) = user else {
        return api_error(
            "401 Unauthorized",
            "UNAUTHENTICATED",
            "Aucun utilisateur trouvé avec cet email",
            None,
        );
    };
    if !user.is_active {
        return forbidden("Compte désactivé");
    }
    if !crate::verify_password(&password, &user.password_hash) {
        return api_error(
            "401 Unauthorized",
            "UNAUTHENTICATED",
            "Mot de passe incorrect",
            None,
        );
    }

    if let Err(err) = store.touch_last_login(&user.id) {
        return internal_error(err);
    }
    let token = crate::new_session_token();
    let session = match store.create_session(&user.id, &token, crate::SESSION_TTL_MS) {
        Ok(session) => session,
        Err(err) => return internal_error(err),
    };
    let consultant = match store.consultant_by_user(&user.id) {
        Ok(consultant) => consultant,
        Err(err) => return internal_error(err),
    };

    (
        "200 OK",
        json!({
            "token": session.token,
            "expiresAt": crate::ts_ms_to_rfc3339(session.expires_ms),
            "user": crate::auth_user_json(&user, consultant.as_ref()),
        }),
    )
}
