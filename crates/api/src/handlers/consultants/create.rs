#![forbid(unsafe_code)]

use crate::server::{ApiResponse, HttpRequest, bad_request, conflict, internal_error};
use om_core::email::is_valid_email;
use om_core::roles::UserRole;
use om_storage::{NewConsultantProfile, NewUser, SqliteStore, StoreError, UserRow};
use serde_json::json;

/// Director-only onboarding: account plus profile in one transaction,
/// with a generated temporary password returned once in the response.
pub(crate) fn create(store: &mut SqliteStore, user: &UserRow, request: &HttpRequest) -> ApiResponse {
    if let Err(resp) = crate::require_director(user) {
        return resp;
    }
    let body = match crate::parse_json_body(&request.body) {
        Ok(body) => body,
        Err(resp) => return resp,
    };

    let first_name = match crate::require_string(
        &body,
        "firstName",
        2,
        "Le prénom doit contenir au moins 2 caractères",
    ) {
        Ok(value) => value,
        Err(resp) => return resp,
    };
    let last_name = match crate::require_string(
        &body,
        "lastName",
        2,
        "Le nom doit contenir au moins 2 caractères",
    ) {
        Ok(value) => value,
        Err(resp) => return resp,
    };
    let email = match crate::require_string(&body, "email", 1, "Email invalide") {
        Ok(value) => value,
        Err(resp) => return resp,
    };
    if !is_valid_email(&email) {
        return bad_request("Email invalide");
    }
    let email = email.to_lowercase();
    let phone = crate::optional_string(&body, "phone");

    let tjm = match crate::require_f64(&body, "tjm", "Le TJM doit être positif") {
        Ok(value) => value,
        Err(resp) => return resp,
    };
    if tjm < 0.0 {
        return bad_request("Le TJM doit être positif");
    }
    let specialization = match crate::require_string(
        &body,
        "specialization",
        3,
        "La spécialisation doit contenir au moins 3 caractères",
    ) {
        Ok(value) => value,
        Err(resp) => return resp,
    };
    let skills =
        match crate::require_string_array(&body, "skills", "Au moins une compétence est requise") {
            Ok(value) => value,
            Err(resp) => return resp,
        };
    let experience_years = match crate::optional_f64(&body, "experience") {
        Some(value) if value < 0.0 => return bad_request("L'expérience doit être positive"),
        Some(value) => value as i64,
        None => 0,
    };
    let biography = crate::optional_string(&body, "biography");

    let temp_password = crate::temp_password();
    let new_user = NewUser {
        email,
        password_hash: crate::hash_password(&temp_password),
        first_name,
        last_name,
        phone,
        role: UserRole::Consultant.as_str().to_string(),
    };
    let profile = NewConsultantProfile {
        tjm,
        specialization,
        skills,
        experience_years,
        biography,
    };
    let (_, consultant) = match store.create_consultant(new_user, profile) {
        Ok(pair) => pair,
        Err(StoreError::EmailTaken) => {
            return conflict("Un utilisateur avec cet email existe déjà");
        }
        Err(err) => return internal_error(err),
    };

    let payload = match super::consultant_with_user_json(store, &consultant) {
        Ok(payload) => payload,
        Err(resp) => return resp,
    };
    (
        "201 Created",
        json!({
            "consultant": payload,
            "message": "Consultant créé avec succès",
            "tempPassword": temp_password,
        }),
    )
}
