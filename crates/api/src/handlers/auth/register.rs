#![forbid(unsafe_code)]

use crate::server::{ApiResponse, HttpRequest, bad_request, internal_error};
use om_core::email::is_valid_email;
use om_core::roles::UserRole;
use om_storage::{NewConsultantProfile, NewUser, SqliteStore, StoreError};
use serde_json::{Value, json};

pub(crate) fn register(store: &mut SqliteStore, request: &HttpRequest) -> ApiResponse {
    let body = match crate::parse_json_body(&request.body) {
        Ok(body) => body,
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

    let password = match crate::require_string(
        &body,
        "password",
        8,
        "Le mot de passe doit contenir au moins 8 caractères",
    ) {
        Ok(value) => value,
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
    let phone = crate::optional_string(&body, "phone");

    let role = match body.get("role").and_then(Value::as_str) {
        Some(value) => match UserRole::parse(value.trim()) {
            Some(role) => role,
            None => return bad_request("Rôle invalide"),
        },
        None => UserRole::Consultant,
    };

    let new_user = NewUser {
        email,
        password_hash: crate::hash_password(&password),
        first_name,
        last_name,
        phone,
        role: role.as_str().to_string(),
    };

    if role == UserRole::Consultant {
        let tjm = crate::optional_f64(&body, "tjm").unwrap_or(0.0);
        if tjm < 0.0 {
            return bad_request("Le TJM doit être positif");
        }
        let profile = NewConsultantProfile {
            tjm,
            specialization: crate::optional_string(&body, "specialization").unwrap_or_default(),
            skills: crate::optional_string_array(&body, "skills").unwrap_or_default(),
            experience_years: 0,
            biography: None,
        };
        let (user, consultant) = match store.create_consultant(new_user, profile) {
            Ok(pair) => pair,
            Err(StoreError::EmailTaken) => {
                return bad_request("Un utilisateur avec cet email existe déjà");
            }
            Err(err) => return internal_error(err),
        };
        return (
            "201 Created",
            json!({
                "message": "Utilisateur créé avec succès",
                "user": crate::user_json(&user),
                "consultant": crate::consultant_json(&consultant),
            }),
        );
    }

    let user = match store.create_user(new_user) {
        Ok(user) => user,
        Err(StoreError::EmailTaken) => {
            return bad_request("Un utilisateur avec cet email existe déjà");
        }
        Err(err) => return internal_error(err),
    };
    (
        "201 Created",
        json!({
            "message": "Utilisateur créé avec succès",
            "user": crate::user_json(&user),
        }),
    )
}
