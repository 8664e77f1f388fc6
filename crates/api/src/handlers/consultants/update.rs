#![forbid(unsafe_code)]

use crate::server::{ApiResponse, HttpRequest, bad_request, forbidden, internal_error, not_found};
use om_storage::{ConsultantUpdate, SqliteStore, StoreError, UserRow};

pub(crate) fn update(
    store: &mut SqliteStore,
    user: &UserRow,
    id: &str,
    request: &HttpRequest,
) -> ApiResponse {
    let consultant = match store.consultant_by_id(id) {
        Ok(Some(consultant)) => consultant,
        Ok(None) => return not_found("Consultant non trouvé"),
        Err(err) => return internal_error(err),
    };
    if !crate::is_director(user) && consultant.user_id != user.id {
        return forbidden("Permissions insuffisantes");
    }

    let body = match crate::parse_json_body(&request.body) {
        Ok(body) => body,
        Err(resp) => return resp,
    };

    let tjm = crate::optional_f64(&body, "tjm");
    if let Some(value) = tjm
        && value < 0.0
    {
        return bad_request("Le TJM doit être positif");
    }
    let specialization = crate::optional_string(&body, "specialization");
    if let Some(value) = &specialization
        && value.chars().count() < 3
    {
        return bad_request("La spécialisation doit contenir au moins 3 caractères");
    }
    let skills = crate::optional_string_array(&body, "skills");
    if let Some(values) = &skills
        && values.is_empty()
    {
        return bad_request("Au moins une compétence est requise");
    }
    let experience_years = match crate::optional_f64(&body, "experience") {
        Some(value) if value < 0.0 => return bad_request("L'expérience doit être positive"),
        Some(value) => Some(value as i64),
        None => None,
    };

    let changes = ConsultantUpdate {
        tjm,
        specialization,
        skills,
        experience_years,
        biography: crate::optional_string(&body, "biography"),
        is_available: crate::optional_bool(&body, "isAvailable"),
        phone: crate::optional_string(&body, "phone"),
    };
    let updated = match store.update_consultant(id, changes) {
        Ok(updated) => updated,
        Err(StoreError::UnknownId) => return not_found("Consultant non trouvé"),
        Err(err) => return internal_error(err),
    };

    match super::consultant_with_user_json(store, &updated) {
        Ok(payload) => ("200 OK", payload),
        Err(resp) => resp,
    }
}
