#![forbid(unsafe_code)]

use crate::server::{ApiResponse, HttpRequest, bad_request, internal_error, not_found};
use om_core::finance::{TransactionCategory, TransactionType};
use om_core::notify::NotificationType;
use om_storage::{NewTransaction, SqliteStore, UserRow};
use serde_json::Value;

pub(crate) fn create(store: &mut SqliteStore, user: &UserRow, request: &HttpRequest) -> ApiResponse {
    if let Err(resp) = crate::require_director(user) {
        return resp;
    }
    let body = match crate::parse_json_body(&request.body) {
        Ok(body) => body,
        Err(resp) => return resp,
    };

    let tx_type = match body.get("type").and_then(Value::as_str) {
        Some(value) => match TransactionType::parse(value) {
            Some(tx_type) => tx_type,
            None => return bad_request("Type de transaction invalide"),
        },
        None => return bad_request("Type de transaction invalide"),
    };
    let category = match body.get("category").and_then(Value::as_str) {
        Some(value) => match TransactionCategory::parse(value) {
            Some(category) => category,
            None => return bad_request("Catégorie invalide"),
        },
        None => return bad_request("Catégorie invalide"),
    };
    let amount = match crate::require_f64(&body, "amount", "Le montant doit être supérieur à 0") {
        Ok(value) => value,
        Err(resp) => return resp,
    };
    if amount < 0.01 {
        return bad_request("Le montant doit être supérieur à 0");
    }
    let description = match crate::require_string(
        &body,
        "description",
        5,
        "La description doit contenir au moins 5 caractères",
    ) {
        Ok(value) => value,
        Err(resp) => return resp,
    };
    let reference = crate::optional_string(&body, "reference");
    let due_ms = match crate::optional_date(&body, "dueDate", "Date d'échéance invalide") {
        Ok(value) => value,
        Err(resp) => return resp,
    };
    let is_paid = crate::optional_bool(&body, "isPaid").unwrap_or(false);

    let project_id = crate::optional_string(&body, "projectId");
    if let Some(id) = &project_id {
        match store.project_by_id(id) {
            Ok(Some(_)) => {}
            Ok(None) => return not_found("Projet non trouvé"),
            Err(err) => return internal_error(err),
        }
    }
    let consultant_id = crate::optional_string(&body, "consultantId");
    let consultant = match &consultant_id {
        Some(id) => match store.consultant_by_id(id) {
            Ok(Some(consultant)) => Some(consultant),
            Ok(None) => return not_found("Consultant non trouvé"),
            Err(err) => return internal_error(err),
        },
        None => None,
    };

    let transaction = match store.create_transaction(NewTransaction {
        tx_type: tx_type.as_str().to_string(),
        category: category.as_str().to_string(),
        amount,
        description: description.clone(),
        reference,
        project_id,
        consultant_id,
        is_paid,
        due_ms,
    }) {
        Ok(transaction) => transaction,
        Err(err) => return internal_error(err),
    };

    if category == TransactionCategory::SalaireConsultant
        && let Some(consultant) = &consultant
    {
        crate::handlers::notify(
            store,
            &consultant.user_id,
            NotificationType::Paiement,
            "Nouvelle transaction",
            format!(
                "Une transaction de {} FCFA a été créée: {}",
                crate::format_amount(amount),
                description
            ),
            Some((&transaction.id, "transaction")),
        );
    }

    match super::transaction_with_links_json(store, &transaction) {
        Ok(payload) => ("201 Created", payload),
        Err(resp) => resp,
    }
}
