#![forbid(unsafe_code)]

use crate::server::{ApiResponse, HttpRequest, bad_request, internal_error, not_found};
use om_core::finance::{TransactionCategory, TransactionType};
use om_core::notify::NotificationType;
use om_storage::{NewTransaction, SqliteStore, UserRow};
use serde_json::{Value, json};

/// Schedules a salary payout for a consultant, optionally tied to a set
/// of their completed tasks.
pub(crate) fn consultant_payment(
    store: &mut SqliteStore,
    user: &UserRow,
    request: &HttpRequest,
) -> ApiResponse {
    if let Err(resp) = crate::require_director(user) {
        return resp;
    }
    let body = match crate::parse_json_body(&request.body) {
        Ok(body) => body,
        Err(resp) => return resp,
    };

    let consultant_id = match crate::require_string(&body, "consultantId", 1, "Consultant requis") {
        Ok(value) => value,
        Err(resp) => return resp,
    };
    let consultant = match store.consultant_by_id(&consultant_id) {
        Ok(Some(consultant)) => consultant,
        Ok(None) => return not_found("Consultant non trouvé"),
        Err(err) => return internal_error(err),
    };
    let amount = match crate::require_f64(&body, "amount", "Le montant doit être positif") {
        Ok(value) => value,
        Err(resp) => return resp,
    };
    if amount < 0.01 {
        return bad_request("Le montant doit être positif");
    }
    let description = match crate::require_string(&body, "description", 5, "Description requise") {
        Ok(value) => value,
        Err(resp) => return resp,
    };
    let reference = crate::optional_string(&body, "reference");
    let due_ms = match crate::optional_date(&body, "dueDate", "Date d'échéance invalide") {
        Ok(value) => value,
        Err(resp) => return resp,
    };

    let task_ids = crate::optional_string_array(&body, "taskIds").unwrap_or_default();
    let tasks = match store.completed_assigned_tasks(&consultant.user_id, &task_ids) {
        Ok(tasks) => tasks,
        Err(err) => return internal_error(err),
    };
    if tasks.len() != task_ids.len() {
        return bad_request("Certaines tâches ne sont pas valides ou ne sont pas terminées");
    }

    let payee = match store.user_lite(&consultant.user_id) {
        Ok(Some(lite)) => lite,
        Ok(None) => return not_found("Consultant non trouvé"),
        Err(err) => return internal_error(err),
    };

    let transaction = match store.create_transaction(NewTransaction {
        tx_type: TransactionType::Sortie.as_str().to_string(),
        category: TransactionCategory::SalaireConsultant.as_str().to_string(),
        amount,
        description: description.clone(),
        reference,
        project_id: None,
        consultant_id: Some(consultant.id.clone()),
        is_paid: false,
        due_ms,
    }) {
        Ok(transaction) => transaction,
        Err(err) => return internal_error(err),
    };

    crate::handlers::notify(
        store,
        &consultant.user_id,
        NotificationType::Paiement,
        "Nouveau paiement programmé",
        format!(
            "Un paiement de {} FCFA a été programmé: {}",
            crate::format_amount(amount),
            description
        ),
        Some((&transaction.id, "transaction")),
    );

    let tasks_json: Vec<Value> = tasks
        .iter()
        .map(|(task, project_title)| {
            json!({
                "id": task.id,
                "title": task.title,
                "project": project_title,
                "actualHours": task.actual_hours,
            })
        })
        .collect();

    (
        "201 Created",
        json!({
            "transaction": crate::transaction_json(&transaction),
            "consultant": {
                "id": consultant.id,
                "name": format!("{} {}", payee.first_name, payee.last_name),
                "email": payee.email,
            },
            "tasks": tasks_json,
            "message": "Paiement créé avec succès",
        }),
    )
}
