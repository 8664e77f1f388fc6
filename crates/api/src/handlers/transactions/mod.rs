#![forbid(unsafe_code)]

mod consultant_payment;
mod create;
mod list;
mod pay;
mod stats;

pub(crate) use consultant_payment::*;
pub(crate) use create::*;
pub(crate) use list::*;
pub(crate) use pay::*;
pub(crate) use stats::*;

use crate::server::{ApiResponse, internal_error};
use om_storage::{SqliteStore, TransactionRow};
use serde_json::{Value, json};

/// Ledger rows embed a project and consultant digest when linked.
pub(crate) fn transaction_with_links_json(
    store: &SqliteStore,
    transaction: &TransactionRow,
) -> Result<Value, ApiResponse> {
    let mut payload = crate::transaction_json(transaction);

    let project = match &transaction.project_id {
        Some(project_id) => store
            .project_by_id(project_id)
            .map_err(internal_error)?
            .map(|project| json!({"id": project.id, "title": project.title}))
            .unwrap_or(Value::Null),
        None => Value::Null,
    };
    let consultant = match &transaction.consultant_id {
        Some(consultant_id) => match store.consultant_by_id(consultant_id).map_err(internal_error)? {
            Some(consultant) => store
                .user_lite(&consultant.user_id)
                .map_err(internal_error)?
                .map(|lite| {
                    json!({
                        "id": consultant.id,
                        "name": format!("{} {}", lite.first_name, lite.last_name),
                    })
                })
                .unwrap_or(Value::Null),
            None => Value::Null,
        },
        None => Value::Null,
    };

    if let Some(map) = payload.as_object_mut() {
        map.insert("project".to_string(), project);
        map.insert("consultant".to_string(), consultant);
    }
    Ok(payload)
}
