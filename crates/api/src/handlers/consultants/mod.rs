#![forbid(unsafe_code)]

mod compare;
mod create;
mod detail;
mod list;
mod stats;
mod update;

pub(crate) use compare::*;
pub(crate) use create::*;
pub(crate) use detail::*;
pub(crate) use list::*;
pub(crate) use stats::*;
pub(crate) use update::*;

use crate::server::{ApiResponse, internal_error};
use om_storage::{ConsultantRow, SqliteStore};
use serde_json::Value;

pub(crate) fn consultant_with_user_json(
    store: &SqliteStore,
    consultant: &ConsultantRow,
) -> Result<Value, ApiResponse> {
    let mut payload = crate::consultant_json(consultant);
    let user = store
        .user_by_id(&consultant.user_id)
        .map_err(internal_error)?;
    let embed = match user {
        Some(user) => crate::user_json(&user),
        None => Value::Null,
    };
    if let Some(map) = payload.as_object_mut() {
        map.insert("user".to_string(), embed);
    }
    Ok(payload)
}
