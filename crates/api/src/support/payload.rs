#![forbid(unsafe_code)]

use crate::ts_ms_to_rfc3339;
use om_storage::{
    ConsultantRow, NotificationRow, ProjectRow, TaskRow, TransactionRow, UserLite, UserRow,
};
use serde_json::{Value, json};

fn opt_ts(ms: Option<i64>) -> Value {
    match ms {
        Some(ms) => Value::String(ts_ms_to_rfc3339(ms)),
        None => Value::Null,
    }
}

pub(crate) fn user_lite_json(user: &UserLite) -> Value {
    json!({
        "id": user.id,
        "firstName": user.first_name,
        "lastName": user.last_name,
        "email": user.email,
    })
}

/// Full user record minus the password hash.
pub(crate) fn user_json(user: &UserRow) -> Value {
    json!({
        "id": user.id,
        "email": user.email,
        "firstName": user.first_name,
        "lastName": user.last_name,
        "phone": user.phone,
        "role": user.role,
        "isActive": user.is_active,
        "lastLogin": opt_ts(user.last_login_ms),
        "createdAt": ts_ms_to_rfc3339(user.created_ms),
    })
}

/// Shape returned by login and `/api/auth/me`: the account plus the
/// consultant profile when one exists.
pub(crate) fn auth_user_json(user: &UserRow, consultant: Option<&ConsultantRow>) -> Value {
    let consultant = match consultant {
        Some(profile) => json!({
            "id": profile.id,
            "tjm": profile.tjm,
            "specialization": profile.specialization,
            "skills": profile.skills,
            "experience": profile.experience_years,
            "isAvailable": profile.is_available,
        }),
        None => Value::Null,
    };
    json!({
        "id": user.id,
        "email": user.email,
        "firstName": user.first_name,
        "lastName": user.last_name,
        "phone": user.phone,
        "role": user.role,
        "isActive": user.is_active,
        "consultant": consultant,
    })
}

pub(crate) fn project_json(project: &ProjectRow) -> Value {
    json!({
        "id": project.id,
        "title": project.title,
        "description": project.description,
        "status": project.status,
        "priority": project.priority,
        "budget": project.budget,
        "budgetUsed": project.budget_used,
        "estimatedHours": project.estimated_hours,
        "actualHours": project.actual_hours,
        "startDate": opt_ts(project.start_ms),
        "endDate": opt_ts(project.end_ms),
        "deadline": opt_ts(project.deadline_ms),
        "clientName": project.client_name,
        "clientEmail": project.client_email,
        "clientPhone": project.client_phone,
        "isActive": project.is_active,
        "createdAt": ts_ms_to_rfc3339(project.created_ms),
        "updatedAt": ts_ms_to_rfc3339(project.updated_ms),
    })
}

pub(crate) fn task_json(task: &TaskRow) -> Value {
    json!({
        "id": task.id,
        "projectId": task.project_id,
        "title": task.title,
        "description": task.description,
        "status": task.status,
        "priority": task.priority,
        "budget": task.budget,
        "estimatedHours": task.estimated_hours,
        "actualHours": task.actual_hours,
        "parentTaskId": task.parent_task_id,
        "position": task.position,
        "startDate": opt_ts(task.start_ms),
        "endDate": opt_ts(task.end_ms),
        "deadline": opt_ts(task.deadline_ms),
        "createdAt": ts_ms_to_rfc3339(task.created_ms),
        "updatedAt": ts_ms_to_rfc3339(task.updated_ms),
    })
}

pub(crate) fn consultant_json(consultant: &ConsultantRow) -> Value {
    json!({
        "id": consultant.id,
        "tjm": consultant.tjm,
        "specialization": consultant.specialization,
        "skills": consultant.skills,
        "experience": consultant.experience_years,
        "biography": consultant.biography,
        "isAvailable": consultant.is_available,
        "reliability": consultant.reliability,
        "createdAt": ts_ms_to_rfc3339(consultant.created_ms),
        "updatedAt": ts_ms_to_rfc3339(consultant.updated_ms),
    })
}

pub(crate) fn transaction_json(transaction: &TransactionRow) -> Value {
    json!({
        "id": transaction.id,
        "type": transaction.tx_type,
        "category": transaction.category,
        "amount": transaction.amount,
        "description": transaction.description,
        "reference": transaction.reference,
        "projectId": transaction.project_id,
        "consultantId": transaction.consultant_id,
        "isPaid": transaction.is_paid,
        "dueDate": opt_ts(transaction.due_ms),
        "createdAt": ts_ms_to_rfc3339(transaction.created_ms),
    })
}

pub(crate) fn notification_json(notification: &NotificationRow) -> Value {
    json!({
        "id": notification.id,
        "type": notification.notif_type,
        "title": notification.title,
        "message": notification.message,
        "entityId": notification.entity_id,
        "entityType": notification.entity_type,
        "isRead": notification.is_read,
        "readAt": opt_ts(notification.read_ms),
        "createdAt": ts_ms_to_rfc3339(notification.created_ms),
    })
}

pub(crate) fn pagination_json(page: usize, limit: usize, total: i64) -> Value {
    let limit_i64 = limit.max(1) as i64;
    let pages = (total + limit_i64 - 1) / limit_i64;
    json!({
        "page": page,
        "limit": limit,
        "total": total,
        "pages": pages.max(0),
    })
}

/// French-style thousands grouping for notification texts: 43750 comes
/// out as "43 750".
pub(crate) fn format_amount(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let negative = rounded < 0;
    let digits = rounded.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + 4);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(' ');
        }
        out.push(ch);
    }
    if negative { format!("-{out}") } else { out }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_group_by_thousands() {
        assert_eq!(format_amount(0.0), "0");
        assert_eq!(format_amount(950.0), "950");
        assert_eq!(format_amount(43750.0), "43 750");
        assert_eq!(format_amount(1_250_000.0), "1 250 000");
        assert_eq!(format_amount(-35000.0), "-35 000");
    }

    #[test]
    fn pagination_rounds_up() {
        let page = pagination_json(2, 10, 21);
        assert_eq!(page["pages"], 3);
        assert_eq!(page["total"], 21);
        let empty = pagination_json(1, 10, 0);
        assert_eq!(empty["pages"], 0);
    }
}
