#![forbid(unsafe_code)]

use super::*;
use rusqlite::types::Value as SqlValue;
use rusqlite::{OptionalExtension, params, params_from_iter};

pub(crate) const TASK_COLUMNS: &str =
    "tasks.id, tasks.project_id, tasks.title, tasks.description, tasks.status, tasks.priority, \
     tasks.budget, tasks.estimated_hours, tasks.actual_hours, tasks.assigned_user_id, \
     tasks.parent_task_id, tasks.position, tasks.start_ms, tasks.end_ms, tasks.deadline_ms, \
     tasks.created_ms, tasks.updated_ms";

pub(crate) fn map_task(row: &rusqlite::Row<'_>) -> rusqlite::Result<TaskRow> {
    Ok(TaskRow {
        id: row.get(0)?,
        project_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        status: row.get(4)?,
        priority: row.get(5)?,
        budget: row.get(6)?,
        estimated_hours: row.get(7)?,
        actual_hours: row.get(8)?,
        assigned_user_id: row.get(9)?,
        parent_task_id: row.get(10)?,
        position: row.get(11)?,
        start_ms: row.get(12)?,
        end_ms: row.get(13)?,
        deadline_ms: row.get(14)?,
        created_ms: row.get(15)?,
        updated_ms: row.get(16)?,
    })
}

impl SqliteStore {
    /// Creates a task inside its project budget. A non-zero task budget
    /// must fit in what remains and is added to the project's used
    /// budget in the same transaction.
    pub fn create_task(&mut self, request: NewTask) -> Result<TaskRow, StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let budgets = tx
            .query_row(
                "SELECT budget, budget_used FROM projects WHERE id = ?1",
                params![request.project_id],
                |row| Ok((row.get::<_, f64>(0)?, row.get::<_, f64>(1)?)),
            )
            .optional()?;
        let Some((budget, budget_used)) = budgets else {
            return Err(StoreError::UnknownId);
        };

        let remaining = budget - budget_used;
        if request.budget > remaining {
            return Err(StoreError::BudgetExceeded { remaining });
        }

        let position: i64 = tx.query_row(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM tasks WHERE project_id = ?1",
            params![request.project_id],
            |row| row.get(0),
        )?;

        let id = next_id_tx(&tx, "task", "TSK")?;
        tx.execute(
            r#"
            INSERT INTO tasks(id, project_id, title, description, status, priority, budget,
                              estimated_hours, actual_hours, assigned_user_id, parent_task_id,
                              position, start_ms, end_ms, deadline_ms, created_ms, updated_ms)
            VALUES (?1, ?2, ?3, ?4, 'A_FAIRE', ?5, ?6, ?7, NULL, ?8, ?9, ?10, NULL, NULL, ?11, ?12, ?12)
            "#,
            params![
                id,
                request.project_id,
                request.title,
                request.description,
                request.priority,
                request.budget,
                request.estimated_hours,
                request.assigned_user_id,
                request.parent_task_id,
                position,
                request.deadline_ms,
                now_ms
            ],
        )?;

        if request.budget > 0.0 {
            tx.execute(
                "UPDATE projects SET budget_used = budget_used + ?2, updated_ms = ?3 WHERE id = ?1",
                params![request.project_id, request.budget, now_ms],
            )?;
        }

        tx.commit()?;

        Ok(TaskRow {
            id,
            project_id: request.project_id,
            title: request.title,
            description: request.description,
            status: "A_FAIRE".to_string(),
            priority: request.priority,
            budget: request.budget,
            estimated_hours: request.estimated_hours,
            actual_hours: None,
            assigned_user_id: request.assigned_user_id,
            parent_task_id: request.parent_task_id,
            position,
            start_ms: None,
            end_ms: None,
            deadline_ms: request.deadline_ms,
            created_ms: now_ms,
            updated_ms: now_ms,
        })
    }

    pub fn task_by_id(&self, id: &str) -> Result<Option<TaskRow>, StoreError> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE tasks.id = ?1"),
                params![id],
                map_task,
            )
            .optional()?)
    }

    /// A viewer restriction keeps tasks the user is assigned to plus
    /// tasks of projects the user created or manages.
    pub fn list_tasks(&self, filter: &TaskFilter) -> Result<(Vec<TaskRow>, i64), StoreError> {
        let mut clauses: Vec<String> = Vec::new();
        let mut args: Vec<SqlValue> = Vec::new();

        if let Some(viewer) = filter.viewer.as_deref() {
            clauses.push(
                "(tasks.assigned_user_id = ? OR EXISTS (SELECT 1 FROM projects \
                 WHERE projects.id = tasks.project_id \
                 AND (projects.creator_id = ? OR projects.manager_id = ?)))"
                    .to_string(),
            );
            args.push(SqlValue::from(viewer.to_string()));
            args.push(SqlValue::from(viewer.to_string()));
            args.push(SqlValue::from(viewer.to_string()));
        }
        if let Some(search) = filter.search.as_deref() {
            let pattern = format!("%{}%", search.to_lowercase());
            clauses.push(
                "(LOWER(tasks.title) LIKE ? OR LOWER(tasks.description) LIKE ?)".to_string(),
            );
            args.push(SqlValue::from(pattern.clone()));
            args.push(SqlValue::from(pattern));
        }
        if let Some(status) = filter.status.as_deref() {
            clauses.push("tasks.status = ?".to_string());
            args.push(SqlValue::from(status.to_string()));
        }
        if let Some(priority) = filter.priority.as_deref() {
            clauses.push("tasks.priority = ?".to_string());
            args.push(SqlValue::from(priority.to_string()));
        }
        if let Some(project_id) = filter.project_id.as_deref() {
            clauses.push("tasks.project_id = ?".to_string());
            args.push(SqlValue::from(project_id.to_string()));
        }
        if let Some(assigned) = filter.assigned_user_id.as_deref() {
            clauses.push("tasks.assigned_user_id = ?".to_string());
            args.push(SqlValue::from(assigned.to_string()));
        }

        let where_sql = super::consultants::render_where(&clauses);
        let direction = if filter.sort_desc { "DESC" } else { "ASC" };
        let order_sql = match filter.sort_by {
            TaskSort::CreatedAt => format!("tasks.created_ms {direction}"),
            TaskSort::Deadline => format!("tasks.deadline_ms {direction}"),
            TaskSort::Priority => format!("{PRIORITY_RANK_SQL} {direction}"),
            TaskSort::Title => format!("tasks.title COLLATE NOCASE {direction}"),
        };

        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM tasks{where_sql}"),
            params_from_iter(args.iter()),
            |row| row.get(0),
        )?;

        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks{where_sql} \
             ORDER BY {order_sql}, tasks.id ASC LIMIT ? OFFSET ?"
        );
        let mut page_args = args;
        page_args.push(SqlValue::from(filter.limit as i64));
        page_args.push(SqlValue::from(filter.offset as i64));

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(page_args.iter()), map_task)?;
        let tasks = rows.collect::<Result<Vec<_>, _>>()?;
        Ok((tasks, total))
    }

    /// Board order for one project. `assignee` narrows to that user's
    /// tasks (consultant view).
    pub fn list_project_tasks(
        &self,
        project_id: &str,
        assignee: Option<&str>,
    ) -> Result<Vec<TaskRow>, StoreError> {
        let mut sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE tasks.project_id = ?");
        let mut args: Vec<SqlValue> = vec![SqlValue::from(project_id.to_string())];
        if let Some(assignee) = assignee {
            sql.push_str(" AND tasks.assigned_user_id = ?");
            args.push(SqlValue::from(assignee.to_string()));
        }
        sql.push_str(" ORDER BY tasks.position ASC, tasks.created_ms ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args.iter()), map_task)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn project_task_status_counts(
        &self,
        project_id: &str,
    ) -> Result<TaskStatusCounts, StoreError> {
        Ok(self.conn.query_row(
            "SELECT COALESCE(SUM(CASE WHEN status = 'A_FAIRE' THEN 1 ELSE 0 END), 0), \
                    COALESCE(SUM(CASE WHEN status = 'EN_COURS' THEN 1 ELSE 0 END), 0), \
                    COALESCE(SUM(CASE WHEN status = 'TERMINE' THEN 1 ELSE 0 END), 0) \
             FROM tasks WHERE project_id = ?1",
            params![project_id],
            |row| {
                Ok(TaskStatusCounts {
                    a_faire: row.get(0)?,
                    en_cours: row.get(1)?,
                    termine: row.get(2)?,
                })
            },
        )?)
    }

    /// Fetches the subset of `task_ids` that is assigned to `user_id`
    /// and finished, with each task's project title. Payment validation
    /// compares the returned count against the requested one.
    pub fn completed_assigned_tasks(
        &self,
        user_id: &str,
        task_ids: &[String],
    ) -> Result<Vec<(TaskRow, String)>, StoreError> {
        if task_ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; task_ids.len()].join(", ");
        let sql = format!(
            "SELECT {TASK_COLUMNS}, projects.title FROM tasks \
             JOIN projects ON projects.id = tasks.project_id \
             WHERE tasks.id IN ({placeholders}) AND tasks.assigned_user_id = ? \
             AND tasks.status = 'TERMINE' ORDER BY tasks.created_ms ASC"
        );
        let mut args: Vec<SqlValue> = task_ids
            .iter()
            .map(|id| SqlValue::from(id.clone()))
            .collect();
        args.push(SqlValue::from(user_id.to_string()));

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args.iter()), |row| {
            Ok((map_task(row)?, row.get::<_, String>(17)?))
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Latest tasks assigned to a consultant, with the owning project title.
    pub fn recent_assigned_tasks(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<(TaskRow, String)>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS}, projects.title FROM tasks \
             JOIN projects ON projects.id = tasks.project_id \
             WHERE tasks.assigned_user_id = ?1 \
             ORDER BY tasks.created_ms DESC, tasks.id DESC LIMIT ?2"
        ))?;
        let rows = stmt.query_map(params![user_id, limit as i64], |row| {
            Ok((map_task(row)?, row.get::<_, String>(17)?))
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn assign_task(
        &mut self,
        id: &str,
        assignment: TaskAssignment,
    ) -> Result<TaskRow, StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let current = tx
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE tasks.id = ?1"),
                params![id],
                map_task,
            )
            .optional()?;
        let Some(current) = current else {
            return Err(StoreError::UnknownId);
        };

        let estimated_hours = assignment.estimated_hours.unwrap_or(current.estimated_hours);
        let budget = assignment.budget.unwrap_or(current.budget);

        tx.execute(
            "UPDATE tasks SET assigned_user_id = ?2, estimated_hours = ?3, budget = ?4, \
             updated_ms = ?5 WHERE id = ?1",
            params![
                id,
                assignment.assigned_user_id,
                estimated_hours,
                budget,
                now_ms
            ],
        )?;
        tx.commit()?;

        Ok(TaskRow {
            assigned_user_id: Some(assignment.assigned_user_id),
            estimated_hours,
            budget,
            updated_ms: now_ms,
            ..current
        })
    }

    /// Moves the task to `status` and applies everything that hangs off
    /// the transition in one transaction: start and end stamps, the
    /// project hour delta, the salary entry plus reliability refresh
    /// when a consultant finishes the task.
    pub fn set_task_status(
        &mut self,
        id: &str,
        status: &str,
        actual_hours: Option<f64>,
    ) -> Result<TaskStatusChange, StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let current = tx
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE tasks.id = ?1"),
                params![id],
                map_task,
            )
            .optional()?;
        let Some(current) = current else {
            return Err(StoreError::UnknownId);
        };

        let (project_creator_id, project_manager_id): (String, Option<String>) = tx.query_row(
            "SELECT creator_id, manager_id FROM projects WHERE id = ?1",
            params![current.project_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let completing = status == "TERMINE" && current.status != "TERMINE";
        let starting = status == "EN_COURS" && current.start_ms.is_none();

        let next_actual = actual_hours.or(current.actual_hours);
        let next_start = if starting {
            Some(now_ms)
        } else {
            current.start_ms
        };
        let next_end = if completing {
            Some(now_ms)
        } else {
            current.end_ms
        };

        tx.execute(
            "UPDATE tasks SET status = ?2, actual_hours = ?3, start_ms = ?4, end_ms = ?5, \
             updated_ms = ?6 WHERE id = ?1",
            params![id, status, next_actual, next_start, next_end, now_ms],
        )?;

        if let Some(hours) = actual_hours {
            let diff = hours - current.actual_hours.unwrap_or(0.0);
            tx.execute(
                "UPDATE projects SET actual_hours = actual_hours + ?2, updated_ms = ?3 WHERE id = ?1",
                params![current.project_id, diff, now_ms],
            )?;
        }

        let mut payment = None;
        if completing {
            if let Some(assigned) = current.assigned_user_id.as_deref() {
                let consultant = tx
                    .query_row(
                        "SELECT id, tjm FROM consultants WHERE user_id = ?1",
                        params![assigned],
                        |row| Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?)),
                    )
                    .optional()?;
                if let Some((consultant_id, tjm)) = consultant {
                    if tjm != 0.0 {
                        let hours_worked = [actual_hours, current.actual_hours]
                            .into_iter()
                            .flatten()
                            .find(|h| *h != 0.0)
                            .unwrap_or(current.estimated_hours);
                        let amount = hours_worked / 8.0 * tjm;
                        let request = NewTransaction {
                            tx_type: "SORTIE".to_string(),
                            category: "SALAIRE_CONSULTANT".to_string(),
                            amount,
                            description: format!("Paiement pour la tâche: {}", current.title),
                            reference: None,
                            project_id: Some(current.project_id.clone()),
                            consultant_id: Some(consultant_id.clone()),
                            is_paid: false,
                            due_ms: None,
                        };
                        payment = Some(super::transactions::insert_transaction_tx(
                            &tx, &request, now_ms,
                        )?);
                        super::consultants::recompute_reliability_tx(
                            &tx,
                            &consultant_id,
                            assigned,
                            now_ms,
                        )?;
                    }
                }
            }
        }

        tx.commit()?;

        Ok(TaskStatusChange {
            task: TaskRow {
                status: status.to_string(),
                actual_hours: next_actual,
                start_ms: next_start,
                end_ms: next_end,
                updated_ms: now_ms,
                ..current.clone()
            },
            previous_status: current.status,
            payment,
            project_creator_id,
            project_manager_id,
        })
    }
}
