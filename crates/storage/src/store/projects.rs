#![forbid(unsafe_code)]

use super::*;
use rusqlite::types::Value as SqlValue;
use rusqlite::{OptionalExtension, params, params_from_iter};

pub(crate) const PROJECT_COLUMNS: &str =
    "projects.id, projects.title, projects.description, projects.status, projects.priority, \
     projects.budget, projects.budget_used, projects.estimated_hours, projects.actual_hours, \
     projects.start_ms, projects.end_ms, projects.deadline_ms, projects.client_name, \
     projects.client_email, projects.client_phone, projects.creator_id, projects.manager_id, \
     projects.is_active, projects.created_ms, projects.updated_ms";

pub(crate) fn map_project(row: &rusqlite::Row<'_>) -> rusqlite::Result<ProjectRow> {
    Ok(ProjectRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status: row.get(3)?,
        priority: row.get(4)?,
        budget: row.get(5)?,
        budget_used: row.get(6)?,
        estimated_hours: row.get(7)?,
        actual_hours: row.get(8)?,
        start_ms: row.get(9)?,
        end_ms: row.get(10)?,
        deadline_ms: row.get(11)?,
        client_name: row.get(12)?,
        client_email: row.get(13)?,
        client_phone: row.get(14)?,
        creator_id: row.get(15)?,
        manager_id: row.get(16)?,
        is_active: row.get(17)?,
        created_ms: row.get(18)?,
        updated_ms: row.get(19)?,
    })
}

impl SqliteStore {
    pub fn create_project(&mut self, request: NewProject) -> Result<ProjectRow, StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;
        let id = next_id_tx(&tx, "project", "PRJ")?;
        tx.execute(
            r#"
            INSERT INTO projects(id, title, description, status, priority, budget, budget_used,
                                 estimated_hours, actual_hours, start_ms, end_ms, deadline_ms,
                                 client_name, client_email, client_phone, creator_id, manager_id,
                                 is_active, created_ms, updated_ms)
            VALUES (?1, ?2, ?3, 'A_FAIRE', ?4, ?5, 0, ?6, 0, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, 1, ?15, ?15)
            "#,
            params![
                id,
                request.title,
                request.description,
                request.priority,
                request.budget,
                request.estimated_hours,
                request.start_ms,
                request.end_ms,
                request.deadline_ms,
                request.client_name,
                request.client_email,
                request.client_phone,
                request.creator_id,
                request.manager_id,
                now_ms
            ],
        )?;
        tx.commit()?;

        Ok(ProjectRow {
            id,
            title: request.title,
            description: request.description,
            status: "A_FAIRE".to_string(),
            priority: request.priority,
            budget: request.budget,
            budget_used: 0.0,
            estimated_hours: request.estimated_hours,
            actual_hours: 0.0,
            start_ms: request.start_ms,
            end_ms: request.end_ms,
            deadline_ms: request.deadline_ms,
            client_name: request.client_name,
            client_email: request.client_email,
            client_phone: request.client_phone,
            creator_id: request.creator_id,
            manager_id: request.manager_id,
            is_active: true,
            created_ms: now_ms,
            updated_ms: now_ms,
        })
    }

    pub fn project_by_id(&self, id: &str) -> Result<Option<ProjectRow>, StoreError> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE projects.id = ?1"),
                params![id],
                map_project,
            )
            .optional()?)
    }

    /// Active projects only. A viewer restriction keeps creators,
    /// managers and assignees of at least one task.
    pub fn list_projects(
        &self,
        filter: &ProjectFilter,
    ) -> Result<(Vec<ProjectRow>, i64), StoreError> {
        let mut clauses: Vec<String> = vec!["projects.is_active = 1".to_string()];
        let mut args: Vec<SqlValue> = Vec::new();

        if let Some(viewer) = filter.viewer.as_deref() {
            clauses.push(
                "(projects.creator_id = ? OR projects.manager_id = ? \
                 OR EXISTS (SELECT 1 FROM tasks WHERE tasks.project_id = projects.id \
                 AND tasks.assigned_user_id = ?))"
                    .to_string(),
            );
            args.push(SqlValue::from(viewer.to_string()));
            args.push(SqlValue::from(viewer.to_string()));
            args.push(SqlValue::from(viewer.to_string()));
        }
        if let Some(status) = filter.status.as_deref() {
            clauses.push("projects.status = ?".to_string());
            args.push(SqlValue::from(status.to_string()));
        }
        if let Some(search) = filter.search.as_deref() {
            let pattern = format!("%{}%", search.to_lowercase());
            clauses.push(
                "(LOWER(projects.title) LIKE ? OR LOWER(projects.description) LIKE ? \
                 OR LOWER(COALESCE(projects.client_name, '')) LIKE ?)"
                    .to_string(),
            );
            args.push(SqlValue::from(pattern.clone()));
            args.push(SqlValue::from(pattern.clone()));
            args.push(SqlValue::from(pattern));
        }

        let where_sql = super::consultants::render_where(&clauses);

        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM projects{where_sql}"),
            params_from_iter(args.iter()),
            |row| row.get(0),
        )?;

        let sql = format!(
            "SELECT {PROJECT_COLUMNS} FROM projects{where_sql} \
             ORDER BY projects.created_ms DESC, projects.id DESC LIMIT ? OFFSET ?"
        );
        let mut page_args = args;
        page_args.push(SqlValue::from(filter.limit as i64));
        page_args.push(SqlValue::from(filter.offset as i64));

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(page_args.iter()), map_project)?;
        let projects = rows.collect::<Result<Vec<_>, _>>()?;
        Ok((projects, total))
    }

    /// Latest projects regardless of archive state, for the dashboard.
    pub fn recent_projects(&self, limit: usize) -> Result<Vec<ProjectRow>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects \
             ORDER BY projects.created_ms DESC, projects.id DESC LIMIT ?1"
        ))?;
        let rows = stmt.query_map(params![limit as i64], map_project)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Task and transaction counts shown on project cards and detail pages.
    pub fn project_counts(&self, id: &str) -> Result<(i64, i64), StoreError> {
        let tasks: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM tasks WHERE project_id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        let transactions: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM transactions WHERE project_id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        Ok((tasks, transactions))
    }

    pub fn project_transactions(
        &self,
        id: &str,
        limit: usize,
    ) -> Result<Vec<TransactionRow>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM transactions WHERE transactions.project_id = ?1 \
             ORDER BY transactions.created_ms DESC, transactions.id DESC LIMIT ?2",
            super::transactions::TRANSACTION_COLUMNS
        ))?;
        let rows = stmt.query_map(
            params![id, limit as i64],
            super::transactions::map_transaction,
        )?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn update_project(
        &mut self,
        id: &str,
        update: ProjectUpdate,
    ) -> Result<ProjectRow, StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let current = tx
            .query_row(
                &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE projects.id = ?1"),
                params![id],
                map_project,
            )
            .optional()?;
        let Some(current) = current else {
            return Err(StoreError::UnknownId);
        };

        let next = ProjectRow {
            title: update.title.unwrap_or_else(|| current.title.clone()),
            description: update
                .description
                .unwrap_or_else(|| current.description.clone()),
            status: update.status.unwrap_or_else(|| current.status.clone()),
            priority: update.priority.unwrap_or_else(|| current.priority.clone()),
            budget: update.budget.unwrap_or(current.budget),
            estimated_hours: update.estimated_hours.unwrap_or(current.estimated_hours),
            actual_hours: update.actual_hours.unwrap_or(current.actual_hours),
            start_ms: update.start_ms.or(current.start_ms),
            end_ms: update.end_ms.or(current.end_ms),
            deadline_ms: update.deadline_ms.or(current.deadline_ms),
            client_name: update.client_name.or_else(|| current.client_name.clone()),
            client_email: update.client_email.or_else(|| current.client_email.clone()),
            client_phone: update.client_phone.or_else(|| current.client_phone.clone()),
            manager_id: update.manager_id.or_else(|| current.manager_id.clone()),
            updated_ms: now_ms,
            ..current
        };

        tx.execute(
            r#"
            UPDATE projects
            SET title = ?2, description = ?3, status = ?4, priority = ?5, budget = ?6,
                estimated_hours = ?7, actual_hours = ?8, start_ms = ?9, end_ms = ?10,
                deadline_ms = ?11, client_name = ?12, client_email = ?13, client_phone = ?14,
                manager_id = ?15, updated_ms = ?16
            WHERE id = ?1
            "#,
            params![
                id,
                next.title,
                next.description,
                next.status,
                next.priority,
                next.budget,
                next.estimated_hours,
                next.actual_hours,
                next.start_ms,
                next.end_ms,
                next.deadline_ms,
                next.client_name,
                next.client_email,
                next.client_phone,
                next.manager_id,
                now_ms
            ],
        )?;
        tx.commit()?;
        Ok(next)
    }

    /// Replaces the budget and books the difference as a ledger entry.
    /// An unchanged budget books nothing.
    pub fn update_project_budget(
        &mut self,
        id: &str,
        budget: f64,
        description: &str,
    ) -> Result<(ProjectRow, Option<TransactionRow>), StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let current = tx
            .query_row(
                &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE projects.id = ?1"),
                params![id],
                map_project,
            )
            .optional()?;
        let Some(current) = current else {
            return Err(StoreError::UnknownId);
        };

        tx.execute(
            "UPDATE projects SET budget = ?2, updated_ms = ?3 WHERE id = ?1",
            params![id, budget, now_ms],
        )?;

        let ledger = if budget != current.budget {
            let difference = budget - current.budget;
            let request = NewTransaction {
                tx_type: if difference > 0.0 { "ENTREE" } else { "SORTIE" }.to_string(),
                category: "REVENUS_PROJET".to_string(),
                amount: difference.abs(),
                description: description.to_string(),
                reference: None,
                project_id: Some(id.to_string()),
                consultant_id: None,
                is_paid: false,
                due_ms: None,
            };
            Some(super::transactions::insert_transaction_tx(
                &tx, &request, now_ms,
            )?)
        } else {
            None
        };

        tx.commit()?;
        Ok((
            ProjectRow {
                budget,
                updated_ms: now_ms,
                ..current
            },
            ledger,
        ))
    }

    /// Archives the project when tasks reference it, removes it
    /// otherwise. Ledger entries survive a removal with the project
    /// link cleared. Returns `true` when the project was archived.
    pub fn delete_project(&mut self, id: &str) -> Result<bool, StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let exists = tx
            .query_row("SELECT 1 FROM projects WHERE id = ?1", params![id], |_| {
                Ok(())
            })
            .optional()?
            .is_some();
        if !exists {
            return Err(StoreError::UnknownId);
        }

        let task_count: i64 = tx.query_row(
            "SELECT COUNT(*) FROM tasks WHERE project_id = ?1",
            params![id],
            |row| row.get(0),
        )?;

        let archived = if task_count > 0 {
            tx.execute(
                "UPDATE projects SET is_active = 0, updated_ms = ?2 WHERE id = ?1",
                params![id, now_ms],
            )?;
            true
        } else {
            tx.execute(
                "UPDATE transactions SET project_id = NULL WHERE project_id = ?1",
                params![id],
            )?;
            tx.execute("DELETE FROM projects WHERE id = ?1", params![id])?;
            false
        };

        tx.commit()?;
        Ok(archived)
    }
}
