#![forbid(unsafe_code)]

use super::*;
use rusqlite::types::Value as SqlValue;
use rusqlite::{OptionalExtension, Transaction, params, params_from_iter};

pub(crate) const CONSULTANT_COLUMNS: &str =
    "consultants.id, consultants.user_id, consultants.tjm, consultants.specialization, \
     consultants.skills, consultants.experience_years, consultants.biography, \
     consultants.is_available, consultants.reliability, consultants.created_ms, consultants.updated_ms";

pub(crate) fn map_consultant(row: &rusqlite::Row<'_>) -> rusqlite::Result<ConsultantRow> {
    let raw_skills: String = row.get(4)?;
    Ok(ConsultantRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        tjm: row.get(2)?,
        specialization: row.get(3)?,
        skills: decode_skills(&raw_skills),
        experience_years: row.get(5)?,
        biography: row.get(6)?,
        is_available: row.get(7)?,
        reliability: row.get(8)?,
        created_ms: row.get(9)?,
        updated_ms: row.get(10)?,
    })
}

impl SqliteStore {
    /// Creates the account and the consultant profile atomically.
    pub fn create_consultant(
        &mut self,
        user: NewUser,
        profile: NewConsultantProfile,
    ) -> Result<(UserRow, ConsultantRow), StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;
        let user_row = super::users::insert_user_tx(&tx, &user, now_ms)?;
        let consultant = insert_consultant_tx(&tx, &user_row.id, &profile, now_ms)?;
        tx.commit()?;
        Ok((user_row, consultant))
    }

    pub fn consultant_by_id(&self, id: &str) -> Result<Option<ConsultantRow>, StoreError> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {CONSULTANT_COLUMNS} FROM consultants WHERE consultants.id = ?1"),
                params![id],
                map_consultant,
            )
            .optional()?)
    }

    pub fn consultant_by_user(&self, user_id: &str) -> Result<Option<ConsultantRow>, StoreError> {
        Ok(self
            .conn
            .query_row(
                &format!(
                    "SELECT {CONSULTANT_COLUMNS} FROM consultants WHERE consultants.user_id = ?1"
                ),
                params![user_id],
                map_consultant,
            )
            .optional()?)
    }

    pub fn list_consultants(
        &self,
        filter: &ConsultantFilter,
    ) -> Result<(Vec<ConsultantRow>, i64), StoreError> {
        let mut clauses: Vec<String> = Vec::new();
        let mut args: Vec<SqlValue> = Vec::new();

        if let Some(search) = filter.search.as_deref() {
            let pattern = format!("%{}%", search.to_lowercase());
            clauses.push(
                "(LOWER(users.first_name) LIKE ? OR LOWER(users.last_name) LIKE ? \
                 OR LOWER(consultants.specialization) LIKE ?)"
                    .to_string(),
            );
            args.push(SqlValue::from(pattern.clone()));
            args.push(SqlValue::from(pattern.clone()));
            args.push(SqlValue::from(pattern));
        }
        if let Some(skill) = filter.skill.as_deref() {
            clauses.push("consultants.skills LIKE '%\"' || ? || '\"%'".to_string());
            args.push(SqlValue::from(skill.to_string()));
        }
        if let Some(available) = filter.available {
            clauses.push("consultants.is_available = ?".to_string());
            args.push(SqlValue::from(available));
        }

        let where_sql = render_where(&clauses);
        let direction = if filter.sort_desc { "DESC" } else { "ASC" };
        let order_sql = match filter.sort_by {
            ConsultantSort::Reliability => format!("consultants.reliability {direction}"),
            ConsultantSort::Experience => format!("consultants.experience_years {direction}"),
            ConsultantSort::Tjm => format!("consultants.tjm {direction}"),
            ConsultantSort::Name => format!("users.first_name COLLATE NOCASE {direction}"),
        };

        let total: i64 = self.conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM consultants JOIN users ON users.id = consultants.user_id{where_sql}"
            ),
            params_from_iter(args.iter()),
            |row| row.get(0),
        )?;

        let sql = format!(
            "SELECT {CONSULTANT_COLUMNS} FROM consultants \
             JOIN users ON users.id = consultants.user_id{where_sql} \
             ORDER BY {order_sql}, consultants.id ASC LIMIT ? OFFSET ?"
        );
        let mut page_args = args;
        page_args.push(SqlValue::from(filter.limit as i64));
        page_args.push(SqlValue::from(filter.offset as i64));

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(page_args.iter()), map_consultant)?;
        let consultants = rows.collect::<Result<Vec<_>, _>>()?;
        Ok((consultants, total))
    }

    pub fn update_consultant(
        &mut self,
        id: &str,
        update: ConsultantUpdate,
    ) -> Result<ConsultantRow, StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let current = tx
            .query_row(
                &format!("SELECT {CONSULTANT_COLUMNS} FROM consultants WHERE consultants.id = ?1"),
                params![id],
                map_consultant,
            )
            .optional()?;
        let Some(current) = current else {
            return Err(StoreError::UnknownId);
        };

        let tjm = update.tjm.unwrap_or(current.tjm);
        let specialization = update
            .specialization
            .unwrap_or_else(|| current.specialization.clone());
        let skills = update.skills.unwrap_or_else(|| current.skills.clone());
        let experience_years = update.experience_years.unwrap_or(current.experience_years);
        let biography = update.biography.or_else(|| current.biography.clone());
        let is_available = update.is_available.unwrap_or(current.is_available);

        tx.execute(
            r#"
            UPDATE consultants
            SET tjm = ?2, specialization = ?3, skills = ?4, experience_years = ?5,
                biography = ?6, is_available = ?7, updated_ms = ?8
            WHERE id = ?1
            "#,
            params![
                id,
                tjm,
                specialization,
                encode_skills(&skills),
                experience_years,
                biography,
                is_available,
                now_ms
            ],
        )?;

        if let Some(phone) = update.phone.as_deref() {
            tx.execute(
                "UPDATE users SET phone = ?2, updated_ms = ?3 WHERE id = ?1",
                params![current.user_id, phone, now_ms],
            )?;
        }

        tx.commit()?;

        Ok(ConsultantRow {
            tjm,
            specialization,
            skills,
            experience_years,
            biography,
            is_available,
            updated_ms: now_ms,
            ..current
        })
    }

    /// Listing enrichment: task counters, completion rate, uncapped
    /// reliability average and salary earnings.
    pub fn consultant_snapshot(
        &self,
        consultant: &ConsultantRow,
    ) -> Result<ConsultantSnapshot, StoreError> {
        let (total_tasks, completed_tasks): (i64, i64) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(CASE WHEN status = 'TERMINE' THEN 1 ELSE 0 END), 0) \
             FROM tasks WHERE assigned_user_id = ?1",
            params![consultant.user_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let avg_reliability: Option<f64> = self.conn.query_row(
            "SELECT AVG(actual_hours * 100.0 / estimated_hours) FROM tasks \
             WHERE assigned_user_id = ?1 AND status = 'TERMINE' \
             AND actual_hours IS NOT NULL AND actual_hours <> 0 AND estimated_hours <> 0",
            params![consultant.user_id],
            |row| row.get(0),
        )?;

        let total_earnings: f64 = self.conn.query_row(
            "SELECT COALESCE(SUM(amount), 0) FROM transactions \
             WHERE consultant_id = ?1 AND type = 'SORTIE' AND category = 'SALAIRE_CONSULTANT'",
            params![consultant.id],
            |row| row.get(0),
        )?;

        let completion_rate = if total_tasks > 0 {
            (completed_tasks as f64 * 100.0 / total_tasks as f64).round() as i64
        } else {
            0
        };

        Ok(ConsultantSnapshot {
            total_tasks,
            completed_tasks,
            completion_rate,
            reliability: avg_reliability.unwrap_or(0.0).round() as i64,
            total_earnings,
        })
    }

    /// Full activity figures for the stats and compare views.
    pub fn consultant_activity(
        &self,
        consultant: &ConsultantRow,
    ) -> Result<ConsultantActivity, StoreError> {
        let mut activity = ConsultantActivity::default();

        let counts = self.conn.query_row(
            "SELECT COUNT(*), \
                    COALESCE(SUM(CASE WHEN status = 'TERMINE' THEN 1 ELSE 0 END), 0), \
                    COALESCE(SUM(CASE WHEN status = 'EN_COURS' THEN 1 ELSE 0 END), 0), \
                    COALESCE(SUM(CASE WHEN status = 'A_FAIRE' THEN 1 ELSE 0 END), 0), \
                    COUNT(DISTINCT project_id), \
                    COALESCE(SUM(COALESCE(actual_hours, 0)), 0) \
             FROM tasks WHERE assigned_user_id = ?1",
            params![consultant.user_id],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, i64>(4)?,
                    row.get::<_, f64>(5)?,
                ))
            },
        )?;
        activity.total_tasks = counts.0;
        activity.completed_tasks = counts.1;
        activity.in_progress_tasks = counts.2;
        activity.pending_tasks = counts.3;
        activity.unique_projects = counts.4;
        activity.total_hours_worked = counts.5;

        let ratios = self.conn.query_row(
            "SELECT AVG(MIN(actual_hours * 1.0 / estimated_hours, 2.0)), \
                    AVG(actual_hours * 1.0 / estimated_hours), \
                    COUNT(*), \
                    COALESCE(SUM(actual_hours), 0) \
             FROM tasks WHERE assigned_user_id = ?1 AND status = 'TERMINE' \
             AND actual_hours IS NOT NULL AND actual_hours <> 0 AND estimated_hours <> 0",
            params![consultant.user_id],
            |row| {
                Ok((
                    row.get::<_, Option<f64>>(0)?,
                    row.get::<_, Option<f64>>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, f64>(3)?,
                ))
            },
        )?;
        activity.avg_ratio_capped = ratios.0.unwrap_or(1.0);
        activity.avg_ratio_raw = ratios.1.unwrap_or(1.0);
        activity.timed_tasks = ratios.2;
        activity.timed_hours = ratios.3;

        let earnings = self.conn.query_row(
            "SELECT COALESCE(SUM(amount), 0), \
                    COALESCE(SUM(CASE WHEN is_paid = 1 THEN amount ELSE 0 END), 0), \
                    COUNT(*) \
             FROM transactions WHERE consultant_id = ?1 \
             AND type = 'SORTIE' AND category = 'SALAIRE_CONSULTANT'",
            params![consultant.id],
            |row| {
                Ok((
                    row.get::<_, f64>(0)?,
                    row.get::<_, f64>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            },
        )?;
        activity.total_earnings = earnings.0;
        activity.paid_earnings = earnings.1;
        activity.salary_transactions = earnings.2;

        let (duration_days, completed): (f64, i64) = self.conn.query_row(
            "SELECT COALESCE(SUM(CASE WHEN start_ms IS NOT NULL AND end_ms IS NOT NULL \
                    THEN (end_ms - start_ms) / 86400000.0 ELSE 0 END), 0), COUNT(*) \
             FROM tasks WHERE assigned_user_id = ?1 AND status = 'TERMINE'",
            params![consultant.user_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        activity.avg_task_duration_days = if completed > 0 {
            (duration_days / completed as f64).round() as i64
        } else {
            0
        };

        let mut stmt = self.conn.prepare(
            "SELECT projects.title FROM tasks \
             JOIN projects ON projects.id = tasks.project_id \
             WHERE tasks.assigned_user_id = ?1 \
             ORDER BY tasks.created_ms DESC LIMIT 5",
        )?;
        let titles = stmt
            .query_map(params![consultant.user_id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        let mut recent = Vec::new();
        for title in titles.into_iter().rev() {
            if !recent.contains(&title) {
                recent.push(title);
            }
        }
        activity.recent_project_titles = recent;

        Ok(activity)
    }

    /// Month buckets for the consultant timeline; `months` supplies the
    /// `YYYY-MM` labels and their order, missing months stay at zero.
    pub fn consultant_timeline(
        &self,
        consultant: &ConsultantRow,
        months: &[String],
    ) -> Result<Vec<MonthActivity>, StoreError> {
        let mut buckets: Vec<MonthActivity> = months
            .iter()
            .map(|month| MonthActivity {
                month: month.clone(),
                tasks_completed: 0,
                hours_worked: 0.0,
                earnings: 0.0,
            })
            .collect();

        let mut stmt = self.conn.prepare(
            "SELECT strftime('%Y-%m', created_ms / 1000, 'unixepoch') AS month, \
                    COALESCE(SUM(CASE WHEN status = 'TERMINE' THEN 1 ELSE 0 END), 0), \
                    COALESCE(SUM(COALESCE(actual_hours, 0)), 0) \
             FROM tasks WHERE assigned_user_id = ?1 GROUP BY month",
        )?;
        let task_rows = stmt
            .query_map(params![consultant.user_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, f64>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        for (month, completed, hours) in task_rows {
            if let Some(bucket) = buckets.iter_mut().find(|b| b.month == month) {
                bucket.tasks_completed = completed;
                bucket.hours_worked = hours;
            }
        }

        let mut stmt = self.conn.prepare(
            "SELECT strftime('%Y-%m', created_ms / 1000, 'unixepoch') AS month, \
                    COALESCE(SUM(amount), 0) \
             FROM transactions WHERE consultant_id = ?1 \
             AND type = 'SORTIE' AND category = 'SALAIRE_CONSULTANT' GROUP BY month",
        )?;
        let earning_rows = stmt
            .query_map(params![consultant.id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        for (month, earnings) in earning_rows {
            if let Some(bucket) = buckets.iter_mut().find(|b| b.month == month) {
                bucket.earnings = earnings;
            }
        }

        Ok(buckets)
    }
}

pub(crate) fn insert_consultant_tx(
    tx: &Transaction<'_>,
    user_id: &str,
    profile: &NewConsultantProfile,
    now_ms: i64,
) -> Result<ConsultantRow, StoreError> {
    let id = next_id_tx(tx, "consultant", "CON")?;
    tx.execute(
        r#"
        INSERT INTO consultants(id, user_id, tjm, specialization, skills, experience_years, biography, is_available, reliability, created_ms, updated_ms)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, 100, ?8, ?8)
        "#,
        params![
            id,
            user_id,
            profile.tjm,
            profile.specialization,
            encode_skills(&profile.skills),
            profile.experience_years,
            profile.biography,
            now_ms
        ],
    )?;
    Ok(ConsultantRow {
        id,
        user_id: user_id.to_string(),
        tjm: profile.tjm,
        specialization: profile.specialization.clone(),
        skills: profile.skills.clone(),
        experience_years: profile.experience_years,
        biography: profile.biography.clone(),
        is_available: true,
        reliability: 100.0,
        created_ms: now_ms,
        updated_ms: now_ms,
    })
}

/// Refreshes the stored reliability score from completed timed tasks.
/// Stays at the current value while the consultant has no timed history.
pub(crate) fn recompute_reliability_tx(
    tx: &Transaction<'_>,
    consultant_id: &str,
    user_id: &str,
    now_ms: i64,
) -> Result<(), StoreError> {
    let avg: Option<f64> = tx.query_row(
        "SELECT AVG(actual_hours * 100.0 / estimated_hours) FROM tasks \
         WHERE assigned_user_id = ?1 AND status = 'TERMINE' \
         AND actual_hours IS NOT NULL AND actual_hours <> 0 AND estimated_hours <> 0",
        params![user_id],
        |row| row.get(0),
    )?;
    if let Some(avg) = avg {
        tx.execute(
            "UPDATE consultants SET reliability = ?2, updated_ms = ?3 WHERE id = ?1",
            params![consultant_id, avg.round(), now_ms],
        )?;
    }
    Ok(())
}

/// Joins the collected clauses into a WHERE fragment (empty when no
/// clause applies).
pub(crate) fn render_where(clauses: &[String]) -> String {
    if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    }
}
