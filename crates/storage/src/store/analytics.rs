#![forbid(unsafe_code)]

use super::*;

impl SqliteStore {
    pub fn dashboard_counters(&self) -> Result<DashboardCounters, StoreError> {
        Ok(self.conn.query_row(
            "SELECT (SELECT COUNT(*) FROM projects), \
                    (SELECT COUNT(*) FROM tasks), \
                    (SELECT COUNT(*) FROM consultants)",
            [],
            |row| {
                Ok(DashboardCounters {
                    projects: row.get(0)?,
                    tasks: row.get(1)?,
                    consultants: row.get(2)?,
                })
            },
        )?)
    }

    pub fn task_status_totals(&self) -> Result<TaskStatusCounts, StoreError> {
        Ok(self.conn.query_row(
            "SELECT COALESCE(SUM(CASE WHEN status = 'A_FAIRE' THEN 1 ELSE 0 END), 0), \
                    COALESCE(SUM(CASE WHEN status = 'EN_COURS' THEN 1 ELSE 0 END), 0), \
                    COALESCE(SUM(CASE WHEN status = 'TERMINE' THEN 1 ELSE 0 END), 0) \
             FROM tasks",
            [],
            |row| {
                Ok(TaskStatusCounts {
                    a_faire: row.get(0)?,
                    en_cours: row.get(1)?,
                    termine: row.get(2)?,
                })
            },
        )?)
    }

    /// Revenue, spend and opened projects per month. `months` supplies
    /// the `YYYY-MM` labels and their order, missing months stay at
    /// zero.
    pub fn monthly_finance(&self, months: &[String]) -> Result<Vec<MonthFinance>, StoreError> {
        let mut buckets: Vec<MonthFinance> = months
            .iter()
            .map(|month| MonthFinance {
                month: month.clone(),
                revenus: 0.0,
                depenses: 0.0,
                projets: 0,
            })
            .collect();

        let mut stmt = self.conn.prepare(
            "SELECT strftime('%Y-%m', created_ms / 1000, 'unixepoch') AS month, \
                    COALESCE(SUM(CASE WHEN type = 'ENTREE' THEN amount ELSE 0 END), 0), \
                    COALESCE(SUM(CASE WHEN type = 'SORTIE' THEN amount ELSE 0 END), 0) \
             FROM transactions GROUP BY month",
        )?;
        let finance_rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, f64>(1)?,
                    row.get::<_, f64>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        for (month, revenus, depenses) in finance_rows {
            if let Some(bucket) = buckets.iter_mut().find(|b| b.month == month) {
                bucket.revenus = revenus;
                bucket.depenses = depenses;
            }
        }

        let mut stmt = self.conn.prepare(
            "SELECT strftime('%Y-%m', created_ms / 1000, 'unixepoch') AS month, COUNT(*) \
             FROM projects GROUP BY month",
        )?;
        let project_rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        for (month, projets) in project_rows {
            if let Some(bucket) = buckets.iter_mut().find(|b| b.month == month) {
                bucket.projets = projets;
            }
        }

        Ok(buckets)
    }
}
