#![forbid(unsafe_code)]

use super::*;
use rusqlite::types::Value as SqlValue;
use rusqlite::{OptionalExtension, Transaction, params, params_from_iter};

pub(crate) const TRANSACTION_COLUMNS: &str =
    "transactions.id, transactions.type, transactions.category, transactions.amount, \
     transactions.description, transactions.reference, transactions.project_id, \
     transactions.consultant_id, transactions.is_paid, transactions.due_ms, transactions.created_ms";

pub(crate) fn map_transaction(row: &rusqlite::Row<'_>) -> rusqlite::Result<TransactionRow> {
    Ok(TransactionRow {
        id: row.get(0)?,
        tx_type: row.get(1)?,
        category: row.get(2)?,
        amount: row.get(3)?,
        description: row.get(4)?,
        reference: row.get(5)?,
        project_id: row.get(6)?,
        consultant_id: row.get(7)?,
        is_paid: row.get(8)?,
        due_ms: row.get(9)?,
        created_ms: row.get(10)?,
    })
}

fn filter_clauses(
    filter: &TransactionFilter,
    include_type: bool,
) -> (Vec<String>, Vec<SqlValue>) {
    let mut clauses: Vec<String> = Vec::new();
    let mut args: Vec<SqlValue> = Vec::new();

    if include_type {
        if let Some(tx_type) = filter.tx_type.as_deref() {
            clauses.push("transactions.type = ?".to_string());
            args.push(SqlValue::from(tx_type.to_string()));
        }
    }
    if let Some(category) = filter.category.as_deref() {
        clauses.push("transactions.category = ?".to_string());
        args.push(SqlValue::from(category.to_string()));
    }
    if let Some(project_id) = filter.project_id.as_deref() {
        clauses.push("transactions.project_id = ?".to_string());
        args.push(SqlValue::from(project_id.to_string()));
    }
    if let Some(consultant_id) = filter.consultant_id.as_deref() {
        clauses.push("transactions.consultant_id = ?".to_string());
        args.push(SqlValue::from(consultant_id.to_string()));
    }
    if let Some(is_paid) = filter.is_paid {
        clauses.push("transactions.is_paid = ?".to_string());
        args.push(SqlValue::from(is_paid));
    }
    if let Some(min_ms) = filter.min_ms {
        clauses.push("transactions.created_ms >= ?".to_string());
        args.push(SqlValue::from(min_ms));
    }
    if let Some(max_ms) = filter.max_ms {
        clauses.push("transactions.created_ms <= ?".to_string());
        args.push(SqlValue::from(max_ms));
    }

    (clauses, args)
}

impl SqliteStore {
    pub fn create_transaction(
        &mut self,
        request: NewTransaction,
    ) -> Result<TransactionRow, StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;
        let row = insert_transaction_tx(&tx, &request, now_ms)?;
        tx.commit()?;
        Ok(row)
    }

    pub fn transaction_by_id(&self, id: &str) -> Result<Option<TransactionRow>, StoreError> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE transactions.id = ?1"),
                params![id],
                map_transaction,
            )
            .optional()?)
    }

    pub fn list_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> Result<(Vec<TransactionRow>, i64), StoreError> {
        let (clauses, args) = filter_clauses(filter, true);
        let where_sql = super::consultants::render_where(&clauses);

        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM transactions{where_sql}"),
            params_from_iter(args.iter()),
            |row| row.get(0),
        )?;

        let sql = format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions{where_sql} \
             ORDER BY transactions.created_ms DESC, transactions.id DESC LIMIT ? OFFSET ?"
        );
        let mut page_args = args;
        page_args.push(SqlValue::from(filter.limit as i64));
        page_args.push(SqlValue::from(filter.offset as i64));

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(page_args.iter()), map_transaction)?;
        let transactions = rows.collect::<Result<Vec<_>, _>>()?;
        Ok((transactions, total))
    }

    pub fn transaction_summary(
        &self,
        filter: &TransactionFilter,
    ) -> Result<TransactionSummary, StoreError> {
        let (clauses, args) = filter_clauses(filter, true);
        let where_sql = super::consultants::render_where(&clauses);
        let (total_transactions, total_amount): (i64, f64) = self.conn.query_row(
            &format!(
                "SELECT COUNT(*), COALESCE(SUM(amount), 0) FROM transactions{where_sql}"
            ),
            params_from_iter(args.iter()),
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let (clauses, args) = filter_clauses(filter, false);
        let where_sql = super::consultants::render_where(&clauses);
        let sides = self.conn.query_row(
            &format!(
                "SELECT COALESCE(SUM(CASE WHEN type = 'ENTREE' THEN amount ELSE 0 END), 0), \
                        COALESCE(SUM(CASE WHEN type = 'ENTREE' THEN 1 ELSE 0 END), 0), \
                        COALESCE(SUM(CASE WHEN type = 'SORTIE' THEN amount ELSE 0 END), 0), \
                        COALESCE(SUM(CASE WHEN type = 'SORTIE' THEN 1 ELSE 0 END), 0) \
                 FROM transactions{where_sql}"
            ),
            params_from_iter(args.iter()),
            |row| {
                Ok((
                    row.get::<_, f64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, f64>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            },
        )?;

        Ok(TransactionSummary {
            total_transactions,
            total_amount,
            total_entrees: sides.0,
            entrees_count: sides.1,
            total_sorties: sides.2,
            sorties_count: sides.3,
        })
    }

    pub fn category_breakdown(
        &self,
        min_ms: Option<i64>,
    ) -> Result<Vec<CategoryBreakdown>, StoreError> {
        let (where_sql, args) = created_since(min_ms);
        let sql = format!(
            "SELECT category, type, COALESCE(SUM(amount), 0), COUNT(*) \
             FROM transactions{where_sql} GROUP BY category, type ORDER BY category, type"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args.iter()), |row| {
            Ok(CategoryBreakdown {
                category: row.get(0)?,
                tx_type: row.get(1)?,
                amount: row.get(2)?,
                count: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Projects ranked by booked amount. Titles resolve through a left
    /// join so entries survive a removed project.
    pub fn top_projects(
        &self,
        min_ms: Option<i64>,
        limit: usize,
    ) -> Result<Vec<CounterpartyTotal>, StoreError> {
        let (mut where_sql, mut args) = created_since(min_ms);
        if where_sql.is_empty() {
            where_sql = " WHERE transactions.project_id IS NOT NULL".to_string();
        } else {
            where_sql.push_str(" AND transactions.project_id IS NOT NULL");
        }
        let sql = format!(
            "SELECT transactions.project_id, projects.title, COALESCE(SUM(transactions.amount), 0), COUNT(*) \
             FROM transactions LEFT JOIN projects ON projects.id = transactions.project_id{where_sql} \
             GROUP BY transactions.project_id ORDER BY SUM(transactions.amount) DESC LIMIT ?"
        );
        args.push(SqlValue::from(limit as i64));
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args.iter()), |row| {
            Ok(CounterpartyTotal {
                id: row.get(0)?,
                label: row.get(1)?,
                amount: row.get(2)?,
                count: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn top_consultants(
        &self,
        min_ms: Option<i64>,
        limit: usize,
    ) -> Result<Vec<CounterpartyTotal>, StoreError> {
        let (mut where_sql, mut args) = created_since(min_ms);
        if where_sql.is_empty() {
            where_sql = " WHERE transactions.consultant_id IS NOT NULL".to_string();
        } else {
            where_sql.push_str(" AND transactions.consultant_id IS NOT NULL");
        }
        let sql = format!(
            "SELECT transactions.consultant_id, users.first_name || ' ' || users.last_name, \
                    COALESCE(SUM(transactions.amount), 0), COUNT(*) \
             FROM transactions \
             LEFT JOIN consultants ON consultants.id = transactions.consultant_id \
             LEFT JOIN users ON users.id = consultants.user_id{where_sql} \
             GROUP BY transactions.consultant_id ORDER BY SUM(transactions.amount) DESC LIMIT ?"
        );
        args.push(SqlValue::from(limit as i64));
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args.iter()), |row| {
            Ok(CounterpartyTotal {
                id: row.get(0)?,
                label: row.get(1)?,
                amount: row.get(2)?,
                count: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Per-period in and out totals over the trailing `periods` buckets,
    /// oldest first. Labels come from the same strftime pattern that
    /// groups the rows, so buckets and labels always line up.
    pub fn transaction_timeline(
        &self,
        group: PeriodGroup,
        periods: usize,
    ) -> Result<Vec<PeriodBucket>, StoreError> {
        let pattern = group.strftime_pattern();

        let mut buckets: Vec<PeriodBucket> = Vec::with_capacity(periods);
        for back in (0..periods).rev() {
            let label: String = match group {
                PeriodGroup::Day => self.conn.query_row(
                    "SELECT strftime(?1, 'now', ?2)",
                    params![pattern, format!("-{back} days")],
                    |row| row.get(0),
                )?,
                PeriodGroup::Week => self.conn.query_row(
                    "SELECT strftime(?1, 'now', ?2)",
                    params![pattern, format!("-{} days", back * 7)],
                    |row| row.get(0),
                )?,
                PeriodGroup::Month => self.conn.query_row(
                    "SELECT strftime(?1, 'now', 'start of month', ?2)",
                    params![pattern, format!("-{back} months")],
                    |row| row.get(0),
                )?,
            };
            buckets.push(PeriodBucket {
                period: label,
                entrees: 0.0,
                sorties: 0.0,
            });
        }

        let sql = format!(
            "SELECT strftime('{pattern}', created_ms / 1000, 'unixepoch') AS bucket, \
                    COALESCE(SUM(CASE WHEN type = 'ENTREE' THEN amount ELSE 0 END), 0), \
                    COALESCE(SUM(CASE WHEN type = 'SORTIE' THEN amount ELSE 0 END), 0) \
             FROM transactions GROUP BY bucket"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, f64>(1)?,
                    row.get::<_, f64>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        for (label, entrees, sorties) in rows {
            if let Some(bucket) = buckets.iter_mut().find(|b| b.period == label) {
                bucket.entrees = entrees;
                bucket.sorties = sorties;
            }
        }

        Ok(buckets)
    }

    /// Returns the row plus whether it was already settled; only the
    /// first call flips the flag.
    pub fn mark_transaction_paid(
        &mut self,
        id: &str,
    ) -> Result<(TransactionRow, bool), StoreError> {
        let tx = self.conn.transaction()?;
        let current = tx
            .query_row(
                &format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE transactions.id = ?1"),
                params![id],
                map_transaction,
            )
            .optional()?;
        let Some(current) = current else {
            return Err(StoreError::UnknownId);
        };
        if current.is_paid {
            return Ok((current, true));
        }
        tx.execute(
            "UPDATE transactions SET is_paid = 1 WHERE id = ?1",
            params![id],
        )?;
        tx.commit()?;
        Ok((
            TransactionRow {
                is_paid: true,
                ..current
            },
            false,
        ))
    }
}

pub(crate) fn insert_transaction_tx(
    tx: &Transaction<'_>,
    request: &NewTransaction,
    now_ms: i64,
) -> Result<TransactionRow, StoreError> {
    let id = next_id_tx(tx, "transaction", "TRX")?;
    tx.execute(
        r#"
        INSERT INTO transactions(id, type, category, amount, description, reference, project_id, consultant_id, is_paid, due_ms, created_ms)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
        params![
            id,
            request.tx_type,
            request.category,
            request.amount,
            request.description,
            request.reference,
            request.project_id,
            request.consultant_id,
            request.is_paid,
            request.due_ms,
            now_ms
        ],
    )?;
    Ok(TransactionRow {
        id,
        tx_type: request.tx_type.clone(),
        category: request.category.clone(),
        amount: request.amount,
        description: request.description.clone(),
        reference: request.reference.clone(),
        project_id: request.project_id.clone(),
        consultant_id: request.consultant_id.clone(),
        is_paid: request.is_paid,
        due_ms: request.due_ms,
        created_ms: now_ms,
    })
}

fn created_since(min_ms: Option<i64>) -> (String, Vec<SqlValue>) {
    match min_ms {
        Some(min_ms) => (
            " WHERE transactions.created_ms >= ?".to_string(),
            vec![SqlValue::from(min_ms)],
        ),
        None => (String::new(), Vec::new()),
    }
}
