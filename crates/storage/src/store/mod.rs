#![forbid(unsafe_code)]

mod analytics;
mod consultants;
mod error;
mod notifications;
mod projects;
mod requests;
mod seed;
mod sessions;
mod tasks;
mod transactions;
mod types;
mod users;

pub use error::StoreError;
pub use requests::*;
pub use seed::DIRECTOR_EMAIL;
pub use types::*;

use rusqlite::{Connection, OptionalExtension, Transaction, params};
use std::path::{Path, PathBuf};
use std::time::Duration;

const SCHEMA_VERSION: &str = "v1";

#[derive(Debug)]
pub struct SqliteStore {
    storage_dir: PathBuf,
    conn: Connection,
}

impl SqliteStore {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let storage_dir = storage_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&storage_dir)?;
        let db_path = storage_dir.join("optimum_manage.db");
        let conn = Connection::open(db_path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        let store = Self { storage_dir, conn };
        store.migrate()?;
        Ok(store)
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    fn migrate(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;

            CREATE TABLE IF NOT EXISTS meta (
              key TEXT PRIMARY KEY,
              value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS counters (
              name TEXT PRIMARY KEY,
              value INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS users (
              id TEXT PRIMARY KEY,
              email TEXT NOT NULL UNIQUE,
              password_hash TEXT NOT NULL,
              first_name TEXT NOT NULL,
              last_name TEXT NOT NULL,
              phone TEXT,
              role TEXT NOT NULL,
              is_active INTEGER NOT NULL DEFAULT 1,
              last_login_ms INTEGER,
              created_ms INTEGER NOT NULL,
              updated_ms INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS sessions (
              token TEXT PRIMARY KEY,
              user_id TEXT NOT NULL,
              created_ms INTEGER NOT NULL,
              expires_ms INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS consultants (
              id TEXT PRIMARY KEY,
              user_id TEXT NOT NULL UNIQUE,
              tjm REAL NOT NULL,
              specialization TEXT NOT NULL,
              skills TEXT NOT NULL,
              experience_years INTEGER NOT NULL,
              biography TEXT,
              is_available INTEGER NOT NULL DEFAULT 1,
              reliability REAL NOT NULL DEFAULT 100,
              created_ms INTEGER NOT NULL,
              updated_ms INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS projects (
              id TEXT PRIMARY KEY,
              title TEXT NOT NULL,
              description TEXT NOT NULL,
              status TEXT NOT NULL,
              priority TEXT NOT NULL,
              budget REAL NOT NULL,
              budget_used REAL NOT NULL DEFAULT 0,
              estimated_hours REAL NOT NULL,
              actual_hours REAL NOT NULL DEFAULT 0,
              start_ms INTEGER,
              end_ms INTEGER,
              deadline_ms INTEGER,
              client_name TEXT,
              client_email TEXT,
              client_phone TEXT,
              creator_id TEXT NOT NULL,
              manager_id TEXT,
              is_active INTEGER NOT NULL DEFAULT 1,
              created_ms INTEGER NOT NULL,
              updated_ms INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS tasks (
              id TEXT PRIMARY KEY,
              project_id TEXT NOT NULL,
              title TEXT NOT NULL,
              description TEXT NOT NULL,
              status TEXT NOT NULL,
              priority TEXT NOT NULL,
              budget REAL NOT NULL DEFAULT 0,
              estimated_hours REAL NOT NULL,
              actual_hours REAL,
              assigned_user_id TEXT,
              parent_task_id TEXT,
              position INTEGER NOT NULL DEFAULT 0,
              start_ms INTEGER,
              end_ms INTEGER,
              deadline_ms INTEGER,
              created_ms INTEGER NOT NULL,
              updated_ms INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS transactions (
              id TEXT PRIMARY KEY,
              type TEXT NOT NULL,
              category TEXT NOT NULL,
              amount REAL NOT NULL,
              description TEXT NOT NULL,
              reference TEXT,
              project_id TEXT,
              consultant_id TEXT,
              is_paid INTEGER NOT NULL DEFAULT 0,
              due_ms INTEGER,
              created_ms INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS notifications (
              id TEXT PRIMARY KEY,
              user_id TEXT NOT NULL,
              type TEXT NOT NULL,
              title TEXT NOT NULL,
              message TEXT NOT NULL,
              entity_id TEXT,
              entity_type TEXT,
              is_read INTEGER NOT NULL DEFAULT 0,
              read_ms INTEGER,
              created_ms INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);
            CREATE INDEX IF NOT EXISTS idx_consultants_user ON consultants(user_id);
            CREATE INDEX IF NOT EXISTS idx_tasks_project ON tasks(project_id);
            CREATE INDEX IF NOT EXISTS idx_tasks_assignee ON tasks(assigned_user_id);
            CREATE INDEX IF NOT EXISTS idx_transactions_project ON transactions(project_id);
            CREATE INDEX IF NOT EXISTS idx_transactions_consultant ON transactions(consultant_id);
            CREATE INDEX IF NOT EXISTS idx_transactions_created ON transactions(created_ms);
            CREATE INDEX IF NOT EXISTS idx_notifications_user ON notifications(user_id, is_read);
            "#,
        )?;
        self.conn.execute(
            "INSERT OR IGNORE INTO meta(key, value) VALUES (?1, ?2)",
            params!["schema_version", SCHEMA_VERSION],
        )?;
        Ok(())
    }
}

pub(crate) fn now_ms() -> i64 {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    now.as_millis() as i64
}

/// Allocates the next id for an entity inside the caller's transaction so
/// the counter bump commits or rolls back with the insert.
pub(crate) fn next_id_tx(
    tx: &Transaction<'_>,
    name: &str,
    prefix: &str,
) -> Result<String, StoreError> {
    let current: i64 = tx
        .query_row(
            "SELECT value FROM counters WHERE name=?1",
            params![name],
            |row| row.get(0),
        )
        .optional()?
        .unwrap_or(0);
    let next = current + 1;
    tx.execute(
        r#"
        INSERT INTO counters(name, value) VALUES (?1, ?2)
        ON CONFLICT(name) DO UPDATE SET value=excluded.value
        "#,
        params![name, next],
    )?;
    Ok(format!("{prefix}-{next:03}"))
}

/// Ordering weight for priority tokens; unknown tokens sort first.
pub(crate) const PRIORITY_RANK_SQL: &str =
    "CASE priority WHEN 'FAIBLE' THEN 1 WHEN 'MOYENNE' THEN 2 WHEN 'HAUTE' THEN 3 WHEN 'CRITIQUE' THEN 4 ELSE 0 END";

pub(crate) fn encode_skills(skills: &[String]) -> String {
    serde_json::to_string(skills).unwrap_or_else(|_| "[]".to_string())
}

pub(crate) fn decode_skills(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}
