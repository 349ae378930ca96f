use anyhow::{Context, Result};
use log::info;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use super::repositories::{
    AssignmentRepository, ChildRepository, ChoreRepository, DailyRecordRepository, MemberRepository,
};
use crate::backend::storage::traits::Connection;

/// How long a writer waits for SQLite's write lock before giving up
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS children (
        id TEXT PRIMARY KEY,
        family_id TEXT NOT NULL,
        name TEXT NOT NULL,
        current_balance REAL NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_children_family_id
    ON children(family_id);
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS chore_templates (
        id TEXT PRIMARY KEY,
        family_id TEXT NOT NULL,
        task_name TEXT NOT NULL,
        reward_amount REAL NOT NULL,
        is_recurring INTEGER NOT NULL,
        interval_days INTEGER,
        suggested_time TEXT,
        due_date TEXT NOT NULL,
        is_active INTEGER NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_chore_templates_family_id
    ON chore_templates(family_id);
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS child_chore_assignments (
        child_id TEXT NOT NULL,
        chore_id TEXT NOT NULL,
        family_id TEXT NOT NULL,
        next_due TEXT NOT NULL,
        is_recurring INTEGER NOT NULL,
        interval_days INTEGER,
        is_active INTEGER NOT NULL,
        PRIMARY KEY (child_id, chore_id)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS daily_records (
        id TEXT PRIMARY KEY,
        family_id TEXT NOT NULL,
        child_id TEXT NOT NULL,
        due_date TEXT NOT NULL,
        chores_json TEXT NOT NULL,
        penalties_json TEXT NOT NULL,
        status TEXT NOT NULL,
        submitted_at TEXT,
        approved_at TEXT,
        approved_by TEXT,
        total_reward REAL,
        rejected_at TEXT,
        rejected_by TEXT,
        rejection_reason TEXT,
        version INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        UNIQUE (child_id, family_id, due_date)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS family_members (
        family_id TEXT NOT NULL,
        user_id TEXT NOT NULL,
        role TEXT NOT NULL,
        PRIMARY KEY (family_id, user_id)
    );
    "#,
];

/// DbConnection manages the SQLite pool and hands out repositories
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Connect to (creating if needed) the database at `url` and set up the schema
    pub async fn new(url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("Invalid database URL: {}", url))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to database at {}", url))?;

        Self::setup_schema(&pool).await?;
        info!("Database ready at {}", url);

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(pool)
                .await
                .context("Failed to set up database schema")?;
        }
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl Connection for DbConnection {
    type ChildRepository = ChildRepository;
    type ChoreRepository = ChoreRepository;
    type AssignmentRepository = AssignmentRepository;
    type DailyRecordRepository = DailyRecordRepository;
    type MemberRepository = MemberRepository;

    fn create_child_repository(&self) -> Self::ChildRepository {
        ChildRepository::new(self.clone())
    }

    fn create_chore_repository(&self) -> Self::ChoreRepository {
        ChoreRepository::new(self.clone())
    }

    fn create_assignment_repository(&self) -> Self::AssignmentRepository {
        AssignmentRepository::new(self.clone())
    }

    fn create_daily_record_repository(&self) -> Self::DailyRecordRepository {
        DailyRecordRepository::new(self.clone())
    }

    fn create_member_repository(&self) -> Self::MemberRepository {
        MemberRepository::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_schema_setup_is_repeatable() {
        let temp_dir = TempDir::new().unwrap();
        let url = format!("sqlite://{}", temp_dir.path().join("chores.db").display());

        let first = DbConnection::new(&url, 2).await.expect("Failed to open database");
        DbConnection::setup_schema(first.pool()).await.expect("Schema setup should be idempotent");

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        )
        .fetch_all(first.pool())
        .await
        .unwrap();
        assert_eq!(
            tables,
            vec!["child_chore_assignments", "children", "chore_templates", "daily_records", "family_members"]
        );
    }
}
