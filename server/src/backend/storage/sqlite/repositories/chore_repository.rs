use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::backend::domain::calendar::{format_day, parse_stored_day};
use crate::backend::domain::models::chore::ChoreTemplate;
use crate::backend::storage::sqlite::{
    format_timestamp, interval_from_column, parse_timestamp, DbConnection,
};
use crate::backend::storage::traits::ChoreStorage;

const CHORE_COLUMNS: &str = "id, family_id, task_name, reward_amount, is_recurring, interval_days, \
     suggested_time, due_date, is_active, created_at, updated_at";

/// Repository for chore template operations
#[derive(Clone)]
pub struct ChoreRepository {
    db: DbConnection,
}

impl ChoreRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn chore_from_row(row: &SqliteRow) -> Result<ChoreTemplate> {
        Ok(ChoreTemplate {
            id: row.get("id"),
            family_id: row.get("family_id"),
            task_name: row.get("task_name"),
            reward_amount: row.get("reward_amount"),
            is_recurring: row.get("is_recurring"),
            interval_days: interval_from_column(row.get("interval_days"))?,
            suggested_time: row.get("suggested_time"),
            due_date: parse_stored_day(row.get("due_date"))?,
            is_active: row.get("is_active"),
            created_at: parse_timestamp(row.get("created_at"))?,
            updated_at: parse_timestamp(row.get("updated_at"))?,
        })
    }
}

#[async_trait]
impl ChoreStorage for ChoreRepository {
    async fn store_chore(&self, chore: &ChoreTemplate) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO chore_templates
                (id, family_id, task_name, reward_amount, is_recurring, interval_days,
                 suggested_time, due_date, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&chore.id)
        .bind(&chore.family_id)
        .bind(&chore.task_name)
        .bind(chore.reward_amount)
        .bind(chore.is_recurring)
        .bind(chore.interval_days.map(i64::from))
        .bind(&chore.suggested_time)
        .bind(format_day(chore.due_date))
        .bind(chore.is_active)
        .bind(format_timestamp(&chore.created_at))
        .bind(format_timestamp(&chore.updated_at))
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn get_chore(&self, chore_id: &str) -> Result<Option<ChoreTemplate>> {
        let row = sqlx::query(&format!("SELECT {} FROM chore_templates WHERE id = ?", CHORE_COLUMNS))
            .bind(chore_id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(Self::chore_from_row).transpose()
    }

    async fn list_chores(&self, family_id: &str, include_inactive: bool) -> Result<Vec<ChoreTemplate>> {
        let sql = if include_inactive {
            format!(
                "SELECT {} FROM chore_templates WHERE family_id = ? ORDER BY task_name ASC",
                CHORE_COLUMNS
            )
        } else {
            format!(
                "SELECT {} FROM chore_templates WHERE family_id = ? AND is_active = 1 ORDER BY task_name ASC",
                CHORE_COLUMNS
            )
        };
        let rows = sqlx::query(&sql).bind(family_id).fetch_all(self.db.pool()).await?;

        rows.iter().map(Self::chore_from_row).collect()
    }

    async fn update_chore(&self, chore: &ChoreTemplate) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE chore_templates
            SET task_name = ?, reward_amount = ?, is_recurring = ?, interval_days = ?,
                suggested_time = ?, due_date = ?, is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&chore.task_name)
        .bind(chore.reward_amount)
        .bind(chore.is_recurring)
        .bind(chore.interval_days.map(i64::from))
        .bind(&chore.suggested_time)
        .bind(format_day(chore.due_date))
        .bind(chore.is_active)
        .bind(format_timestamp(&chore.updated_at))
        .bind(&chore.id)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
