use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::backend::domain::models::child::ChildLedger;
use crate::backend::storage::sqlite::{format_timestamp, parse_timestamp, DbConnection};
use crate::backend::storage::traits::ChildStorage;

/// Repository for child ledger operations
#[derive(Clone)]
pub struct ChildRepository {
    db: DbConnection,
}

impl ChildRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn child_from_row(row: &SqliteRow) -> Result<ChildLedger> {
        Ok(ChildLedger {
            id: row.get("id"),
            family_id: row.get("family_id"),
            name: row.get("name"),
            current_balance: row.get("current_balance"),
            created_at: parse_timestamp(row.get("created_at"))?,
            updated_at: parse_timestamp(row.get("updated_at"))?,
        })
    }
}

#[async_trait]
impl ChildStorage for ChildRepository {
    async fn store_child(&self, child: &ChildLedger) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO children (id, family_id, name, current_balance, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&child.id)
        .bind(&child.family_id)
        .bind(&child.name)
        .bind(child.current_balance)
        .bind(format_timestamp(&child.created_at))
        .bind(format_timestamp(&child.updated_at))
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn get_child(&self, child_id: &str) -> Result<Option<ChildLedger>> {
        let row = sqlx::query(
            r#"
            SELECT id, family_id, name, current_balance, created_at, updated_at
            FROM children
            WHERE id = ?
            "#,
        )
        .bind(child_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::child_from_row).transpose()
    }

    async fn list_children(&self, family_id: &str) -> Result<Vec<ChildLedger>> {
        let rows = sqlx::query(
            r#"
            SELECT id, family_id, name, current_balance, created_at, updated_at
            FROM children
            WHERE family_id = ?
            ORDER BY name ASC
            "#,
        )
        .bind(family_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::child_from_row).collect()
    }

    async fn increment_balance(&self, child_id: &str, delta: f64) -> Result<Option<f64>> {
        let new_balance: Option<f64> = sqlx::query_scalar(
            r#"
            UPDATE children
            SET current_balance = current_balance + ?, updated_at = ?
            WHERE id = ?
            RETURNING current_balance
            "#,
        )
        .bind(delta)
        .bind(format_timestamp(&Utc::now()))
        .bind(child_id)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(new_balance)
    }
}
