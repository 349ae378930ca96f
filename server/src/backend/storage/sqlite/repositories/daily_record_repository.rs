use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, warn};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite};

use crate::backend::domain::calendar::{format_day, parse_stored_day};
use crate::backend::domain::models::chore::ScheduleUpdate;
use crate::backend::domain::models::daily_record::{DailyChore, DailyRecord, Penalty, RecordState};
use crate::backend::storage::sqlite::{
    format_timestamp, parse_optional_timestamp, parse_timestamp, DbConnection,
};
use crate::backend::storage::traits::{ApprovalOutcome, CreateRecordOutcome, DailyRecordStorage};

const RECORD_COLUMNS: &str = "id, family_id, child_id, due_date, chores_json, penalties_json, status, \
     submitted_at, approved_at, approved_by, total_reward, rejected_at, rejected_by, rejection_reason, \
     version, created_at";

/// The lifecycle columns a record state is flattened into
struct RecordColumns {
    chores_json: String,
    penalties_json: String,
    status: &'static str,
    submitted_at: Option<String>,
    approved_at: Option<String>,
    approved_by: Option<String>,
    total_reward: Option<f64>,
    rejected_at: Option<String>,
    rejected_by: Option<String>,
    rejection_reason: Option<String>,
}

impl RecordColumns {
    fn from_record(record: &DailyRecord) -> Result<Self> {
        let mut columns = Self {
            chores_json: serde_json::to_string(&record.chores).context("Failed to encode chores")?,
            penalties_json: serde_json::to_string(&record.penalties)
                .context("Failed to encode penalties")?,
            status: record.state.name(),
            submitted_at: record.state.submitted_at().as_ref().map(format_timestamp),
            approved_at: None,
            approved_by: None,
            total_reward: None,
            rejected_at: None,
            rejected_by: None,
            rejection_reason: None,
        };
        match &record.state {
            RecordState::Pending | RecordState::Submitted { .. } => {}
            RecordState::Approved { approved_at, approved_by, total_reward, .. } => {
                columns.approved_at = Some(format_timestamp(approved_at));
                columns.approved_by = Some(approved_by.clone());
                columns.total_reward = Some(*total_reward);
            }
            RecordState::Rejected { rejected_at, rejected_by, reason, .. } => {
                columns.rejected_at = Some(format_timestamp(rejected_at));
                columns.rejected_by = Some(rejected_by.clone());
                columns.rejection_reason = Some(reason.clone());
            }
        }
        Ok(columns)
    }
}

fn required<T>(value: Option<T>, record_id: &str, status: &str, column: &str) -> Result<T> {
    value.ok_or_else(|| anyhow!("Daily record {} is {} but has no {}", record_id, status, column))
}

/// Repository for daily records and the writes that must land with them
#[derive(Clone)]
pub struct DailyRecordRepository {
    db: DbConnection,
}

impl DailyRecordRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn record_from_row(row: &SqliteRow) -> Result<DailyRecord> {
        let id: String = row.get("id");
        let status: String = row.get("status");
        let submitted_at = parse_optional_timestamp(row.get("submitted_at"))?;

        let state = match status.as_str() {
            "pending" => RecordState::Pending,
            "submitted" => RecordState::Submitted {
                submitted_at: required(submitted_at, &id, &status, "submitted_at")?,
            },
            "approved" => RecordState::Approved {
                submitted_at: required(submitted_at, &id, &status, "submitted_at")?,
                approved_at: required(
                    parse_optional_timestamp(row.get("approved_at"))?,
                    &id,
                    &status,
                    "approved_at",
                )?,
                approved_by: required(row.get("approved_by"), &id, &status, "approved_by")?,
                total_reward: required(row.get("total_reward"), &id, &status, "total_reward")?,
            },
            "rejected" => RecordState::Rejected {
                submitted_at: required(submitted_at, &id, &status, "submitted_at")?,
                rejected_at: required(
                    parse_optional_timestamp(row.get("rejected_at"))?,
                    &id,
                    &status,
                    "rejected_at",
                )?,
                rejected_by: required(row.get("rejected_by"), &id, &status, "rejected_by")?,
                reason: required(row.get("rejection_reason"), &id, &status, "rejection_reason")?,
            },
            other => return Err(anyhow!("Daily record {} has unknown status '{}'", id, other)),
        };

        let chores: Vec<DailyChore> = serde_json::from_str(row.get("chores_json"))
            .with_context(|| format!("Invalid chores stored for daily record {}", id))?;
        let penalties: Vec<Penalty> = serde_json::from_str(row.get("penalties_json"))
            .with_context(|| format!("Invalid penalties stored for daily record {}", id))?;

        Ok(DailyRecord {
            family_id: row.get("family_id"),
            child_id: row.get("child_id"),
            due_date: parse_stored_day(row.get("due_date"))?,
            chores,
            penalties,
            state,
            version: row.get("version"),
            created_at: parse_timestamp(row.get("created_at"))?,
            id,
        })
    }

    /// Version-checked write of a record's mutable columns. Returns the number
    /// of rows changed: 0 means the stored version moved on.
    async fn write_record<'c, E>(executor: E, record: &DailyRecord) -> Result<u64>
    where
        E: sqlx::Executor<'c, Database = Sqlite>,
    {
        let columns = RecordColumns::from_record(record)?;
        let result = sqlx::query(
            r#"
            UPDATE daily_records
            SET chores_json = ?, penalties_json = ?, status = ?,
                submitted_at = ?, approved_at = ?, approved_by = ?, total_reward = ?,
                rejected_at = ?, rejected_by = ?, rejection_reason = ?,
                version = version + 1
            WHERE id = ? AND version = ?
            "#,
        )
        .bind(columns.chores_json)
        .bind(columns.penalties_json)
        .bind(columns.status)
        .bind(columns.submitted_at)
        .bind(columns.approved_at)
        .bind(columns.approved_by)
        .bind(columns.total_reward)
        .bind(columns.rejected_at)
        .bind(columns.rejected_by)
        .bind(columns.rejection_reason)
        .bind(record.id.clone())
        .bind(record.version)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl DailyRecordStorage for DailyRecordRepository {
    async fn get_record(&self, record_id: &str) -> Result<Option<DailyRecord>> {
        let row = sqlx::query(&format!("SELECT {} FROM daily_records WHERE id = ?", RECORD_COLUMNS))
            .bind(record_id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(Self::record_from_row).transpose()
    }

    async fn find_record_for_day(
        &self,
        child_id: &str,
        family_id: &str,
        day: NaiveDate,
    ) -> Result<Option<DailyRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM daily_records WHERE child_id = ? AND family_id = ? AND due_date = ?",
            RECORD_COLUMNS
        ))
        .bind(child_id)
        .bind(family_id)
        .bind(format_day(day))
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::record_from_row).transpose()
    }

    async fn latest_record_before(
        &self,
        child_id: &str,
        family_id: &str,
        day: NaiveDate,
    ) -> Result<Option<DailyRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM daily_records \
             WHERE child_id = ? AND family_id = ? AND due_date < ? \
             ORDER BY due_date DESC LIMIT 1",
            RECORD_COLUMNS
        ))
        .bind(child_id)
        .bind(family_id)
        .bind(format_day(day))
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::record_from_row).transpose()
    }

    async fn list_records(
        &self,
        child_id: &str,
        family_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM daily_records \
             WHERE child_id = ? AND family_id = ? AND due_date >= ? AND due_date <= ? \
             ORDER BY due_date DESC",
            RECORD_COLUMNS
        ))
        .bind(child_id)
        .bind(family_id)
        .bind(format_day(start))
        .bind(format_day(end))
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::record_from_row).collect()
    }

    async fn create_record_with_schedule(
        &self,
        record: &DailyRecord,
        updates: &[ScheduleUpdate],
    ) -> Result<CreateRecordOutcome> {
        let columns = RecordColumns::from_record(record)?;
        let mut tx = self.db.pool().begin().await?;

        // The insert comes first so this transaction takes the write lock
        // before it reads anything.
        let inserted = sqlx::query(
            r#"
            INSERT INTO daily_records
                (id, family_id, child_id, due_date, chores_json, penalties_json, status,
                 submitted_at, approved_at, approved_by, total_reward,
                 rejected_at, rejected_by, rejection_reason, version, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (child_id, family_id, due_date) DO NOTHING
            "#,
        )
        .bind(&record.id)
        .bind(&record.family_id)
        .bind(&record.child_id)
        .bind(format_day(record.due_date))
        .bind(&columns.chores_json)
        .bind(&columns.penalties_json)
        .bind(columns.status)
        .bind(&columns.submitted_at)
        .bind(&columns.approved_at)
        .bind(&columns.approved_by)
        .bind(columns.total_reward)
        .bind(&columns.rejected_at)
        .bind(&columns.rejected_by)
        .bind(&columns.rejection_reason)
        .bind(record.version)
        .bind(format_timestamp(&record.created_at))
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if inserted == 0 {
            tx.rollback().await?;
            debug!(
                "Daily record for child {} on {} already exists",
                record.child_id, record.due_date
            );
            let existing = self
                .find_record_for_day(&record.child_id, &record.family_id, record.due_date)
                .await?
                .ok_or_else(|| {
                    anyhow!(
                        "Daily record for child {} on {} conflicted but could not be read",
                        record.child_id,
                        record.due_date
                    )
                })?;
            return Ok(CreateRecordOutcome::AlreadyExists(existing));
        }

        for update in updates {
            let (child_id, chore_id, changed) = match update {
                ScheduleUpdate::Advance { child_id, chore_id, expected_next_due, next_due } => {
                    let changed = sqlx::query(
                        r#"
                        UPDATE child_chore_assignments SET next_due = ?
                        WHERE child_id = ? AND chore_id = ? AND next_due = ? AND is_active = 1
                        "#,
                    )
                    .bind(format_day(*next_due))
                    .bind(child_id)
                    .bind(chore_id)
                    .bind(format_day(*expected_next_due))
                    .execute(&mut *tx)
                    .await?
                    .rows_affected();
                    (child_id, chore_id, changed)
                }
                ScheduleUpdate::Retire { child_id, chore_id, expected_next_due } => {
                    let changed = sqlx::query(
                        r#"
                        UPDATE child_chore_assignments SET is_active = 0
                        WHERE child_id = ? AND chore_id = ? AND next_due = ? AND is_active = 1
                        "#,
                    )
                    .bind(child_id)
                    .bind(chore_id)
                    .bind(format_day(*expected_next_due))
                    .execute(&mut *tx)
                    .await?
                    .rows_affected();
                    (child_id, chore_id, changed)
                }
            };
            if changed == 0 {
                tx.rollback().await?;
                warn!(
                    "Assignment of chore {} for child {} changed while building the record for {}",
                    chore_id, child_id, record.due_date
                );
                return Ok(CreateRecordOutcome::ScheduleConflict {
                    child_id: child_id.clone(),
                    chore_id: chore_id.clone(),
                });
            }
        }

        tx.commit().await?;
        Ok(CreateRecordOutcome::Created(record.clone()))
    }

    async fn update_record(&self, record: &DailyRecord) -> Result<Option<DailyRecord>> {
        if Self::write_record(self.db.pool(), record).await? == 0 {
            return Ok(None);
        }
        Ok(Some(DailyRecord { version: record.version + 1, ..record.clone() }))
    }

    async fn commit_approval(&self, record: &DailyRecord, net_payout: f64) -> Result<ApprovalOutcome> {
        let mut tx = self.db.pool().begin().await?;

        if Self::write_record(&mut *tx, record).await? == 0 {
            tx.rollback().await?;
            return Ok(ApprovalOutcome::VersionConflict);
        }

        let new_balance: Option<f64> = sqlx::query_scalar(
            r#"
            UPDATE children
            SET current_balance = current_balance + ?, updated_at = ?
            WHERE id = ? AND family_id = ?
            RETURNING current_balance
            "#,
        )
        .bind(net_payout)
        .bind(format_timestamp(&chrono::Utc::now()))
        .bind(&record.child_id)
        .bind(&record.family_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(new_balance) = new_balance else {
            tx.rollback().await?;
            return Ok(ApprovalOutcome::ChildNotFound);
        };

        tx.commit().await?;
        Ok(ApprovalOutcome::Committed {
            record: DailyRecord { version: record.version + 1, ..record.clone() },
            new_balance,
        })
    }
}
