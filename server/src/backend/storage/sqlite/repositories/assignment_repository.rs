use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::backend::domain::calendar::{format_day, parse_stored_day};
use crate::backend::domain::models::chore::ChildChoreAssignment;
use crate::backend::storage::sqlite::{interval_from_column, DbConnection};
use crate::backend::storage::traits::AssignmentStorage;

/// Repository for the chores assigned to each child
#[derive(Clone)]
pub struct AssignmentRepository {
    db: DbConnection,
}

impl AssignmentRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn assignment_from_row(row: &SqliteRow) -> Result<ChildChoreAssignment> {
        Ok(ChildChoreAssignment {
            child_id: row.get("child_id"),
            chore_id: row.get("chore_id"),
            family_id: row.get("family_id"),
            next_due: parse_stored_day(row.get("next_due"))?,
            is_recurring: row.get("is_recurring"),
            interval_days: interval_from_column(row.get("interval_days"))?,
            is_active: row.get("is_active"),
        })
    }
}

#[async_trait]
impl AssignmentStorage for AssignmentRepository {
    async fn list_assignments(&self, child_id: &str) -> Result<Vec<ChildChoreAssignment>> {
        // rowid keeps assignment order stable, so recurring chores land in a
        // day's record in the order they were assigned
        let rows = sqlx::query(
            r#"
            SELECT child_id, chore_id, family_id, next_due, is_recurring, interval_days, is_active
            FROM child_chore_assignments
            WHERE child_id = ?
            ORDER BY rowid ASC
            "#,
        )
        .bind(child_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::assignment_from_row).collect()
    }

    async fn get_assignment(&self, child_id: &str, chore_id: &str) -> Result<Option<ChildChoreAssignment>> {
        let row = sqlx::query(
            r#"
            SELECT child_id, chore_id, family_id, next_due, is_recurring, interval_days, is_active
            FROM child_chore_assignments
            WHERE child_id = ? AND chore_id = ?
            "#,
        )
        .bind(child_id)
        .bind(chore_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::assignment_from_row).transpose()
    }

    async fn upsert_assignment(&self, assignment: &ChildChoreAssignment) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO child_chore_assignments
                (child_id, chore_id, family_id, next_due, is_recurring, interval_days, is_active)
            VALUES (?, ?, ?, ?, ?, ?, 1)
            ON CONFLICT (child_id, chore_id) DO UPDATE SET
                next_due = excluded.next_due,
                is_recurring = excluded.is_recurring,
                interval_days = excluded.interval_days,
                is_active = 1
            WHERE child_chore_assignments.is_active = 0
            "#,
        )
        .bind(&assignment.child_id)
        .bind(&assignment.chore_id)
        .bind(&assignment.family_id)
        .bind(format_day(assignment.next_due))
        .bind(assignment.is_recurring)
        .bind(assignment.interval_days.map(i64::from))
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_assignment(&self, child_id: &str, chore_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM child_chore_assignments WHERE child_id = ? AND chore_id = ?")
            .bind(child_id)
            .bind(chore_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn deactivate_assignments_for_chore(&self, chore_id: &str) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE child_chore_assignments SET is_active = 0 WHERE chore_id = ? AND is_active = 1",
        )
        .bind(chore_id)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected())
    }

    async fn reschedule_assignments_for_chore(&self, chore_id: &str, next_due: NaiveDate) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE child_chore_assignments SET next_due = ? WHERE chore_id = ? AND is_active = 1",
        )
        .bind(format_day(next_due))
        .bind(chore_id)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::test_utils::TestEnvironment;

    fn assignment(child_id: &str, chore_id: &str, next_due: NaiveDate) -> ChildChoreAssignment {
        ChildChoreAssignment {
            child_id: child_id.to_string(),
            chore_id: chore_id.to_string(),
            family_id: "family::a".to_string(),
            next_due,
            is_recurring: true,
            interval_days: Some(2),
            is_active: true,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    #[tokio::test]
    async fn test_assign_is_idempotent() {
        let env = TestEnvironment::new().await.expect("Failed to create test environment");
        let repo = AssignmentRepository::new(env.connection.clone());

        assert!(repo.upsert_assignment(&assignment("child::1", "chore::a", day(14))).await.unwrap());
        assert!(!repo.upsert_assignment(&assignment("child::1", "chore::a", day(20))).await.unwrap());

        let assignments = repo.list_assignments("child::1").await.unwrap();
        assert_eq!(assignments.len(), 1);
        // an active assignment keeps its schedule when assigned again
        assert_eq!(assignments[0].next_due, day(14));
    }

    #[tokio::test]
    async fn test_reassigning_reactivates_with_new_schedule() {
        let env = TestEnvironment::new().await.expect("Failed to create test environment");
        let repo = AssignmentRepository::new(env.connection.clone());

        repo.upsert_assignment(&assignment("child::1", "chore::a", day(14))).await.unwrap();
        assert_eq!(repo.deactivate_assignments_for_chore("chore::a").await.unwrap(), 1);
        assert_eq!(repo.deactivate_assignments_for_chore("chore::a").await.unwrap(), 0);

        let stored = repo.get_assignment("child::1", "chore::a").await.unwrap().unwrap();
        assert!(!stored.is_active);

        assert!(repo.upsert_assignment(&assignment("child::1", "chore::a", day(20))).await.unwrap());
        let stored = repo.get_assignment("child::1", "chore::a").await.unwrap().unwrap();
        assert!(stored.is_active);
        assert_eq!(stored.next_due, day(20));
    }

    #[tokio::test]
    async fn test_reschedule_moves_only_active_assignments() {
        let env = TestEnvironment::new().await.expect("Failed to create test environment");
        let repo = AssignmentRepository::new(env.connection.clone());

        repo.upsert_assignment(&assignment("child::1", "chore::a", day(14))).await.unwrap();
        repo.upsert_assignment(&assignment("child::2", "chore::a", day(16))).await.unwrap();
        repo.upsert_assignment(&assignment("child::1", "chore::b", day(14))).await.unwrap();
        repo.deactivate_assignments_for_chore("chore::b").await.unwrap();

        assert_eq!(repo.reschedule_assignments_for_chore("chore::a", day(20)).await.unwrap(), 2);
        assert_eq!(repo.reschedule_assignments_for_chore("chore::b", day(20)).await.unwrap(), 0);

        for child_id in ["child::1", "child::2"] {
            let stored = repo.get_assignment(child_id, "chore::a").await.unwrap().unwrap();
            assert_eq!(stored.next_due, day(20));
        }
        let inactive = repo.get_assignment("child::1", "chore::b").await.unwrap().unwrap();
        assert_eq!(inactive.next_due, day(14));
    }

    #[tokio::test]
    async fn test_remove_assignment() {
        let env = TestEnvironment::new().await.expect("Failed to create test environment");
        let repo = AssignmentRepository::new(env.connection.clone());

        repo.upsert_assignment(&assignment("child::1", "chore::a", day(14))).await.unwrap();
        repo.upsert_assignment(&assignment("child::1", "chore::b", day(14))).await.unwrap();

        assert!(repo.remove_assignment("child::1", "chore::a").await.unwrap());
        assert!(!repo.remove_assignment("child::1", "chore::a").await.unwrap());

        let remaining: Vec<String> = repo
            .list_assignments("child::1")
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.chore_id)
            .collect();
        assert_eq!(remaining, vec!["chore::b"]);
    }
}
