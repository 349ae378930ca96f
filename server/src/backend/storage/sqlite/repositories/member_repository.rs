use anyhow::{anyhow, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::backend::domain::models::member::{FamilyMember, Role};
use crate::backend::storage::sqlite::DbConnection;
use crate::backend::storage::traits::MemberStorage;

/// Repository for family membership and roles
#[derive(Clone)]
pub struct MemberRepository {
    db: DbConnection,
}

impl MemberRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn member_from_row(row: &SqliteRow) -> Result<FamilyMember> {
        let role: String = row.get("role");
        Ok(FamilyMember {
            family_id: row.get("family_id"),
            user_id: row.get("user_id"),
            role: Role::parse(&role).ok_or_else(|| anyhow!("Unknown stored role '{}'", role))?,
        })
    }
}

#[async_trait]
impl MemberStorage for MemberRepository {
    async fn add_member(&self, member: &FamilyMember) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO family_members (family_id, user_id, role)
            VALUES (?, ?, ?)
            ON CONFLICT (family_id, user_id) DO UPDATE SET role = excluded.role
            "#,
        )
        .bind(&member.family_id)
        .bind(&member.user_id)
        .bind(member.role.as_str())
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn get_member(&self, family_id: &str, user_id: &str) -> Result<Option<FamilyMember>> {
        let row = sqlx::query(
            "SELECT family_id, user_id, role FROM family_members WHERE family_id = ? AND user_id = ?",
        )
        .bind(family_id)
        .bind(user_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::member_from_row).transpose()
    }

    async fn list_members(&self, family_id: &str) -> Result<Vec<FamilyMember>> {
        let rows = sqlx::query(
            "SELECT family_id, user_id, role FROM family_members WHERE family_id = ? ORDER BY user_id ASC",
        )
        .bind(family_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::member_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::test_utils::TestEnvironment;

    fn member(family_id: &str, user_id: &str, role: Role) -> FamilyMember {
        FamilyMember {
            family_id: family_id.to_string(),
            user_id: user_id.to_string(),
            role,
        }
    }

    #[tokio::test]
    async fn test_add_member_replaces_role() {
        let env = TestEnvironment::new().await.expect("Failed to create test environment");
        let repo = MemberRepository::new(env.connection.clone());

        repo.add_member(&member("family::a", "user::sam", Role::Child)).await.unwrap();
        repo.add_member(&member("family::a", "user::sam", Role::Parent)).await.unwrap();

        let stored = repo.get_member("family::a", "user::sam").await.unwrap().unwrap();
        assert_eq!(stored.role, Role::Parent);
        assert!(repo.get_member("family::b", "user::sam").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_members_by_family() {
        let env = TestEnvironment::new().await.expect("Failed to create test environment");
        let repo = MemberRepository::new(env.connection.clone());

        repo.add_member(&member("family::a", "user::mom", Role::Parent)).await.unwrap();
        repo.add_member(&member("family::a", "user::emma", Role::Child)).await.unwrap();
        repo.add_member(&member("family::b", "user::other", Role::Parent)).await.unwrap();

        let members = repo.list_members("family::a").await.unwrap();
        assert_eq!(
            members,
            vec![member("family::a", "user::emma", Role::Child), member("family::a", "user::mom", Role::Parent)]
        );
    }
}
