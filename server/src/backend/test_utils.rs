//! Test utilities for automatic cleanup and consistent test infrastructure.
//!
//! Every environment gets its own SQLite file inside a temporary directory
//! that is removed when the environment is dropped, even if the test panics.

use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use crate::backend::domain::calendar::{Clock, DayBoundary, FixedClock};
use crate::backend::domain::child_service::ChildService;
use crate::backend::domain::chore_service::ChoreService;
use crate::backend::domain::commands::children::CreateChildCommand;
use crate::backend::domain::commands::chores::CreateChoreCommand;
use crate::backend::domain::daily_record_service::DailyRecordService;
use crate::backend::domain::family_service::FamilyService;
use crate::backend::domain::models::child::ChildLedger;
use crate::backend::domain::models::chore::ChoreTemplate;
use crate::backend::domain::models::daily_record::DailyRecord;
use crate::backend::domain::models::member::{FamilyMember, Role};
use crate::backend::domain::permissions::{PermissionChecker, RolePermissionChecker};
use crate::backend::domain::rollover_service::RolloverService;
use crate::backend::io::rest::auth::USER_ID_HEADER;
use crate::backend::storage::{Connection, DailyRecordStorage, DbConnection, MemberStorage};
use crate::backend::{create_router, AppState};

pub const FAMILY_ID: &str = "family::test";
pub const PARENT_ID: &str = "user::parent";
pub const KID_USER_ID: &str = "user::kid";

/// Temporary database plus a clock the test controls
pub struct TestEnvironment {
    pub connection: DbConnection,
    pub clock: FixedClock,
    /// Base directory path for manual inspection if needed
    pub base_path: PathBuf,
    _temp_dir: TempDir, // Keep alive to prevent cleanup
}

impl TestEnvironment {
    /// Fresh database; the clock reads 2025-06-14 12:00 UTC
    pub async fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let base_path = temp_dir.path().to_path_buf();
        let url = format!("sqlite://{}", base_path.join("chores.db").display());
        let connection = DbConnection::new(&url, 4).await?;
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2025, 6, 14, 12, 0, 0).unwrap());

        Ok(Self {
            connection,
            clock,
            base_path,
            _temp_dir: temp_dir,
        })
    }

    pub fn today(&self) -> NaiveDate {
        DayBoundary::utc().today(&self.clock)
    }

    /// Overwrite a stored record, bypassing the lifecycle rules
    pub async fn store_record(&self, record: &DailyRecord) -> DailyRecord {
        self.connection
            .create_daily_record_repository()
            .update_record(record)
            .await
            .expect("Failed to store record")
            .expect("Stored record version changed")
    }
}

/// All services wired to one test environment, with a parent and a child
/// user already enrolled in [`FAMILY_ID`]
pub struct ServiceTestHelper {
    pub env: TestEnvironment,
    pub children: ChildService<DbConnection>,
    pub chores: ChoreService<DbConnection>,
    pub records: DailyRecordService<DbConnection>,
    pub families: FamilyService<DbConnection>,
}

impl ServiceTestHelper {
    pub async fn new() -> Result<Self> {
        let env = TestEnvironment::new().await?;
        let connection = Arc::new(env.connection.clone());
        let permissions: Arc<dyn PermissionChecker> =
            Arc::new(RolePermissionChecker::new(connection.as_ref()));
        let clock: Arc<dyn Clock> = Arc::new(env.clock.clone());
        let day_boundary = DayBoundary::utc();

        let helper = Self {
            children: ChildService::new(connection.clone(), permissions.clone(), clock.clone()),
            chores: ChoreService::new(connection.clone(), permissions.clone(), clock.clone(), day_boundary),
            records: DailyRecordService::new(connection.clone(), permissions.clone(), clock, day_boundary),
            families: FamilyService::new(connection, permissions),
            env,
        };

        helper.enrol(FAMILY_ID, PARENT_ID, Role::Parent).await?;
        helper.enrol(FAMILY_ID, KID_USER_ID, Role::Child).await?;
        Ok(helper)
    }

    async fn enrol(&self, family_id: &str, user_id: &str, role: Role) -> Result<()> {
        self.env
            .connection
            .create_member_repository()
            .add_member(&FamilyMember {
                family_id: family_id.to_string(),
                user_id: user_id.to_string(),
                role,
            })
            .await
    }

    /// Make `user_id` a parent of another family
    pub async fn join_family(&self, family_id: &str, user_id: &str) -> Result<()> {
        self.enrol(family_id, user_id, Role::Parent).await
    }

    pub async fn create_child(&self, name: &str) -> Result<ChildLedger> {
        let command = CreateChildCommand {
            family_id: FAMILY_ID.to_string(),
            name: name.to_string(),
        };
        Ok(self.children.create_child(PARENT_ID, command).await?)
    }

    /// Chore due today; recurring every `interval` days when given
    pub async fn create_chore(&self, name: &str, reward: f64, interval: Option<u32>) -> Result<ChoreTemplate> {
        let command = CreateChoreCommand {
            family_id: FAMILY_ID.to_string(),
            task_name: name.to_string(),
            reward_amount: reward,
            is_recurring: interval.is_some(),
            interval_days: interval,
            suggested_time: None,
            due_date: None,
        };
        Ok(self.chores.create_chore(PARENT_ID, command).await?)
    }

    pub async fn assign(&self, child_id: &str, chore_id: &str) -> Result<()> {
        self.chores.assign_chore(PARENT_ID, child_id, chore_id).await?;
        Ok(())
    }

    pub fn rollover(&self) -> RolloverService<DbConnection> {
        RolloverService::new(Arc::new(self.env.connection.clone()))
    }
}

/// The full router over a [`ServiceTestHelper`], driven with `oneshot`
pub struct ApiTestHelper {
    pub helper: ServiceTestHelper,
    router: Router,
}

impl ApiTestHelper {
    pub async fn new() -> Result<Self> {
        let helper = ServiceTestHelper::new().await?;
        let state = AppState {
            child_service: helper.children.clone(),
            chore_service: helper.chores.clone(),
            daily_record_service: helper.records.clone(),
            family_service: helper.families.clone(),
        };
        let router = create_router(state, "http://localhost:8080")?;
        Ok(Self { helper, router })
    }

    /// Send one request and return the status with the JSON body (`Null` when empty)
    pub async fn send(&self, method: &str, uri: &str, user: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            request = request.header(USER_ID_HEADER, user);
        }
        let request = match body {
            Some(json) => request
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => request.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self.router.clone().oneshot(request).await.expect("Router failed");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
        };
        (status, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_environment_setup() -> Result<()> {
        let helper = ServiceTestHelper::new().await?;
        assert!(helper.env.base_path.join("chores.db").exists());
        assert_eq!(helper.env.today(), NaiveDate::from_ymd_opt(2025, 6, 14).unwrap());

        let members = helper.families.list_members(PARENT_ID, FAMILY_ID).await?;
        assert_eq!(members.len(), 2);
        Ok(())
    }
}
