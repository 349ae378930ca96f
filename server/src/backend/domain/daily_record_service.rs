//! Daily record lifecycle: open, fill in, submit, approve or reject.
//!
//! Every operation names the acting user. Operations addressed by record id
//! load the record first to learn its family, check permission, then mutate.
//! Writes carry the version that was read, so of two concurrent writers on one
//! record only the first succeeds; the other gets a `Conflict`.

use log::{info, warn};
use std::sync::Arc;

use crate::backend::domain::calendar::{Clock, DayBoundary};
use crate::backend::domain::commands::daily_records::{
    ApprovalResult, ApproveDailyRecordCommand, DailyRecordHistoryQuery, GetOrCreateDailyRecordCommand,
    RejectDailyRecordCommand, UpdateChoreCompletionCommand,
};
use crate::backend::domain::errors::{DomainError, DomainResult};
use crate::backend::domain::models::daily_record::{CompletionStatus, DailyRecord};
use crate::backend::domain::permissions::{Action, PermissionChecker, Resource};
use crate::backend::domain::rollover_service::RolloverService;
use crate::backend::storage::{ApprovalOutcome, ChildStorage, Connection, DailyRecordStorage};

fn version_conflict(record_id: &str) -> DomainError {
    DomainError::Conflict(format!("daily record {} was modified concurrently", record_id))
}

#[derive(Clone)]
pub struct DailyRecordService<C: Connection> {
    record_repository: C::DailyRecordRepository,
    child_repository: C::ChildRepository,
    rollover: RolloverService<C>,
    permissions: Arc<dyn PermissionChecker>,
    clock: Arc<dyn Clock>,
    day_boundary: DayBoundary,
}

impl<C: Connection> DailyRecordService<C> {
    pub fn new(
        connection: Arc<C>,
        permissions: Arc<dyn PermissionChecker>,
        clock: Arc<dyn Clock>,
        day_boundary: DayBoundary,
    ) -> Self {
        Self {
            record_repository: connection.create_daily_record_repository(),
            child_repository: connection.create_child_repository(),
            rollover: RolloverService::new(connection),
            permissions,
            clock,
            day_boundary,
        }
    }

    async fn load_record(&self, record_id: &str) -> DomainResult<DailyRecord> {
        match self.record_repository.get_record(record_id).await? {
            Some(record) => Ok(record),
            None => {
                warn!("Daily record not found: {}", record_id);
                Err(DomainError::not_found(format!("daily record {}", record_id)))
            }
        }
    }

    async fn load_authorized(&self, user_id: &str, record_id: &str, action: Action) -> DomainResult<DailyRecord> {
        let record = self.load_record(record_id).await?;
        self.permissions
            .require(user_id, &record.family_id, Resource::DailyRecord, action)
            .await?;
        Ok(record)
    }

    async fn persist(&self, record: &DailyRecord) -> DomainResult<DailyRecord> {
        self.record_repository
            .update_record(record)
            .await?
            .ok_or_else(|| version_conflict(&record.id))
    }

    /// Return the child's record for the day, creating it on first access
    #[tracing::instrument(skip_all, fields(user = %user_id, child = %command.child_id))]
    pub async fn get_or_create_todays_daily_record(
        &self,
        user_id: &str,
        command: GetOrCreateDailyRecordCommand,
    ) -> DomainResult<DailyRecord> {
        self.permissions
            .require(user_id, &command.family_id, Resource::DailyRecord, Action::Read)
            .await?;

        let child = self
            .child_repository
            .get_child(&command.child_id)
            .await?
            .filter(|child| child.family_id == command.family_id)
            .ok_or_else(|| {
                DomainError::not_found(format!(
                    "child {} in family {}",
                    command.child_id, command.family_id
                ))
            })?;

        let day = self
            .day_boundary
            .parse_optional_day(command.today.as_deref(), self.clock.as_ref())?;
        self.rollover
            .get_or_create_record_for_day(&child.id, &child.family_id, day, self.clock.now())
            .await
    }

    /// Child reports how far a chore got; only while the record is pending
    pub async fn update_chore_completion(
        &self,
        user_id: &str,
        command: UpdateChoreCompletionCommand,
    ) -> DomainResult<DailyRecord> {
        let mut record = self
            .load_authorized(user_id, &command.record_id, Action::Update)
            .await?;

        if record.state.is_submitted() {
            return Err(DomainError::invalid_state("daily record already submitted"));
        }
        let status = CompletionStatus::try_from(command.completion_status)?;
        record.set_completion(command.chore_index, status)?;

        let record = self.persist(&record).await?;
        info!(
            "Chore {} of record {} marked {}",
            command.chore_index, record.id, command.completion_status
        );
        Ok(record)
    }

    /// Lock the record for review, then open the record for the current day
    #[tracing::instrument(skip(self))]
    pub async fn submit_daily_record(&self, user_id: &str, record_id: &str) -> DomainResult<DailyRecord> {
        let mut record = self.load_authorized(user_id, record_id, Action::Update).await?;

        let now = self.clock.now();
        record.submit(now)?;
        let record = self.persist(&record).await?;
        info!("Daily record {} submitted by {}", record.id, user_id);

        self.rollover
            .get_or_create_record_for_day(
                &record.child_id,
                &record.family_id,
                self.day_boundary.day_of(now),
                now,
            )
            .await?;

        Ok(record)
    }

    /// Apply the parent's review, compute the payout and credit the child
    #[tracing::instrument(skip_all, fields(user = %user_id, record = %command.record_id))]
    pub async fn approve_daily_record(
        &self,
        user_id: &str,
        command: ApproveDailyRecordCommand,
    ) -> DomainResult<ApprovalResult> {
        let mut record = self
            .load_authorized(user_id, &command.record_id, Action::Approve)
            .await?;

        let payout = record.approve(
            user_id,
            self.clock.now(),
            &command.chore_adjustments,
            command.penalties,
        )?;
        let (record, child_new_balance) = self.apply_payout(&record, payout.net_payout).await?;

        info!(
            "Daily record {} approved by {}: earned {:.2}, penalties {:.2}, paid {:.2}, balance now {:.2}",
            record.id,
            user_id,
            payout.total_chore_reward,
            payout.total_penalties,
            payout.net_payout,
            child_new_balance
        );
        Ok(ApprovalResult {
            record,
            payout,
            child_new_balance,
        })
    }

    /// Commit an approved record and its balance credit as one unit
    async fn apply_payout(&self, record: &DailyRecord, net_payout: f64) -> DomainResult<(DailyRecord, f64)> {
        match self.record_repository.commit_approval(record, net_payout).await? {
            ApprovalOutcome::Committed { record, new_balance } => Ok((record, new_balance)),
            ApprovalOutcome::VersionConflict => Err(version_conflict(&record.id)),
            ApprovalOutcome::ChildNotFound => {
                warn!("Child {} of record {} no longer exists", record.child_id, record.id);
                Err(DomainError::not_found("child not found"))
            }
        }
    }

    /// Turn a submitted record down without paying anything
    pub async fn reject_daily_record(
        &self,
        user_id: &str,
        command: RejectDailyRecordCommand,
    ) -> DomainResult<DailyRecord> {
        let mut record = self
            .load_authorized(user_id, &command.record_id, Action::Approve)
            .await?;

        record.reject(user_id, self.clock.now(), &command.reason)?;
        let record = self.persist(&record).await?;
        info!("Daily record {} rejected by {}", record.id, user_id);
        Ok(record)
    }

    pub async fn get_daily_record(&self, user_id: &str, record_id: &str) -> DomainResult<DailyRecord> {
        self.load_authorized(user_id, record_id, Action::Read).await
    }

    /// Records of a child between two days inclusive, most recent first
    pub async fn get_child_daily_records(
        &self,
        user_id: &str,
        query: DailyRecordHistoryQuery,
    ) -> DomainResult<Vec<DailyRecord>> {
        self.permissions
            .require(user_id, &query.family_id, Resource::DailyRecord, Action::Read)
            .await?;

        let start = self.day_boundary.parse_day(&query.start_date)?;
        let end = self.day_boundary.parse_day(&query.end_date)?;
        if start > end {
            return Err(DomainError::validation(format!(
                "start date {} is after end date {}",
                start, end
            )));
        }

        let records = self
            .record_repository
            .list_records(&query.child_id, &query.family_id, start, end)
            .await?;
        info!(
            "Found {} daily records for child {} between {} and {}",
            records.len(),
            query.child_id,
            start,
            end
        );
        Ok(records)
    }
}
