//! # Storage Traits
//!
//! This module defines the storage abstraction traits that allow different
//! storage backends to be used interchangeably in the domain layer.
//!
//! Two operations carry the consistency guarantees the daily record engine
//! depends on and must be atomic in every backend:
//!
//! - [`DailyRecordStorage::create_record_with_schedule`] writes a new record
//!   and the assignment schedule updates it consumed as one unit;
//! - [`DailyRecordStorage::commit_approval`] writes the approved record and
//!   increments the child's balance as one unit.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::backend::domain::models::{
    child::ChildLedger,
    chore::{ChildChoreAssignment, ChoreTemplate, ScheduleUpdate},
    daily_record::DailyRecord,
    member::FamilyMember,
};

/// Trait defining the interface for child ledger storage operations
#[async_trait]
pub trait ChildStorage: Send + Sync {
    /// Store a new child
    async fn store_child(&self, child: &ChildLedger) -> Result<()>;

    /// Retrieve a specific child by ID
    async fn get_child(&self, child_id: &str) -> Result<Option<ChildLedger>>;

    /// List the children of a family ordered by name
    async fn list_children(&self, family_id: &str) -> Result<Vec<ChildLedger>>;

    /// Add `delta` to the child's balance in a single atomic update.
    /// Returns the new balance, or `None` if the child does not exist.
    async fn increment_balance(&self, child_id: &str, delta: f64) -> Result<Option<f64>>;
}

/// Trait defining the interface for chore template storage operations
#[async_trait]
pub trait ChoreStorage: Send + Sync {
    async fn store_chore(&self, chore: &ChoreTemplate) -> Result<()>;

    async fn get_chore(&self, chore_id: &str) -> Result<Option<ChoreTemplate>>;

    /// List a family's chores ordered by task name
    async fn list_chores(&self, family_id: &str, include_inactive: bool) -> Result<Vec<ChoreTemplate>>;

    /// Returns false if the chore does not exist
    async fn update_chore(&self, chore: &ChoreTemplate) -> Result<bool>;
}

/// Trait defining the interface for chore assignment storage operations
#[async_trait]
pub trait AssignmentStorage: Send + Sync {
    async fn list_assignments(&self, child_id: &str) -> Result<Vec<ChildChoreAssignment>>;

    async fn get_assignment(&self, child_id: &str, chore_id: &str) -> Result<Option<ChildChoreAssignment>>;

    /// Insert the assignment, or reactivate it if it exists but is inactive.
    /// Returns true when anything changed; assigning twice is a no-op.
    async fn upsert_assignment(&self, assignment: &ChildChoreAssignment) -> Result<bool>;

    /// Returns true when an assignment was removed
    async fn remove_assignment(&self, child_id: &str, chore_id: &str) -> Result<bool>;

    /// Deactivate every child's assignment of a chore, returning how many changed
    async fn deactivate_assignments_for_chore(&self, chore_id: &str) -> Result<u64>;

    /// Point every active assignment of a chore at a new next due day
    async fn reschedule_assignments_for_chore(&self, chore_id: &str, next_due: NaiveDate) -> Result<u64>;
}

/// Result of trying to create a day's record
#[derive(Debug, Clone, PartialEq)]
pub enum CreateRecordOutcome {
    Created(DailyRecord),
    /// Another writer created the record for this day first; nothing was written
    AlreadyExists(DailyRecord),
    /// An assignment no longer matches the schedule the record was built
    /// from; nothing was written
    ScheduleConflict { child_id: String, chore_id: String },
}

/// Result of committing an approval
#[derive(Debug, Clone, PartialEq)]
pub enum ApprovalOutcome {
    Committed { record: DailyRecord, new_balance: f64 },
    /// The stored record changed since it was read; nothing was written
    VersionConflict,
    /// The child no longer exists; nothing was written
    ChildNotFound,
}

/// Trait defining the interface for daily record storage operations
#[async_trait]
pub trait DailyRecordStorage: Send + Sync {
    async fn get_record(&self, record_id: &str) -> Result<Option<DailyRecord>>;

    async fn find_record_for_day(
        &self,
        child_id: &str,
        family_id: &str,
        day: NaiveDate,
    ) -> Result<Option<DailyRecord>>;

    /// The most recent record strictly before `day`
    async fn latest_record_before(
        &self,
        child_id: &str,
        family_id: &str,
        day: NaiveDate,
    ) -> Result<Option<DailyRecord>>;

    /// Records with `start <= due_date <= end`, most recent first
    async fn list_records(
        &self,
        child_id: &str,
        family_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyRecord>>;

    /// Insert a new record and apply the schedule updates it consumed, atomically.
    /// Each update is conditional on the assignment still being active with
    /// its expected pointer; one stale update rolls back the whole create.
    async fn create_record_with_schedule(
        &self,
        record: &DailyRecord,
        updates: &[ScheduleUpdate],
    ) -> Result<CreateRecordOutcome>;

    /// Persist the record if the stored version still equals `record.version`.
    /// Returns the record with its new version, or `None` on a version mismatch.
    async fn update_record(&self, record: &DailyRecord) -> Result<Option<DailyRecord>>;

    /// Persist an approved record and add `net_payout` to the child's balance,
    /// atomically and under the same version check as `update_record`
    async fn commit_approval(&self, record: &DailyRecord, net_payout: f64) -> Result<ApprovalOutcome>;
}

/// Trait defining the interface for family membership storage operations
#[async_trait]
pub trait MemberStorage: Send + Sync {
    /// Insert the member or replace their role
    async fn add_member(&self, member: &FamilyMember) -> Result<()>;

    async fn get_member(&self, family_id: &str, user_id: &str) -> Result<Option<FamilyMember>>;

    async fn list_members(&self, family_id: &str) -> Result<Vec<FamilyMember>>;
}

/// Trait defining the interface for storage connections
///
/// This trait abstracts away the specific connection type and provides
/// factory methods for creating repositories, so the domain layer can work
/// with any storage backend without knowing the implementation details.
pub trait Connection: Send + Sync + Clone + 'static {
    type ChildRepository: ChildStorage + Clone + 'static;
    type ChoreRepository: ChoreStorage + Clone + 'static;
    type AssignmentRepository: AssignmentStorage + Clone + 'static;
    type DailyRecordRepository: DailyRecordStorage + Clone + 'static;
    type MemberRepository: MemberStorage + Clone + 'static;

    fn create_child_repository(&self) -> Self::ChildRepository;
    fn create_chore_repository(&self) -> Self::ChoreRepository;
    fn create_assignment_repository(&self) -> Self::AssignmentRepository;
    fn create_daily_record_repository(&self) -> Self::DailyRecordRepository;
    fn create_member_repository(&self) -> Self::MemberRepository;
}
