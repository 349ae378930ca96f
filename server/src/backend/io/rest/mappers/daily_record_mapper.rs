//! Mapping between daily record DTOs and domain models.

use shared::{
    ApproveDailyRecordRequest, DailyChore as SharedDailyChore, DailyRecord as SharedDailyRecord,
    DailyRecordStatus, PayoutResult, Penalty as SharedPenalty,
};

use crate::backend::domain::calendar::format_day;
use crate::backend::domain::commands::daily_records::{ApprovalResult, ApproveDailyRecordCommand};
use crate::backend::domain::models::daily_record::{
    ChoreOverride, DailyChore, DailyRecord, NewPenalty, Penalty, RecordState,
};

pub struct DailyRecordMapper;

impl DailyRecordMapper {
    /// Flatten a record into its wire shape; flags and status all come from the one state
    pub fn to_dto(domain: DailyRecord) -> SharedDailyRecord {
        let status = Self::status_of(&domain.state);
        let is_submitted = domain.state.is_submitted();
        let is_approved = domain.state.is_approved();
        let submitted_at = domain.state.submitted_at().map(|at| at.to_rfc3339());
        let total_reward = domain.state.total_reward();

        let (approved_at, approved_by) = match &domain.state {
            RecordState::Approved { approved_at, approved_by, .. } => {
                (Some(approved_at.to_rfc3339()), Some(approved_by.clone()))
            }
            _ => (None, None),
        };
        let (rejected_at, rejected_by, rejection_reason) = match &domain.state {
            RecordState::Rejected { rejected_at, rejected_by, reason, .. } => (
                Some(rejected_at.to_rfc3339()),
                Some(rejected_by.clone()),
                Some(reason.clone()),
            ),
            _ => (None, None, None),
        };

        SharedDailyRecord {
            id: domain.id,
            family_id: domain.family_id,
            child_id: domain.child_id,
            due_date: format_day(domain.due_date),
            chores_list: domain.chores.into_iter().map(Self::chore_to_dto).collect(),
            penalties: domain.penalties.into_iter().map(Self::penalty_to_dto).collect(),
            is_submitted,
            is_approved,
            submitted_at,
            approved_at,
            approved_by,
            rejected_at,
            rejected_by,
            rejection_reason,
            total_reward,
            status,
            version: domain.version,
            created_at: domain.created_at.to_rfc3339(),
        }
    }

    fn status_of(state: &RecordState) -> DailyRecordStatus {
        match state {
            RecordState::Pending => DailyRecordStatus::Pending,
            RecordState::Submitted { .. } => DailyRecordStatus::Submitted,
            RecordState::Approved { .. } => DailyRecordStatus::Approved,
            RecordState::Rejected { .. } => DailyRecordStatus::Rejected,
        }
    }

    fn chore_to_dto(chore: DailyChore) -> SharedDailyChore {
        SharedDailyChore {
            chore_id: chore.chore_id,
            task_name: chore.task_name,
            reward_amount: chore.reward_amount,
            completion_status: chore.completion_status.factor(),
            parent_adjusted_reward: chore.parent_adjusted_reward,
            is_overridden: chore.is_overridden,
            notes: chore.notes,
        }
    }

    fn penalty_to_dto(penalty: Penalty) -> SharedPenalty {
        SharedPenalty {
            amount: penalty.amount,
            reason: penalty.reason,
            applied_by: penalty.applied_by,
            applied_at: penalty.applied_at.to_rfc3339(),
        }
    }

    pub fn to_approve_command(record_id: String, request: ApproveDailyRecordRequest) -> ApproveDailyRecordCommand {
        ApproveDailyRecordCommand {
            record_id,
            chore_adjustments: request
                .chore_adjustments
                .into_iter()
                .map(|adjustment| ChoreOverride {
                    chore_index: adjustment.chore_index,
                    is_overridden: adjustment.is_overridden,
                    parent_adjusted_reward: adjustment.parent_adjusted_reward,
                })
                .collect(),
            penalties: request
                .penalties
                .into_iter()
                .map(|penalty| NewPenalty {
                    amount: penalty.amount,
                    reason: penalty.reason,
                })
                .collect(),
        }
    }

    pub fn to_payout_dto(result: &ApprovalResult) -> PayoutResult {
        PayoutResult {
            total_chore_reward: result.payout.total_chore_reward,
            total_penalties: result.payout.total_penalties,
            net_payout: result.payout.net_payout,
            child_new_balance: result.child_new_balance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn record() -> DailyRecord {
        let created = Utc.with_ymd_and_hms(2025, 6, 14, 6, 0, 0).unwrap();
        DailyRecord::new_pending(
            "family::1",
            "child::1",
            NaiveDate::from_ymd_opt(2025, 6, 14).unwrap(),
            vec![DailyChore::snapshot("chore::bed", "Make bed", 2.0)],
            created,
        )
    }

    #[test]
    fn test_pending_record_flags() {
        let dto = DailyRecordMapper::to_dto(record());
        assert_eq!(dto.due_date, "2025-06-14");
        assert_eq!(dto.status, DailyRecordStatus::Pending);
        assert!(!dto.is_submitted);
        assert!(!dto.is_approved);
        assert_eq!(dto.total_reward, None);
        assert_eq!(dto.chores_list[0].completion_status, 0.0);
    }

    #[test]
    fn test_flags_follow_state() {
        let at = Utc.with_ymd_and_hms(2025, 6, 14, 20, 0, 0).unwrap();
        let mut approved = record();
        approved.submit(at).unwrap();
        approved.approve("user::mom", at, &[], vec![]).unwrap();
        let dto = DailyRecordMapper::to_dto(approved);
        assert_eq!(dto.status, DailyRecordStatus::Approved);
        assert!(dto.is_submitted && dto.is_approved);
        assert_eq!(dto.approved_by.as_deref(), Some("user::mom"));
        assert_eq!(dto.total_reward, Some(0.0));

        let mut rejected = record();
        rejected.submit(at).unwrap();
        rejected.reject("user::mom", at, "not done").unwrap();
        let dto = DailyRecordMapper::to_dto(rejected);
        assert_eq!(dto.status, DailyRecordStatus::Rejected);
        assert!(dto.is_submitted && !dto.is_approved);
        assert_eq!(dto.rejection_reason.as_deref(), Some("not done"));
        assert_eq!(dto.approved_at, None);
    }
}
