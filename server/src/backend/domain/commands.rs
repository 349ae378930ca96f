//! Domain-level command and query types.
//!
//! Services take these instead of the wire DTOs from the `shared` crate; the
//! REST layer maps between the two.

pub mod daily_records {
    use crate::backend::domain::models::daily_record::{ChoreOverride, DailyRecord, NewPenalty};
    use crate::backend::domain::payout::PayoutBreakdown;

    /// Input for opening the record of a day
    #[derive(Debug, Clone)]
    pub struct GetOrCreateDailyRecordCommand {
        pub child_id: String,
        pub family_id: String,
        /// ISO-8601 date or timestamp; the clock's current day when absent
        pub today: Option<String>,
    }

    #[derive(Debug, Clone)]
    pub struct UpdateChoreCompletionCommand {
        pub record_id: String,
        pub chore_index: usize,
        /// Raw value as reported; only 0, 0.5 and 1 are accepted
        pub completion_status: f64,
    }

    #[derive(Debug, Clone)]
    pub struct ApproveDailyRecordCommand {
        pub record_id: String,
        pub chore_adjustments: Vec<ChoreOverride>,
        pub penalties: Vec<NewPenalty>,
    }

    #[derive(Debug, Clone)]
    pub struct RejectDailyRecordCommand {
        pub record_id: String,
        pub reason: String,
    }

    /// History query; both ends inclusive
    #[derive(Debug, Clone)]
    pub struct DailyRecordHistoryQuery {
        pub child_id: String,
        pub family_id: String,
        pub start_date: String,
        pub end_date: String,
    }

    /// Result of approving a record
    #[derive(Debug, Clone)]
    pub struct ApprovalResult {
        pub record: DailyRecord,
        pub payout: PayoutBreakdown,
        pub child_new_balance: f64,
    }
}

pub mod chores {
    /// Input for creating a chore template.
    #[derive(Debug, Clone)]
    pub struct CreateChoreCommand {
        pub family_id: String,
        pub task_name: String,
        pub reward_amount: f64,
        pub is_recurring: bool,
        pub interval_days: Option<u32>,
        pub suggested_time: Option<String>,
        pub due_date: Option<String>,
    }

    /// Partial update; `None` leaves the field as it is.
    #[derive(Debug, Clone, Default)]
    pub struct UpdateChoreCommand {
        pub task_name: Option<String>,
        pub reward_amount: Option<f64>,
        pub is_recurring: Option<bool>,
        pub interval_days: Option<u32>,
        pub suggested_time: Option<String>,
        pub due_date: Option<String>,
        pub is_active: Option<bool>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct AssignmentToggleResult {
        pub child_id: String,
        pub chore_id: String,
        pub assigned: bool,
        pub changed: bool,
    }
}

pub mod children {
    #[derive(Debug, Clone)]
    pub struct CreateChildCommand {
        pub family_id: String,
        pub name: String,
    }

    #[derive(Debug, Clone)]
    pub struct AdjustBalanceCommand {
        pub child_id: String,
        pub amount: f64,
        pub note: Option<String>,
    }
}

pub mod family {
    use crate::backend::domain::models::member::Role;

    #[derive(Debug, Clone)]
    pub struct AddMemberCommand {
        pub family_id: String,
        pub user_id: String,
        pub role: Role,
    }
}
