use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a daily record as seen by clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DailyRecordStatus {
    Pending,
    Submitted,
    Approved,
    Rejected,
}

impl fmt::Display for DailyRecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DailyRecordStatus::Pending => "pending",
            DailyRecordStatus::Submitted => "submitted",
            DailyRecordStatus::Approved => "approved",
            DailyRecordStatus::Rejected => "rejected",
        };
        write!(f, "{}", name)
    }
}

/// A chore as it was scheduled into one day's record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyChore {
    pub chore_id: String,
    pub task_name: String,
    pub reward_amount: f64,
    /// 0 = not done, 0.5 = partially done, 1 = done
    pub completion_status: f64,
    pub parent_adjusted_reward: Option<f64>,
    pub is_overridden: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Penalty {
    pub amount: f64,
    pub reason: String,
    pub applied_by: String,
    /// RFC 3339
    pub applied_at: String,
}

/// Daily record in its flat wire shape.
///
/// The boolean flags and `status` are always derived from a single lifecycle
/// state on the server, so they never disagree with each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub id: String,
    pub family_id: String,
    pub child_id: String,
    /// Calendar day this record represents (YYYY-MM-DD)
    pub due_date: String,
    pub chores_list: Vec<DailyChore>,
    pub penalties: Vec<Penalty>,
    pub is_submitted: bool,
    pub is_approved: bool,
    pub submitted_at: Option<String>,
    pub approved_at: Option<String>,
    pub approved_by: Option<String>,
    pub rejected_at: Option<String>,
    pub rejected_by: Option<String>,
    pub rejection_reason: Option<String>,
    pub total_reward: Option<f64>,
    pub status: DailyRecordStatus,
    pub version: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetOrCreateDailyRecordRequest {
    pub child_id: String,
    pub family_id: String,
    /// ISO-8601 date or timestamp; the server's current day when absent
    pub today: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateChoreCompletionRequest {
    pub completion_status: f64,
}

/// Parent override for one chore of a record, addressed by its index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoreAdjustment {
    pub chore_index: usize,
    pub is_overridden: bool,
    pub parent_adjusted_reward: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenaltyRequest {
    pub amount: f64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ApproveDailyRecordRequest {
    #[serde(default)]
    pub chore_adjustments: Vec<ChoreAdjustment>,
    #[serde(default)]
    pub penalties: Vec<PenaltyRequest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectDailyRecordRequest {
    pub reason: String,
}

/// Outcome of approving a daily record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutResult {
    pub total_chore_reward: f64,
    pub total_penalties: f64,
    pub net_payout: f64,
    pub child_new_balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecordHistoryRequest {
    pub child_id: String,
    pub family_id: String,
    /// Inclusive, ISO-8601
    pub start_date: String,
    /// Inclusive, ISO-8601
    pub end_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecordListResponse {
    pub records: Vec<DailyRecord>,
}

/// Master definition of a chore owned by a family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoreTemplate {
    pub id: String,
    pub family_id: String,
    pub task_name: String,
    pub reward_amount: f64,
    pub is_recurring: bool,
    pub interval_days: Option<u32>,
    pub suggested_time: Option<String>,
    /// YYYY-MM-DD
    pub due_date: String,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateChoreRequest {
    pub family_id: String,
    pub task_name: String,
    pub reward_amount: f64,
    #[serde(default)]
    pub is_recurring: bool,
    pub interval_days: Option<u32>,
    pub suggested_time: Option<String>,
    /// ISO-8601; today when absent
    pub due_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UpdateChoreRequest {
    pub task_name: Option<String>,
    pub reward_amount: Option<f64>,
    pub is_recurring: Option<bool>,
    pub interval_days: Option<u32>,
    pub suggested_time: Option<String>,
    pub due_date: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoreListResponse {
    pub chores: Vec<ChoreTemplate>,
}

/// A chore assigned to a child, with its next due day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoreAssignment {
    pub child_id: String,
    pub chore_id: String,
    pub family_id: String,
    /// YYYY-MM-DD
    pub next_due: String,
    pub is_recurring: bool,
    pub interval_days: Option<u32>,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoreAssignmentListResponse {
    pub assignments: Vec<ChoreAssignment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToggleAssignmentResponse {
    pub child_id: String,
    pub chore_id: String,
    /// Whether the chore is assigned after the call
    pub assigned: bool,
    /// Whether the call changed anything
    pub changed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Child {
    pub id: String,
    pub family_id: String,
    pub name: String,
    pub current_balance: f64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateChildRequest {
    pub family_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildListResponse {
    pub children: Vec<Child>,
}

/// Manual deposit (positive) or payout/withdrawal (negative)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustBalanceRequest {
    pub amount: f64,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub child_id: String,
    pub current_balance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FamilyRole {
    Parent,
    Child,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyMember {
    pub family_id: String,
    pub user_id: String,
    pub role: FamilyRole,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddFamilyMemberRequest {
    pub user_id: String,
    pub role: FamilyRole,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyMemberListResponse {
    pub members: Vec<FamilyMember>,
}

/// Body of every non-2xx API response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}
