//! Domain model for a daily record and its lifecycle.
//!
//! A record moves `Pending -> Submitted -> Approved` (or `Rejected`). The state
//! is one tagged enum, so combinations such as "approved but never submitted"
//! cannot be represented. All transitions live here as pure methods; services
//! load a record, call a transition, and persist the result with a version
//! check.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::domain::errors::{DomainError, DomainResult};
use crate::backend::domain::payout::{compute_payout, PayoutBreakdown};

/// How much of a chore the child reports as done
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum CompletionStatus {
    NotDone,
    Partial,
    Done,
}

impl CompletionStatus {
    /// Share of the reward earned at this status
    pub fn factor(self) -> f64 {
        match self {
            CompletionStatus::NotDone => 0.0,
            CompletionStatus::Partial => 0.5,
            CompletionStatus::Done => 1.0,
        }
    }
}

impl TryFrom<f64> for CompletionStatus {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if value == 0.0 {
            Ok(CompletionStatus::NotDone)
        } else if value == 0.5 {
            Ok(CompletionStatus::Partial)
        } else if value == 1.0 {
            Ok(CompletionStatus::Done)
        } else {
            Err(DomainError::validation(format!(
                "completion status must be 0, 0.5 or 1, got {}",
                value
            )))
        }
    }
}

impl From<CompletionStatus> for f64 {
    fn from(status: CompletionStatus) -> f64 {
        status.factor()
    }
}

/// Snapshot of a chore taken when it was scheduled into a record.
///
/// `task_name` and `reward_amount` are copied once and never re-read from the
/// template, so later template edits do not rewrite history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyChore {
    pub chore_id: String,
    pub task_name: String,
    pub reward_amount: f64,
    pub completion_status: CompletionStatus,
    pub parent_adjusted_reward: Option<f64>,
    pub is_overridden: bool,
    pub notes: Option<String>,
}

impl DailyChore {
    pub fn snapshot(chore_id: &str, task_name: &str, reward_amount: f64) -> Self {
        Self {
            chore_id: chore_id.to_string(),
            task_name: task_name.to_string(),
            reward_amount,
            completion_status: CompletionStatus::NotDone,
            parent_adjusted_reward: None,
            is_overridden: false,
            notes: None,
        }
    }

    /// Copy of this chore for the next day's record: same chore, same
    /// reward, no parent decisions attached.
    pub fn carried_forward(&self) -> Self {
        Self {
            parent_adjusted_reward: None,
            is_overridden: false,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Penalty {
    pub amount: f64,
    pub reason: String,
    pub applied_by: String,
    pub applied_at: DateTime<Utc>,
}

/// Parent override for one chore, addressed by index
#[derive(Debug, Clone, PartialEq)]
pub struct ChoreOverride {
    pub chore_index: usize,
    pub is_overridden: bool,
    pub parent_adjusted_reward: Option<f64>,
}

/// Penalty as supplied by the approving parent, before it is stamped
#[derive(Debug, Clone, PartialEq)]
pub struct NewPenalty {
    pub amount: f64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordState {
    Pending,
    Submitted {
        submitted_at: DateTime<Utc>,
    },
    Approved {
        submitted_at: DateTime<Utc>,
        approved_at: DateTime<Utc>,
        approved_by: String,
        total_reward: f64,
    },
    Rejected {
        submitted_at: DateTime<Utc>,
        rejected_at: DateTime<Utc>,
        rejected_by: String,
        reason: String,
    },
}

impl RecordState {
    pub fn name(&self) -> &'static str {
        match self {
            RecordState::Pending => "pending",
            RecordState::Submitted { .. } => "submitted",
            RecordState::Approved { .. } => "approved",
            RecordState::Rejected { .. } => "rejected",
        }
    }

    pub fn is_submitted(&self) -> bool {
        !matches!(self, RecordState::Pending)
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, RecordState::Approved { .. })
    }

    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        match self {
            RecordState::Pending => None,
            RecordState::Submitted { submitted_at }
            | RecordState::Approved { submitted_at, .. }
            | RecordState::Rejected { submitted_at, .. } => Some(*submitted_at),
        }
    }

    pub fn total_reward(&self) -> Option<f64> {
        match self {
            RecordState::Approved { total_reward, .. } => Some(*total_reward),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyRecord {
    pub id: String,
    pub family_id: String,
    pub child_id: String,
    pub due_date: NaiveDate,
    pub chores: Vec<DailyChore>,
    pub penalties: Vec<Penalty>,
    pub state: RecordState,
    /// Bumped by storage on every write; writers must present the version they read
    pub version: i64,
    pub created_at: DateTime<Utc>,
}

impl DailyRecord {
    pub fn generate_id() -> String {
        format!("daily_record::{}", Uuid::new_v4())
    }

    pub fn new_pending(
        family_id: &str,
        child_id: &str,
        due_date: NaiveDate,
        chores: Vec<DailyChore>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Self::generate_id(),
            family_id: family_id.to_string(),
            child_id: child_id.to_string(),
            due_date,
            chores,
            penalties: Vec::new(),
            state: RecordState::Pending,
            version: 0,
            created_at,
        }
    }

    /// Record a child's completion report for one chore
    pub fn set_completion(&mut self, chore_index: usize, status: CompletionStatus) -> DomainResult<()> {
        if self.state.is_submitted() {
            return Err(DomainError::invalid_state("daily record already submitted"));
        }
        let chore_count = self.chores.len();
        let chore = self.chores.get_mut(chore_index).ok_or_else(|| {
            DomainError::validation(format!(
                "invalid chore index {} (record has {} chores)",
                chore_index, chore_count
            ))
        })?;
        chore.completion_status = status;
        Ok(())
    }

    /// Lock the record for parent review
    pub fn submit(&mut self, at: DateTime<Utc>) -> DomainResult<()> {
        match self.state {
            RecordState::Pending => {
                self.state = RecordState::Submitted { submitted_at: at };
                Ok(())
            }
            _ => Err(DomainError::invalid_state("daily record already submitted")),
        }
    }

    fn submitted_for_review(&self) -> DomainResult<DateTime<Utc>> {
        match &self.state {
            RecordState::Submitted { submitted_at } => Ok(*submitted_at),
            RecordState::Pending => Err(DomainError::invalid_state(
                "daily record must be submitted before approval",
            )),
            RecordState::Approved { .. } => {
                Err(DomainError::invalid_state("daily record already approved"))
            }
            RecordState::Rejected { .. } => {
                Err(DomainError::invalid_state("daily record already rejected"))
            }
        }
    }

    /// Apply parent overrides and penalties, compute the payout and move to
    /// `Approved`. Every input is validated before anything is changed.
    pub fn approve(
        &mut self,
        approved_by: &str,
        at: DateTime<Utc>,
        overrides: &[ChoreOverride],
        penalties: Vec<NewPenalty>,
    ) -> DomainResult<PayoutBreakdown> {
        let submitted_at = self.submitted_for_review()?;

        for adjustment in overrides {
            if adjustment.chore_index >= self.chores.len() {
                return Err(DomainError::validation(format!(
                    "invalid chore index {} in adjustments (record has {} chores)",
                    adjustment.chore_index,
                    self.chores.len()
                )));
            }
            if let Some(reward) = adjustment.parent_adjusted_reward {
                if !reward.is_finite() || reward < 0.0 {
                    return Err(DomainError::validation(format!(
                        "adjusted reward must be a non-negative amount, got {}",
                        reward
                    )));
                }
            }
        }
        for penalty in &penalties {
            if !penalty.amount.is_finite() || penalty.amount < 0.0 {
                return Err(DomainError::validation(format!(
                    "penalty amount must be a non-negative amount, got {}",
                    penalty.amount
                )));
            }
            if penalty.reason.trim().is_empty() {
                return Err(DomainError::validation("penalty reason cannot be empty"));
            }
        }

        for adjustment in overrides {
            let chore = &mut self.chores[adjustment.chore_index];
            chore.is_overridden = adjustment.is_overridden;
            chore.parent_adjusted_reward = adjustment.parent_adjusted_reward;
        }
        self.penalties = penalties
            .into_iter()
            .map(|penalty| Penalty {
                amount: penalty.amount,
                reason: penalty.reason.trim().to_string(),
                applied_by: approved_by.to_string(),
                applied_at: at,
            })
            .collect();

        let payout = compute_payout(&self.chores, &self.penalties);
        self.state = RecordState::Approved {
            submitted_at,
            approved_at: at,
            approved_by: approved_by.to_string(),
            total_reward: payout.net_payout,
        };
        Ok(payout)
    }

    /// Turn a submitted record down; nothing is paid for it
    pub fn reject(&mut self, rejected_by: &str, at: DateTime<Utc>, reason: &str) -> DomainResult<()> {
        if reason.trim().is_empty() {
            return Err(DomainError::validation("rejection reason cannot be empty"));
        }
        let submitted_at = match &self.state {
            RecordState::Submitted { submitted_at } => *submitted_at,
            RecordState::Pending => {
                return Err(DomainError::invalid_state(
                    "daily record must be submitted before it can be rejected",
                ))
            }
            RecordState::Approved { .. } => {
                return Err(DomainError::invalid_state("daily record already approved"))
            }
            RecordState::Rejected { .. } => {
                return Err(DomainError::invalid_state("daily record already rejected"))
            }
        };
        self.state = RecordState::Rejected {
            submitted_at,
            rejected_at: at,
            rejected_by: rejected_by.to_string(),
            reason: reason.trim().to_string(),
        };
        Ok(())
    }

    /// Chores nobody started, in their original order
    pub fn untouched_chores(&self) -> impl Iterator<Item = &DailyChore> {
        self.chores
            .iter()
            .filter(|chore| chore.completion_status == CompletionStatus::NotDone)
    }
}
