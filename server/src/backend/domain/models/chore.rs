//! Domain models for chore templates and their assignment to children.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::domain::errors::{DomainError, DomainResult};

pub const MAX_TASK_NAME_LEN: usize = 256;

/// Master definition of a chore, owned by a family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoreTemplate {
    pub id: String,
    pub family_id: String,
    pub task_name: String,
    pub reward_amount: f64,
    pub is_recurring: bool,
    /// Required when `is_recurring`
    pub interval_days: Option<u32>,
    pub suggested_time: Option<String>,
    pub due_date: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChoreTemplate {
    pub fn generate_id() -> String {
        format!("chore::{}", Uuid::new_v4())
    }

    /// Check the fields a parent controls
    pub fn validate(&self) -> DomainResult<()> {
        let name = self.task_name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("task name cannot be empty"));
        }
        if name.chars().count() > MAX_TASK_NAME_LEN {
            return Err(DomainError::validation(format!(
                "task name cannot exceed {} characters",
                MAX_TASK_NAME_LEN
            )));
        }
        if !self.reward_amount.is_finite() || self.reward_amount < 0.0 {
            return Err(DomainError::validation("reward amount cannot be negative"));
        }
        match (self.is_recurring, self.interval_days) {
            (true, None) => Err(DomainError::validation(
                "recurring chores need an interval in days",
            )),
            (_, Some(0)) => Err(DomainError::validation("interval days must be positive")),
            _ => Ok(()),
        }
    }
}

/// A chore assigned to a child, carrying the pointer to its next due day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildChoreAssignment {
    pub child_id: String,
    pub chore_id: String,
    pub family_id: String,
    pub next_due: NaiveDate,
    pub is_recurring: bool,
    pub interval_days: Option<u32>,
    pub is_active: bool,
}

impl ChildChoreAssignment {
    pub fn from_template(child_id: &str, template: &ChoreTemplate) -> Self {
        Self {
            child_id: child_id.to_string(),
            chore_id: template.id.clone(),
            family_id: template.family_id.clone(),
            next_due: template.due_date,
            is_recurring: template.is_recurring,
            interval_days: template.interval_days,
            is_active: template.is_active,
        }
    }

    pub fn is_due(&self, day: NaiveDate) -> bool {
        self.is_active && self.next_due <= day
    }
}

/// Change to an assignment that has to be committed together with the
/// record it was scheduled into.
///
/// `expected_next_due` is the pointer the selection was made from. The update
/// only applies while the stored assignment is still active with that pointer.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleUpdate {
    /// Recurring chore: move the next due day forward
    Advance {
        child_id: String,
        chore_id: String,
        expected_next_due: NaiveDate,
        next_due: NaiveDate,
    },
    /// One-shot chore: it has been handed out, take it off the list
    Retire {
        child_id: String,
        chore_id: String,
        expected_next_due: NaiveDate,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> ChoreTemplate {
        let now = Utc::now();
        ChoreTemplate {
            id: ChoreTemplate::generate_id(),
            family_id: "family::1".to_string(),
            task_name: "Make bed".to_string(),
            reward_amount: 2.0,
            is_recurring: true,
            interval_days: Some(1),
            suggested_time: Some("07:30".to_string()),
            due_date: NaiveDate::from_ymd_opt(2025, 6, 14).unwrap(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_valid_template() {
        assert!(template().validate().is_ok());
        assert!(template().id.starts_with("chore::"));
    }

    #[test]
    fn test_template_validation_errors() {
        let mut t = template();
        t.task_name = "   ".to_string();
        assert!(t.validate().unwrap_err().to_string().contains("cannot be empty"));

        let mut t = template();
        t.reward_amount = -1.0;
        assert!(t.validate().unwrap_err().to_string().contains("cannot be negative"));

        let mut t = template();
        t.interval_days = None;
        assert!(t.validate().unwrap_err().to_string().contains("need an interval"));

        let mut t = template();
        t.interval_days = Some(0);
        assert!(t.validate().unwrap_err().to_string().contains("must be positive"));

        let mut t = template();
        t.is_recurring = false;
        t.interval_days = None;
        assert!(t.validate().is_ok());
    }

    #[test]
    fn test_assignment_due_rules() {
        let t = template();
        let mut assignment = ChildChoreAssignment::from_template("child::1", &t);
        assert_eq!(assignment.next_due, t.due_date);

        assert!(assignment.is_due(t.due_date));
        assert!(assignment.is_due(t.due_date.succ_opt().unwrap()));
        assert!(!assignment.is_due(t.due_date.pred_opt().unwrap()));

        assignment.is_active = false;
        assert!(!assignment.is_due(t.due_date));
    }
}
