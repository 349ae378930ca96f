//! Payout calculation for an approved daily record.
//!
//! Pure functions only; the balance mutation lives with the approval step in
//! the daily record service.

use crate::backend::domain::models::daily_record::{DailyChore, Penalty};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PayoutBreakdown {
    pub total_chore_reward: f64,
    pub total_penalties: f64,
    pub net_payout: f64,
}

/// Reward earned by one chore.
///
/// An overridden chore pays the parent's amount, and an override without an
/// amount pays nothing. Otherwise the reward scales with the reported
/// completion.
pub fn chore_reward(chore: &DailyChore) -> f64 {
    if chore.is_overridden {
        chore.parent_adjusted_reward.unwrap_or(0.0)
    } else {
        chore.reward_amount * chore.completion_status.factor()
    }
}

/// Net payout never goes below zero: a bad day does not carry a debt forward.
pub fn compute_payout(chores: &[DailyChore], penalties: &[Penalty]) -> PayoutBreakdown {
    let total_chore_reward: f64 = chores.iter().map(chore_reward).sum();
    let total_penalties: f64 = penalties.iter().map(|penalty| penalty.amount).sum();
    let net_payout = (total_chore_reward - total_penalties).max(0.0);

    PayoutBreakdown {
        total_chore_reward,
        total_penalties,
        net_payout,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::models::daily_record::CompletionStatus;
    use chrono::Utc;

    fn chore(reward: f64, status: CompletionStatus) -> DailyChore {
        DailyChore {
            completion_status: status,
            ..DailyChore::snapshot("chore::x", "Chore", reward)
        }
    }

    fn overridden(reward: f64, status: CompletionStatus, adjusted: Option<f64>) -> DailyChore {
        DailyChore {
            is_overridden: true,
            parent_adjusted_reward: adjusted,
            ..chore(reward, status)
        }
    }

    fn penalty(amount: f64) -> Penalty {
        Penalty {
            amount,
            reason: "late".to_string(),
            applied_by: "user::mom".to_string(),
            applied_at: Utc::now(),
        }
    }

    #[test]
    fn test_reward_scales_with_completion() {
        assert_eq!(chore_reward(&chore(4.0, CompletionStatus::NotDone)), 0.0);
        assert_eq!(chore_reward(&chore(4.0, CompletionStatus::Partial)), 2.0);
        assert_eq!(chore_reward(&chore(4.0, CompletionStatus::Done)), 4.0);
    }

    #[test]
    fn test_override_replaces_reported_value() {
        // Full completion, parent gives partial credit
        let payout = compute_payout(&[overridden(2.0, CompletionStatus::Done, Some(1.0))], &[]);
        assert_eq!(payout.total_chore_reward, 1.0);
        assert_eq!(payout.net_payout, 1.0);

        // Nothing reported, parent pays anyway
        assert_eq!(chore_reward(&overridden(2.0, CompletionStatus::NotDone, Some(3.0))), 3.0);
    }

    #[test]
    fn test_override_without_amount_zeroes_the_chore() {
        assert_eq!(chore_reward(&overridden(2.0, CompletionStatus::Done, None)), 0.0);
    }

    #[test]
    fn test_penalties_floor_at_zero() {
        let payout = compute_payout(
            &[chore(1.0, CompletionStatus::Done), chore(2.0, CompletionStatus::Done)],
            &[penalty(5.0)],
        );
        assert_eq!(payout.total_chore_reward, 3.0);
        assert_eq!(payout.total_penalties, 5.0);
        assert_eq!(payout.net_payout, 0.0);
    }

    #[test]
    fn test_mixed_record() {
        let chores = vec![
            chore(2.0, CompletionStatus::Done),
            chore(3.0, CompletionStatus::Partial),
            chore(5.0, CompletionStatus::NotDone),
            overridden(4.0, CompletionStatus::Partial, Some(0.5)),
        ];
        let payout = compute_payout(&chores, &[penalty(1.0), penalty(0.5)]);
        assert_eq!(payout.total_chore_reward, 4.0);
        assert_eq!(payout.total_penalties, 1.5);
        assert_eq!(payout.net_payout, 2.5);
    }

    #[test]
    fn test_empty_record_pays_nothing() {
        let payout = compute_payout(&[], &[]);
        assert_eq!(payout, PayoutBreakdown { total_chore_reward: 0.0, total_penalties: 0.0, net_payout: 0.0 });
    }
}
