//! Builds the chore list of a new day's record.
//!
//! A new record starts with whatever the child left untouched in their most
//! recent earlier record, followed by the assigned chores that have come due.
//! Picking a due chore also moves its schedule, and those schedule changes are
//! committed in the same storage transaction as the record itself.

use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::sync::Arc;

use crate::backend::domain::calendar::add_days;
use crate::backend::domain::errors::{DomainError, DomainResult};
use crate::backend::domain::models::chore::{ChildChoreAssignment, ScheduleUpdate};
use crate::backend::domain::models::daily_record::{DailyChore, DailyRecord};
use crate::backend::storage::{
    AssignmentStorage, ChoreStorage, Connection, CreateRecordOutcome, DailyRecordStorage,
};

/// Chores that came due for a day, and the schedule changes picking them implies
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecurringSelection {
    pub chores: Vec<DailyChore>,
    pub updates: Vec<ScheduleUpdate>,
}

/// First occurrence after `day` on the schedule that runs from `from` every
/// `interval` days. A pointer left behind by skipped days is caught up in one
/// step rather than firing once per missed interval.
pub fn next_occurrence_after(from: NaiveDate, interval: u32, day: NaiveDate) -> DomainResult<NaiveDate> {
    let interval = u64::from(interval.max(1));
    let elapsed = u64::try_from((day - from).num_days()).unwrap_or(0);
    let steps = elapsed / interval + 1;
    add_days(from, steps * interval)
}

const MAX_SCHEDULE_ATTEMPTS: u32 = 3;

#[derive(Clone)]
pub struct RolloverService<C: Connection> {
    record_repository: C::DailyRecordRepository,
    assignment_repository: C::AssignmentRepository,
    chore_repository: C::ChoreRepository,
}

impl<C: Connection> RolloverService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            record_repository: connection.create_daily_record_repository(),
            assignment_repository: connection.create_assignment_repository(),
            chore_repository: connection.create_chore_repository(),
        }
    }

    /// Untouched chores of the most recent record before `day`, reset for a new day
    pub async fn get_rollover_chores(
        &self,
        child_id: &str,
        family_id: &str,
        day: NaiveDate,
    ) -> DomainResult<Vec<DailyChore>> {
        let previous = self
            .record_repository
            .latest_record_before(child_id, family_id, day)
            .await?;

        let Some(previous) = previous else {
            debug!("No record before {} for child {}, nothing to roll over", day, child_id);
            return Ok(Vec::new());
        };

        let chores: Vec<DailyChore> = previous.untouched_chores().map(DailyChore::carried_forward).collect();
        debug!(
            "Rolling {} untouched chores from {} into {} for child {}",
            chores.len(),
            previous.due_date,
            day,
            child_id
        );
        Ok(chores)
    }

    /// Assigned chores due on or before `day` that are not already in
    /// `existing_chore_ids`, snapshotted from their current template.
    pub async fn get_recurring_chores(
        &self,
        family_id: &str,
        child_id: &str,
        existing_chore_ids: &HashSet<String>,
        day: NaiveDate,
    ) -> DomainResult<RecurringSelection> {
        let assignments = self.assignment_repository.list_assignments(child_id).await?;
        let mut selected: HashSet<String> = HashSet::new();
        let mut selection = RecurringSelection::default();

        for assignment in assignments.iter().filter(|a| a.is_due(day)) {
            if existing_chore_ids.contains(&assignment.chore_id) || selected.contains(&assignment.chore_id) {
                continue;
            }

            let template = match self.chore_repository.get_chore(&assignment.chore_id).await? {
                Some(template) if template.is_active && template.family_id == family_id => template,
                _ => {
                    debug!(
                        "Skipping assignment of chore {} for child {}: template missing or inactive",
                        assignment.chore_id, child_id
                    );
                    continue;
                }
            };

            selection.updates.push(Self::schedule_update(
                assignment,
                template.is_recurring,
                template.interval_days,
                day,
            )?);
            selection.chores.push(DailyChore::snapshot(
                &template.id,
                &template.task_name,
                template.reward_amount,
            ));
            selected.insert(assignment.chore_id.clone());
        }

        Ok(selection)
    }

    fn schedule_update(
        assignment: &ChildChoreAssignment,
        is_recurring: bool,
        interval_days: Option<u32>,
        day: NaiveDate,
    ) -> DomainResult<ScheduleUpdate> {
        match (is_recurring, interval_days) {
            (true, Some(interval)) => Ok(ScheduleUpdate::Advance {
                child_id: assignment.child_id.clone(),
                chore_id: assignment.chore_id.clone(),
                expected_next_due: assignment.next_due,
                next_due: next_occurrence_after(assignment.next_due, interval, day)?,
            }),
            _ => Ok(ScheduleUpdate::Retire {
                child_id: assignment.child_id.clone(),
                chore_id: assignment.chore_id.clone(),
                expected_next_due: assignment.next_due,
            }),
        }
    }

    /// Return the record for `day`, creating it from rollover and due chores if
    /// there is none yet. Safe to call any number of times.
    ///
    /// If an assignment moves between selection and commit (another day's
    /// record scheduled it first), the selection is rebuilt from the stored
    /// schedule, up to `MAX_SCHEDULE_ATTEMPTS` times.
    pub async fn get_or_create_record_for_day(
        &self,
        child_id: &str,
        family_id: &str,
        day: NaiveDate,
        now: DateTime<Utc>,
    ) -> DomainResult<DailyRecord> {
        for attempt in 1..=MAX_SCHEDULE_ATTEMPTS {
            if let Some(existing) = self
                .record_repository
                .find_record_for_day(child_id, family_id, day)
                .await?
            {
                return Ok(existing);
            }

            let mut chores = self.get_rollover_chores(child_id, family_id, day).await?;
            let existing_ids: HashSet<String> = chores.iter().map(|c| c.chore_id.clone()).collect();
            let recurring = self
                .get_recurring_chores(family_id, child_id, &existing_ids, day)
                .await?;
            let rolled_over = chores.len();
            chores.extend(recurring.chores);

            let record = DailyRecord::new_pending(family_id, child_id, day, chores, now);
            match self
                .record_repository
                .create_record_with_schedule(&record, &recurring.updates)
                .await?
            {
                CreateRecordOutcome::Created(record) => {
                    info!(
                        "Created daily record {} for child {} on {} ({} rolled over, {} newly due)",
                        record.id,
                        child_id,
                        day,
                        rolled_over,
                        record.chores.len() - rolled_over
                    );
                    return Ok(record);
                }
                CreateRecordOutcome::AlreadyExists(existing) => {
                    debug!("Daily record for child {} on {} was created concurrently", child_id, day);
                    return Ok(existing);
                }
                CreateRecordOutcome::ScheduleConflict { chore_id, .. } => {
                    warn!(
                        "Schedule of chore {} moved while building {} for child {} (attempt {}/{})",
                        chore_id, day, child_id, attempt, MAX_SCHEDULE_ATTEMPTS
                    );
                }
            }
        }

        Err(DomainError::Conflict(format!(
            "chore schedule for child {} kept changing while creating the record for {}",
            child_id, day
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::calendar::Clock;
    use crate::backend::domain::commands::chores::UpdateChoreCommand;
    use crate::backend::domain::models::daily_record::CompletionStatus;
    use crate::backend::test_utils::{ServiceTestHelper, PARENT_ID};

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    #[test]
    fn test_next_occurrence_after() {
        assert_eq!(next_occurrence_after(day(6, 14), 1, day(6, 14)).unwrap(), day(6, 15));
        assert_eq!(next_occurrence_after(day(6, 14), 7, day(6, 14)).unwrap(), day(6, 21));
        // pointer three weeks behind a weekly chore
        assert_eq!(next_occurrence_after(day(5, 24), 7, day(6, 14)).unwrap(), day(6, 21));
        assert_eq!(next_occurrence_after(day(5, 25), 7, day(6, 14)).unwrap(), day(6, 15));
        // a pointer in the future still moves one interval
        assert_eq!(next_occurrence_after(day(6, 20), 2, day(6, 14)).unwrap(), day(6, 22));
    }

    #[tokio::test]
    async fn test_rollover_keeps_untouched_chores_in_order() {
        let helper = ServiceTestHelper::new().await.expect("Failed to create helper");
        let child = helper.create_child("Emma").await.unwrap();
        let a = helper.create_chore("A", 1.0, None).await.unwrap();
        let b = helper.create_chore("B", 2.0, None).await.unwrap();
        let c = helper.create_chore("C", 3.0, None).await.unwrap();
        for chore in [&a, &b, &c] {
            helper.assign(&child.id, &chore.id).await.unwrap();
        }
        let rollover = helper.rollover();
        let today = helper.env.today();

        let mut first = rollover
            .get_or_create_record_for_day(&child.id, &child.family_id, today, helper.env.clock.now())
            .await
            .unwrap();
        first.set_completion(1, CompletionStatus::Done).unwrap();
        first.chores[2].is_overridden = true;
        first.chores[2].parent_adjusted_reward = Some(0.5);
        helper.env.store_record(&first).await;

        let carried = rollover
            .get_rollover_chores(&child.id, &child.family_id, today.succ_opt().unwrap())
            .await
            .unwrap();
        let ids: Vec<&str> = carried.iter().map(|c| c.chore_id.as_str()).collect();
        assert_eq!(ids, vec![a.id.as_str(), c.id.as_str()]);
        assert_eq!(carried[1].reward_amount, 3.0);
        assert!(!carried[1].is_overridden);
        assert_eq!(carried[1].parent_adjusted_reward, None);
        assert!(rollover
            .get_rollover_chores(&child.id, &child.family_id, today)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_recurring_chores_skip_existing_and_inactive() {
        let helper = ServiceTestHelper::new().await.expect("Failed to create helper");
        let child = helper.create_child("Emma").await.unwrap();
        let daily = helper.create_chore("Make bed", 2.0, Some(1)).await.unwrap();
        let weekly = helper.create_chore("Mow lawn", 5.0, Some(7)).await.unwrap();
        let retired = helper.create_chore("Old chore", 1.0, Some(1)).await.unwrap();
        for chore in [&daily, &weekly, &retired] {
            helper.assign(&child.id, &chore.id).await.unwrap();
        }
        helper
            .chores
            .update_chore(
                PARENT_ID,
                &retired.id,
                UpdateChoreCommand { is_active: Some(false), ..Default::default() },
            )
            .await
            .unwrap();

        let existing: HashSet<String> = [daily.id.clone()].into_iter().collect();
        let selection = helper
            .rollover()
            .get_recurring_chores(&child.family_id, &child.id, &existing, helper.env.today())
            .await
            .unwrap();

        assert_eq!(selection.chores.len(), 1);
        assert_eq!(selection.chores[0].chore_id, weekly.id);
        assert_eq!(selection.chores[0].task_name, "Mow lawn");
        assert_eq!(selection.chores[0].completion_status, CompletionStatus::NotDone);
        assert_eq!(
            selection.updates,
            vec![ScheduleUpdate::Advance {
                child_id: child.id.clone(),
                chore_id: weekly.id.clone(),
                expected_next_due: helper.env.today(),
                next_due: helper.env.today() + chrono::Duration::days(7),
            }]
        );
    }

    #[tokio::test]
    async fn test_chores_not_yet_due_are_left_alone() {
        let helper = ServiceTestHelper::new().await.expect("Failed to create helper");
        let child = helper.create_child("Emma").await.unwrap();
        let weekly = helper.create_chore("Mow lawn", 5.0, Some(7)).await.unwrap();
        helper.assign(&child.id, &weekly.id).await.unwrap();
        let rollover = helper.rollover();

        let today = helper.env.today();
        rollover
            .get_or_create_record_for_day(&child.id, &child.family_id, today, helper.env.clock.now())
            .await
            .unwrap();

        for offset in 1..7 {
            let later = today + chrono::Duration::days(offset);
            let selection = rollover
                .get_recurring_chores(&child.family_id, &child.id, &HashSet::new(), later)
                .await
                .unwrap();
            assert!(selection.chores.is_empty(), "weekly chore fired after {} days", offset);
        }
        let week_later = rollover
            .get_recurring_chores(
                &child.family_id,
                &child.id,
                &HashSet::new(),
                today + chrono::Duration::days(7),
            )
            .await
            .unwrap();
        assert_eq!(week_later.chores.len(), 1);
    }

    #[tokio::test]
    async fn test_stale_selection_does_not_schedule_chore_twice() {
        let helper = ServiceTestHelper::new().await.expect("Failed to create helper");
        let child = helper.create_child("Emma").await.unwrap();
        let weekly = helper.create_chore("Mow lawn", 5.0, Some(7)).await.unwrap();
        helper.assign(&child.id, &weekly.id).await.unwrap();
        let rollover = helper.rollover();
        let today = helper.env.today();
        let tomorrow = today + chrono::Duration::days(1);
        let now = helper.env.clock.now();

        // today's selection is taken, then tomorrow's record commits first
        let stale = rollover
            .get_recurring_chores(&child.family_id, &child.id, &HashSet::new(), today)
            .await
            .unwrap();
        assert_eq!(stale.chores.len(), 1);
        let tomorrows = rollover
            .get_or_create_record_for_day(&child.id, &child.family_id, tomorrow, now)
            .await
            .unwrap();
        assert_eq!(tomorrows.chores.len(), 1);

        let late = DailyRecord::new_pending(&child.family_id, &child.id, today, stale.chores, now);
        let outcome = rollover
            .record_repository
            .create_record_with_schedule(&late, &stale.updates)
            .await
            .unwrap();
        assert!(matches!(outcome, CreateRecordOutcome::ScheduleConflict { .. }));

        let todays = rollover
            .get_or_create_record_for_day(&child.id, &child.family_id, today, now)
            .await
            .unwrap();
        assert!(todays.chores.is_empty());

        let assignment = helper
            .chores
            .list_assignments(PARENT_ID, &child.id)
            .await
            .unwrap()
            .into_iter()
            .find(|a| a.chore_id == weekly.id)
            .unwrap();
        assert_eq!(assignment.next_due, today + chrono::Duration::days(7));
    }
}
