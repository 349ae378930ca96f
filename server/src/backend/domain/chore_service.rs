//! Chore template management and assignment of chores to children.

use log::{info, warn};
use std::sync::Arc;

use crate::backend::domain::calendar::{Clock, DayBoundary};
use crate::backend::domain::commands::chores::{
    AssignmentToggleResult, CreateChoreCommand, UpdateChoreCommand,
};
use crate::backend::domain::errors::{DomainError, DomainResult};
use crate::backend::domain::models::child::ChildLedger;
use crate::backend::domain::models::chore::{ChildChoreAssignment, ChoreTemplate};
use crate::backend::domain::permissions::{Action, PermissionChecker, Resource};
use crate::backend::storage::{AssignmentStorage, ChildStorage, ChoreStorage, Connection};

#[derive(Clone)]
pub struct ChoreService<C: Connection> {
    chore_repository: C::ChoreRepository,
    child_repository: C::ChildRepository,
    assignment_repository: C::AssignmentRepository,
    permissions: Arc<dyn PermissionChecker>,
    clock: Arc<dyn Clock>,
    day_boundary: DayBoundary,
}

impl<C: Connection> ChoreService<C> {
    pub fn new(
        connection: Arc<C>,
        permissions: Arc<dyn PermissionChecker>,
        clock: Arc<dyn Clock>,
        day_boundary: DayBoundary,
    ) -> Self {
        Self {
            chore_repository: connection.create_chore_repository(),
            child_repository: connection.create_child_repository(),
            assignment_repository: connection.create_assignment_repository(),
            permissions,
            clock,
            day_boundary,
        }
    }

    pub async fn create_chore(&self, user_id: &str, command: CreateChoreCommand) -> DomainResult<ChoreTemplate> {
        info!("Creating chore '{}' in family {}", command.task_name, command.family_id);
        self.permissions
            .require(user_id, &command.family_id, Resource::Chore, Action::Create)
            .await?;

        let due_date = self
            .day_boundary
            .parse_optional_day(command.due_date.as_deref(), self.clock.as_ref())?;
        let now = self.clock.now();
        let chore = ChoreTemplate {
            id: ChoreTemplate::generate_id(),
            family_id: command.family_id,
            task_name: command.task_name.trim().to_string(),
            reward_amount: command.reward_amount,
            is_recurring: command.is_recurring,
            interval_days: command.interval_days,
            suggested_time: command.suggested_time,
            due_date,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        chore.validate()?;

        self.chore_repository.store_chore(&chore).await?;
        info!("Created chore: {} with ID: {}", chore.task_name, chore.id);
        Ok(chore)
    }

    async fn load_chore(&self, chore_id: &str) -> DomainResult<ChoreTemplate> {
        self.chore_repository
            .get_chore(chore_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("chore {}", chore_id)))
    }

    async fn load_child(&self, child_id: &str) -> DomainResult<ChildLedger> {
        self.child_repository
            .get_child(child_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("child {}", child_id)))
    }

    pub async fn get_chore(&self, user_id: &str, chore_id: &str) -> DomainResult<ChoreTemplate> {
        let chore = self.load_chore(chore_id).await?;
        self.permissions
            .require(user_id, &chore.family_id, Resource::Chore, Action::Read)
            .await?;
        Ok(chore)
    }

    pub async fn list_chores(
        &self,
        user_id: &str,
        family_id: &str,
        include_inactive: bool,
    ) -> DomainResult<Vec<ChoreTemplate>> {
        self.permissions
            .require(user_id, family_id, Resource::Chore, Action::Read)
            .await?;
        Ok(self.chore_repository.list_chores(family_id, include_inactive).await?)
    }

    /// Apply a partial update, validated like a new chore
    pub async fn update_chore(
        &self,
        user_id: &str,
        chore_id: &str,
        command: UpdateChoreCommand,
    ) -> DomainResult<ChoreTemplate> {
        let mut chore = self.load_chore(chore_id).await?;
        self.permissions
            .require(user_id, &chore.family_id, Resource::Chore, Action::Update)
            .await?;

        if let Some(task_name) = command.task_name {
            chore.task_name = task_name.trim().to_string();
        }
        if let Some(reward_amount) = command.reward_amount {
            chore.reward_amount = reward_amount;
        }
        if let Some(is_recurring) = command.is_recurring {
            chore.is_recurring = is_recurring;
        }
        if command.interval_days.is_some() {
            chore.interval_days = command.interval_days;
        }
        if command.suggested_time.is_some() {
            chore.suggested_time = command.suggested_time;
        }
        let previous_due_date = chore.due_date;
        if let Some(due_date) = command.due_date.as_deref() {
            chore.due_date = self.day_boundary.parse_day(due_date)?;
        }
        if let Some(is_active) = command.is_active {
            chore.is_active = is_active;
        }
        chore.validate()?;
        chore.updated_at = self.clock.now();

        if !self.chore_repository.update_chore(&chore).await? {
            return Err(DomainError::not_found(format!("chore {}", chore_id)));
        }
        if chore.due_date != previous_due_date {
            let moved = self
                .assignment_repository
                .reschedule_assignments_for_chore(&chore.id, chore.due_date)
                .await?;
            info!("Rescheduled {} assignments of chore {} to {}", moved, chore.id, chore.due_date);
        }
        info!("Updated chore: {} with ID: {}", chore.task_name, chore.id);
        Ok(chore)
    }

    /// Soft delete: the template stays for history, and no child gets it again
    pub async fn deactivate_chore(&self, user_id: &str, chore_id: &str) -> DomainResult<ChoreTemplate> {
        let mut chore = self.load_chore(chore_id).await?;
        self.permissions
            .require(user_id, &chore.family_id, Resource::Chore, Action::Delete)
            .await?;

        chore.is_active = false;
        chore.updated_at = self.clock.now();
        if !self.chore_repository.update_chore(&chore).await? {
            return Err(DomainError::not_found(format!("chore {}", chore_id)));
        }
        let retired = self.assignment_repository.deactivate_assignments_for_chore(chore_id).await?;
        info!("Deactivated chore {} and {} assignments", chore_id, retired);
        Ok(chore)
    }

    /// Child and chore are both loaded and must share a family; the acting
    /// user needs to be allowed to update that family's children.
    async fn authorize_assignment(
        &self,
        user_id: &str,
        child_id: &str,
        chore_id: &str,
    ) -> DomainResult<(ChildLedger, ChoreTemplate)> {
        let child = self.load_child(child_id).await?;
        let chore = self.load_chore(chore_id).await?;
        self.permissions
            .require(user_id, &child.family_id, Resource::Child, Action::Update)
            .await?;
        if child.family_id != chore.family_id {
            warn!(
                "Refusing to pair child {} of family {} with chore {} of family {}",
                child.id, child.family_id, chore.id, chore.family_id
            );
            return Err(DomainError::validation("child and chore belong to different families"));
        }
        Ok((child, chore))
    }

    /// Assign a chore to a child. Assigning an already assigned chore changes nothing.
    pub async fn assign_chore(
        &self,
        user_id: &str,
        child_id: &str,
        chore_id: &str,
    ) -> DomainResult<AssignmentToggleResult> {
        let (child, chore) = self.authorize_assignment(user_id, child_id, chore_id).await?;
        if !chore.is_active {
            return Err(DomainError::validation(format!("chore {} is not active", chore.id)));
        }

        let assignment = ChildChoreAssignment::from_template(&child.id, &chore);
        let changed = self.assignment_repository.upsert_assignment(&assignment).await?;
        info!("Assigned chore {} to child {} (changed: {})", chore.id, child.id, changed);

        Ok(AssignmentToggleResult {
            child_id: child.id,
            chore_id: chore.id,
            assigned: true,
            changed,
        })
    }

    pub async fn unassign_chore(
        &self,
        user_id: &str,
        child_id: &str,
        chore_id: &str,
    ) -> DomainResult<AssignmentToggleResult> {
        let (child, chore) = self.authorize_assignment(user_id, child_id, chore_id).await?;
        let changed = self.assignment_repository.remove_assignment(&child.id, &chore.id).await?;
        info!("Unassigned chore {} from child {} (changed: {})", chore.id, child.id, changed);

        Ok(AssignmentToggleResult {
            child_id: child.id,
            chore_id: chore.id,
            assigned: false,
            changed,
        })
    }

    pub async fn list_assignments(&self, user_id: &str, child_id: &str) -> DomainResult<Vec<ChildChoreAssignment>> {
        let child = self.load_child(child_id).await?;
        self.permissions
            .require(user_id, &child.family_id, Resource::Child, Action::Read)
            .await?;
        Ok(self.assignment_repository.list_assignments(&child.id).await?)
    }
}
