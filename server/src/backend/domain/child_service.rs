use log::{info, warn};
use std::sync::Arc;

use crate::backend::domain::calendar::Clock;
use crate::backend::domain::commands::children::{AdjustBalanceCommand, CreateChildCommand};
use crate::backend::domain::errors::{DomainError, DomainResult};
use crate::backend::domain::models::child::ChildLedger;
use crate::backend::domain::permissions::{Action, PermissionChecker, Resource};
use crate::backend::storage::{ChildStorage, Connection};

const MAX_CHILD_NAME_LEN: usize = 100;

/// Service for managing children and their balances
#[derive(Clone)]
pub struct ChildService<C: Connection> {
    child_repository: C::ChildRepository,
    permissions: Arc<dyn PermissionChecker>,
    clock: Arc<dyn Clock>,
}

impl<C: Connection> ChildService<C> {
    pub fn new(connection: Arc<C>, permissions: Arc<dyn PermissionChecker>, clock: Arc<dyn Clock>) -> Self {
        Self {
            child_repository: connection.create_child_repository(),
            permissions,
            clock,
        }
    }

    /// Create a new child with a zero balance
    pub async fn create_child(&self, user_id: &str, command: CreateChildCommand) -> DomainResult<ChildLedger> {
        info!("Creating child: name={}, family={}", command.name, command.family_id);
        self.permissions
            .require(user_id, &command.family_id, Resource::Child, Action::Create)
            .await?;

        let name = command.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("child name cannot be empty"));
        }
        if name.chars().count() > MAX_CHILD_NAME_LEN {
            return Err(DomainError::validation(format!(
                "child name cannot exceed {} characters",
                MAX_CHILD_NAME_LEN
            )));
        }

        let now = self.clock.now();
        let child = ChildLedger {
            id: ChildLedger::generate_id(),
            family_id: command.family_id,
            name: name.to_string(),
            current_balance: 0.0,
            created_at: now,
            updated_at: now,
        };
        self.child_repository.store_child(&child).await?;

        info!("Created child: {} with ID: {}", child.name, child.id);
        Ok(child)
    }

    /// Load a child, failing with `NotFound` if it does not exist
    pub(crate) async fn load_child(&self, child_id: &str) -> DomainResult<ChildLedger> {
        match self.child_repository.get_child(child_id).await? {
            Some(child) => Ok(child),
            None => {
                warn!("Child not found: {}", child_id);
                Err(DomainError::not_found(format!("child {}", child_id)))
            }
        }
    }

    pub async fn get_child(&self, user_id: &str, child_id: &str) -> DomainResult<ChildLedger> {
        let child = self.load_child(child_id).await?;
        self.permissions
            .require(user_id, &child.family_id, Resource::Child, Action::Read)
            .await?;
        Ok(child)
    }

    pub async fn list_children(&self, user_id: &str, family_id: &str) -> DomainResult<Vec<ChildLedger>> {
        self.permissions
            .require(user_id, family_id, Resource::Child, Action::Read)
            .await?;
        let children = self.child_repository.list_children(family_id).await?;
        info!("Found {} children in family {}", children.len(), family_id);
        Ok(children)
    }

    /// Manual deposit (positive) or payout (negative). Returns the new balance.
    pub async fn adjust_balance(&self, user_id: &str, command: AdjustBalanceCommand) -> DomainResult<f64> {
        if !command.amount.is_finite() || command.amount == 0.0 {
            return Err(DomainError::validation("adjustment amount must be a non-zero number"));
        }

        let child = self.load_child(&command.child_id).await?;
        self.permissions
            .require(user_id, &child.family_id, Resource::Child, Action::Update)
            .await?;

        let new_balance = self
            .child_repository
            .increment_balance(&child.id, command.amount)
            .await?
            .ok_or_else(|| DomainError::not_found("child not found"))?;

        info!(
            "Adjusted balance of child {} by {:.2} ({}): now {:.2}",
            child.id,
            command.amount,
            command.note.as_deref().unwrap_or("no note"),
            new_balance
        );
        Ok(new_balance)
    }
}
