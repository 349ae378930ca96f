//! Role-based authorization for family-scoped operations.
//!
//! Every service call names the acting user and asks a [`PermissionChecker`]
//! before it reads or mutates anything that belongs to a family.

use async_trait::async_trait;
use log::warn;
use std::fmt;

use crate::backend::domain::errors::{DomainError, DomainResult};
use crate::backend::domain::models::member::Role;
use crate::backend::storage::{Connection, MemberStorage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Child,
    Chore,
    DailyRecord,
    Family,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::Child => "child",
            Resource::Chore => "chore",
            Resource::DailyRecord => "daily-record",
            Resource::Family => "family",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
    Approve,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Approve => "approve",
        };
        write!(f, "{}", name)
    }
}

#[async_trait]
pub trait PermissionChecker: Send + Sync {
    async fn has_permission(
        &self,
        user_id: &str,
        family_id: &str,
        resource: Resource,
        action: Action,
    ) -> DomainResult<bool>;

    /// Fail with `Unauthorized` unless the user may act
    async fn require(
        &self,
        user_id: &str,
        family_id: &str,
        resource: Resource,
        action: Action,
    ) -> DomainResult<()> {
        if self.has_permission(user_id, family_id, resource, action).await? {
            Ok(())
        } else {
            warn!(
                "Denied {} {} in family {} for user {}",
                action, resource, family_id, user_id
            );
            Err(DomainError::Unauthorized(format!(
                "user {} may not {} {} in family {}",
                user_id, action, resource, family_id
            )))
        }
    }
}

/// Parents may do anything in their family. Children may look at their
/// family's children, chores and records, and fill in records.
pub fn role_allows(role: Role, resource: Resource, action: Action) -> bool {
    match role {
        Role::Parent => true,
        Role::Child => matches!(
            (resource, action),
            (Resource::Child, Action::Read)
                | (Resource::Chore, Action::Read)
                | (Resource::DailyRecord, Action::Read)
                | (Resource::DailyRecord, Action::Update)
        ),
    }
}

/// Permission checker backed by the family membership table
#[derive(Clone)]
pub struct RolePermissionChecker<C: Connection> {
    member_repository: C::MemberRepository,
}

impl<C: Connection> RolePermissionChecker<C> {
    pub fn new(connection: &C) -> Self {
        Self {
            member_repository: connection.create_member_repository(),
        }
    }
}

#[async_trait]
impl<C: Connection> PermissionChecker for RolePermissionChecker<C> {
    async fn has_permission(
        &self,
        user_id: &str,
        family_id: &str,
        resource: Resource,
        action: Action,
    ) -> DomainResult<bool> {
        let member = self.member_repository.get_member(family_id, user_id).await?;
        Ok(member.is_some_and(|member| role_allows(member.role, resource, action)))
    }
}
