//! Family membership: who belongs to a family and with which role.

use log::{info, warn};
use std::sync::Arc;

use crate::backend::domain::commands::family::AddMemberCommand;
use crate::backend::domain::errors::{DomainError, DomainResult};
use crate::backend::domain::models::member::{FamilyMember, Role};
use crate::backend::domain::permissions::{Action, PermissionChecker, Resource};
use crate::backend::storage::{Connection, MemberStorage};

#[derive(Clone)]
pub struct FamilyService<C: Connection> {
    member_repository: C::MemberRepository,
    permissions: Arc<dyn PermissionChecker>,
}

impl<C: Connection> FamilyService<C> {
    pub fn new(connection: Arc<C>, permissions: Arc<dyn PermissionChecker>) -> Self {
        Self {
            member_repository: connection.create_member_repository(),
            permissions,
        }
    }

    /// Add a member or change their role.
    ///
    /// A family with no members yet can only be founded by a user enrolling
    /// themselves as a parent; after that only parents add members.
    pub async fn add_member(&self, user_id: &str, command: AddMemberCommand) -> DomainResult<FamilyMember> {
        let new_user = command.user_id.trim();
        if new_user.is_empty() {
            return Err(DomainError::validation("member user id cannot be empty"));
        }
        if command.family_id.trim().is_empty() {
            return Err(DomainError::validation("family id cannot be empty"));
        }

        let existing = self.member_repository.list_members(&command.family_id).await?;
        if existing.is_empty() {
            if new_user != user_id || command.role != Role::Parent {
                warn!(
                    "User {} tried to found family {} with member {} as {}",
                    user_id,
                    command.family_id,
                    new_user,
                    command.role.as_str()
                );
                return Err(DomainError::Unauthorized(
                    "a new family must be founded by a parent enrolling themselves".to_string(),
                ));
            }
        } else {
            self.permissions
                .require(user_id, &command.family_id, Resource::Family, Action::Create)
                .await?;
        }

        let member = FamilyMember {
            family_id: command.family_id,
            user_id: new_user.to_string(),
            role: command.role,
        };
        self.member_repository.add_member(&member).await?;
        info!(
            "User {} is now {} in family {}",
            member.user_id,
            member.role.as_str(),
            member.family_id
        );
        Ok(member)
    }

    pub async fn list_members(&self, user_id: &str, family_id: &str) -> DomainResult<Vec<FamilyMember>> {
        self.permissions
            .require(user_id, family_id, Resource::Family, Action::Read)
            .await?;
        Ok(self.member_repository.list_members(family_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::test_utils::{ServiceTestHelper, FAMILY_ID, KID_USER_ID, PARENT_ID};

    fn add(family_id: &str, user_id: &str, role: Role) -> AddMemberCommand {
        AddMemberCommand {
            family_id: family_id.to_string(),
            user_id: user_id.to_string(),
            role,
        }
    }

    #[tokio::test]
    async fn test_founding_a_family() {
        let helper = ServiceTestHelper::new().await.expect("Failed to create helper");

        let err = helper
            .families
            .add_member("user::dad", add("family::new", "user::someone", Role::Parent))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "unauthorized");

        let err = helper
            .families
            .add_member("user::dad", add("family::new", "user::dad", Role::Child))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "unauthorized");

        let founder = helper
            .families
            .add_member("user::dad", add("family::new", "user::dad", Role::Parent))
            .await
            .unwrap();
        assert_eq!(founder.role, Role::Parent);

        // once founded, strangers cannot join by themselves
        let err = helper
            .families
            .add_member("user::intruder", add("family::new", "user::intruder", Role::Parent))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "unauthorized");
    }

    #[tokio::test]
    async fn test_parents_manage_members() {
        let helper = ServiceTestHelper::new().await.expect("Failed to create helper");

        helper
            .families
            .add_member(PARENT_ID, add(FAMILY_ID, "user::grandma", Role::Parent))
            .await
            .unwrap();
        let err = helper
            .families
            .add_member(KID_USER_ID, add(FAMILY_ID, KID_USER_ID, Role::Parent))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "unauthorized");

        let err = helper
            .families
            .add_member(PARENT_ID, add(FAMILY_ID, "  ", Role::Child))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "validation");

        let members = helper.families.list_members(PARENT_ID, FAMILY_ID).await.unwrap();
        let users: Vec<&str> = members.iter().map(|m| m.user_id.as_str()).collect();
        assert_eq!(users, vec!["user::grandma", "user::kid", "user::parent"]);

        let err = helper.families.list_members(KID_USER_ID, FAMILY_ID).await.unwrap_err();
        assert_eq!(err.kind(), "unauthorized");
    }
}
