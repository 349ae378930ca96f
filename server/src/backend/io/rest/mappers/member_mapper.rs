use shared::{FamilyMember as SharedFamilyMember, FamilyMemberListResponse, FamilyRole};

use crate::backend::domain::models::member::{FamilyMember, Role};

pub struct MemberMapper;

impl MemberMapper {
    pub fn role_to_domain(role: FamilyRole) -> Role {
        match role {
            FamilyRole::Parent => Role::Parent,
            FamilyRole::Child => Role::Child,
        }
    }

    pub fn role_to_dto(role: Role) -> FamilyRole {
        match role {
            Role::Parent => FamilyRole::Parent,
            Role::Child => FamilyRole::Child,
        }
    }

    pub fn to_dto(domain: FamilyMember) -> SharedFamilyMember {
        SharedFamilyMember {
            family_id: domain.family_id,
            user_id: domain.user_id,
            role: Self::role_to_dto(domain.role),
        }
    }

    pub fn to_member_list_dto(members: Vec<FamilyMember>) -> FamilyMemberListResponse {
        FamilyMemberListResponse {
            members: members.into_iter().map(Self::to_dto).collect(),
        }
    }
}
