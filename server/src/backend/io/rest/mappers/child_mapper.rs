use shared::{Child as SharedChild, ChildListResponse};

use crate::backend::domain::models::child::ChildLedger;

pub struct ChildMapper;

impl ChildMapper {
    pub fn to_dto(domain: ChildLedger) -> SharedChild {
        SharedChild {
            id: domain.id,
            family_id: domain.family_id,
            name: domain.name,
            current_balance: domain.current_balance,
            created_at: domain.created_at.to_rfc3339(),
            updated_at: domain.updated_at.to_rfc3339(),
        }
    }

    pub fn to_child_list_dto(children: Vec<ChildLedger>) -> ChildListResponse {
        ChildListResponse {
            children: children.into_iter().map(Self::to_dto).collect(),
        }
    }
}
