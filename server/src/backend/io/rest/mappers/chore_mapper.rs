//! Mapping between chore DTOs and domain models.

use shared::{
    ChoreAssignment, ChoreAssignmentListResponse, ChoreListResponse, ChoreTemplate as SharedChoreTemplate,
    CreateChoreRequest, ToggleAssignmentResponse, UpdateChoreRequest,
};

use crate::backend::domain::calendar::format_day;
use crate::backend::domain::commands::chores::{
    AssignmentToggleResult, CreateChoreCommand, UpdateChoreCommand,
};
use crate::backend::domain::models::chore::{ChildChoreAssignment, ChoreTemplate};

pub struct ChoreMapper;

impl ChoreMapper {
    pub fn to_dto(domain: ChoreTemplate) -> SharedChoreTemplate {
        SharedChoreTemplate {
            id: domain.id,
            family_id: domain.family_id,
            task_name: domain.task_name,
            reward_amount: domain.reward_amount,
            is_recurring: domain.is_recurring,
            interval_days: domain.interval_days,
            suggested_time: domain.suggested_time,
            due_date: format_day(domain.due_date),
            is_active: domain.is_active,
            created_at: domain.created_at.to_rfc3339(),
            updated_at: domain.updated_at.to_rfc3339(),
        }
    }

    pub fn to_chore_list_dto(chores: Vec<ChoreTemplate>) -> ChoreListResponse {
        ChoreListResponse {
            chores: chores.into_iter().map(Self::to_dto).collect(),
        }
    }

    pub fn to_create_command(request: CreateChoreRequest) -> CreateChoreCommand {
        CreateChoreCommand {
            family_id: request.family_id,
            task_name: request.task_name,
            reward_amount: request.reward_amount,
            is_recurring: request.is_recurring,
            interval_days: request.interval_days,
            suggested_time: request.suggested_time,
            due_date: request.due_date,
        }
    }

    pub fn to_update_command(request: UpdateChoreRequest) -> UpdateChoreCommand {
        UpdateChoreCommand {
            task_name: request.task_name,
            reward_amount: request.reward_amount,
            is_recurring: request.is_recurring,
            interval_days: request.interval_days,
            suggested_time: request.suggested_time,
            due_date: request.due_date,
            is_active: request.is_active,
        }
    }

    pub fn assignment_to_dto(domain: ChildChoreAssignment) -> ChoreAssignment {
        ChoreAssignment {
            child_id: domain.child_id,
            chore_id: domain.chore_id,
            family_id: domain.family_id,
            next_due: format_day(domain.next_due),
            is_recurring: domain.is_recurring,
            interval_days: domain.interval_days,
            is_active: domain.is_active,
        }
    }

    pub fn to_assignment_list_dto(assignments: Vec<ChildChoreAssignment>) -> ChoreAssignmentListResponse {
        ChoreAssignmentListResponse {
            assignments: assignments.into_iter().map(Self::assignment_to_dto).collect(),
        }
    }

    pub fn toggle_to_dto(result: AssignmentToggleResult) -> ToggleAssignmentResponse {
        ToggleAssignmentResponse {
            child_id: result.child_id,
            chore_id: result.chore_id,
            assigned: result.assigned,
            changed: result.changed,
        }
    }
}
