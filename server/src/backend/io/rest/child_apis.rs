//! # REST API for Children
//!
//! Endpoints for children, their balances and their chore assignments.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use log::info;
use serde::Deserialize;
use shared::{
    AdjustBalanceRequest, BalanceResponse, Child, ChildListResponse, ChoreAssignmentListResponse,
    CreateChildRequest, ToggleAssignmentResponse,
};

use crate::backend::domain::commands::children::{AdjustBalanceCommand, CreateChildCommand};
use crate::backend::io::rest::auth::AuthenticatedUser;
use crate::backend::io::rest::error::ApiError;
use crate::backend::io::rest::mappers::child_mapper::ChildMapper;
use crate::backend::io::rest::mappers::chore_mapper::ChoreMapper;
use crate::backend::AppState;

#[derive(Debug, Deserialize)]
pub struct ChildListQuery {
    pub family_id: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/children", post(create_child).get(list_children))
        .route("/children/:id", get(get_child))
        .route("/children/:id/balance", post(adjust_balance))
        .route("/children/:id/chores", get(list_assignments))
        .route("/children/:id/chores/:chore_id", put(assign_chore).delete(unassign_chore))
}

pub async fn create_child(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateChildRequest>,
) -> Result<(StatusCode, Json<Child>), ApiError> {
    info!("POST /api/children - request: {:?}", request);

    let command = CreateChildCommand {
        family_id: request.family_id,
        name: request.name,
    };
    let child = state.child_service.create_child(user.id(), command).await?;
    Ok((StatusCode::CREATED, Json(ChildMapper::to_dto(child))))
}

pub async fn list_children(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<ChildListQuery>,
) -> Result<Json<ChildListResponse>, ApiError> {
    info!("GET /api/children - query: {:?}", query);

    let children = state.child_service.list_children(user.id(), &query.family_id).await?;
    Ok(Json(ChildMapper::to_child_list_dto(children)))
}

pub async fn get_child(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(child_id): Path<String>,
) -> Result<Json<Child>, ApiError> {
    info!("GET /api/children/{}", child_id);

    let child = state.child_service.get_child(user.id(), &child_id).await?;
    Ok(Json(ChildMapper::to_dto(child)))
}

/// Manual deposit or cash payout
pub async fn adjust_balance(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(child_id): Path<String>,
    Json(request): Json<AdjustBalanceRequest>,
) -> Result<Json<BalanceResponse>, ApiError> {
    info!("POST /api/children/{}/balance - request: {:?}", child_id, request);

    let command = AdjustBalanceCommand {
        child_id: child_id.clone(),
        amount: request.amount,
        note: request.note,
    };
    let current_balance = state.child_service.adjust_balance(user.id(), command).await?;
    Ok(Json(BalanceResponse {
        child_id,
        current_balance,
    }))
}

pub async fn list_assignments(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(child_id): Path<String>,
) -> Result<Json<ChoreAssignmentListResponse>, ApiError> {
    info!("GET /api/children/{}/chores", child_id);

    let assignments = state.chore_service.list_assignments(user.id(), &child_id).await?;
    Ok(Json(ChoreMapper::to_assignment_list_dto(assignments)))
}

pub async fn assign_chore(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((child_id, chore_id)): Path<(String, String)>,
) -> Result<Json<ToggleAssignmentResponse>, ApiError> {
    info!("PUT /api/children/{}/chores/{}", child_id, chore_id);

    let result = state.chore_service.assign_chore(user.id(), &child_id, &chore_id).await?;
    Ok(Json(ChoreMapper::toggle_to_dto(result)))
}

pub async fn unassign_chore(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((child_id, chore_id)): Path<(String, String)>,
) -> Result<Json<ToggleAssignmentResponse>, ApiError> {
    info!("DELETE /api/children/{}/chores/{}", child_id, chore_id);

    let result = state.chore_service.unassign_chore(user.id(), &child_id, &chore_id).await?;
    Ok(Json(ChoreMapper::toggle_to_dto(result)))
}
