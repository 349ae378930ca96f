//! # REST API for Daily Records
//!
//! Endpoints covering the whole record lifecycle: open today's record, report
//! chore completion, submit, and the parent's approve or reject.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post, put},
    Router,
};
use log::info;
use shared::{
    ApproveDailyRecordRequest, DailyRecord, DailyRecordHistoryRequest, DailyRecordListResponse,
    GetOrCreateDailyRecordRequest, PayoutResult, RejectDailyRecordRequest, UpdateChoreCompletionRequest,
};

use crate::backend::domain::commands::daily_records::{
    DailyRecordHistoryQuery, GetOrCreateDailyRecordCommand, RejectDailyRecordCommand,
    UpdateChoreCompletionCommand,
};
use crate::backend::io::rest::auth::AuthenticatedUser;
use crate::backend::io::rest::error::ApiError;
use crate::backend::io::rest::mappers::daily_record_mapper::DailyRecordMapper;
use crate::backend::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/daily-records", get(list_daily_records))
        .route("/daily-records/today", post(get_or_create_todays_record))
        .route("/daily-records/:id", get(get_daily_record))
        .route("/daily-records/:id/chores/:index", put(update_chore_completion))
        .route("/daily-records/:id/submit", post(submit_daily_record))
        .route("/daily-records/:id/approve", post(approve_daily_record))
        .route("/daily-records/:id/reject", post(reject_daily_record))
}

/// Get the child's record for today, creating it on first access
pub async fn get_or_create_todays_record(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<GetOrCreateDailyRecordRequest>,
) -> Result<Json<DailyRecord>, ApiError> {
    info!("POST /api/daily-records/today - request: {:?}", request);

    let command = GetOrCreateDailyRecordCommand {
        child_id: request.child_id,
        family_id: request.family_id,
        today: request.today,
    };
    let record = state
        .daily_record_service
        .get_or_create_todays_daily_record(user.id(), command)
        .await?;
    Ok(Json(DailyRecordMapper::to_dto(record)))
}

pub async fn list_daily_records(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<DailyRecordHistoryRequest>,
) -> Result<Json<DailyRecordListResponse>, ApiError> {
    info!("GET /api/daily-records - query: {:?}", query);

    let query = DailyRecordHistoryQuery {
        child_id: query.child_id,
        family_id: query.family_id,
        start_date: query.start_date,
        end_date: query.end_date,
    };
    let records = state
        .daily_record_service
        .get_child_daily_records(user.id(), query)
        .await?;
    Ok(Json(DailyRecordListResponse {
        records: records.into_iter().map(DailyRecordMapper::to_dto).collect(),
    }))
}

pub async fn get_daily_record(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(record_id): Path<String>,
) -> Result<Json<DailyRecord>, ApiError> {
    info!("GET /api/daily-records/{}", record_id);

    let record = state.daily_record_service.get_daily_record(user.id(), &record_id).await?;
    Ok(Json(DailyRecordMapper::to_dto(record)))
}

pub async fn update_chore_completion(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((record_id, chore_index)): Path<(String, usize)>,
    Json(request): Json<UpdateChoreCompletionRequest>,
) -> Result<Json<DailyRecord>, ApiError> {
    info!(
        "PUT /api/daily-records/{}/chores/{} - status: {}",
        record_id, chore_index, request.completion_status
    );

    let command = UpdateChoreCompletionCommand {
        record_id,
        chore_index,
        completion_status: request.completion_status,
    };
    let record = state
        .daily_record_service
        .update_chore_completion(user.id(), command)
        .await?;
    Ok(Json(DailyRecordMapper::to_dto(record)))
}

pub async fn submit_daily_record(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(record_id): Path<String>,
) -> Result<Json<DailyRecord>, ApiError> {
    info!("POST /api/daily-records/{}/submit", record_id);

    let record = state
        .daily_record_service
        .submit_daily_record(user.id(), &record_id)
        .await?;
    Ok(Json(DailyRecordMapper::to_dto(record)))
}

pub async fn approve_daily_record(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(record_id): Path<String>,
    Json(request): Json<ApproveDailyRecordRequest>,
) -> Result<Json<PayoutResult>, ApiError> {
    info!("POST /api/daily-records/{}/approve - request: {:?}", record_id, request);

    let command = DailyRecordMapper::to_approve_command(record_id, request);
    let result = state
        .daily_record_service
        .approve_daily_record(user.id(), command)
        .await?;
    Ok(Json(DailyRecordMapper::to_payout_dto(&result)))
}

pub async fn reject_daily_record(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(record_id): Path<String>,
    Json(request): Json<RejectDailyRecordRequest>,
) -> Result<Json<DailyRecord>, ApiError> {
    info!("POST /api/daily-records/{}/reject", record_id);

    let command = RejectDailyRecordCommand {
        record_id,
        reason: request.reason,
    };
    let record = state
        .daily_record_service
        .reject_daily_record(user.id(), command)
        .await?;
    Ok(Json(DailyRecordMapper::to_dto(record)))
}
