//! # REST API for Chore Templates
//!
//! Endpoints for creating, listing, updating and deactivating the chores a
//! family defines.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use log::info;
use serde::Deserialize;
use shared::{ChoreListResponse, ChoreTemplate, CreateChoreRequest, UpdateChoreRequest};

use crate::backend::io::rest::auth::AuthenticatedUser;
use crate::backend::io::rest::error::ApiError;
use crate::backend::io::rest::mappers::chore_mapper::ChoreMapper;
use crate::backend::AppState;

// Query parameters for chore listing API
#[derive(Debug, Deserialize)]
pub struct ChoreListQuery {
    pub family_id: String,
    #[serde(default)]
    pub include_inactive: bool,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/chores", post(create_chore).get(list_chores))
        .route("/chores/:id", get(get_chore).put(update_chore).delete(deactivate_chore))
}

pub async fn create_chore(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateChoreRequest>,
) -> Result<(StatusCode, Json<ChoreTemplate>), ApiError> {
    info!("POST /api/chores - request: {:?}", request);

    let chore = state
        .chore_service
        .create_chore(user.id(), ChoreMapper::to_create_command(request))
        .await?;
    Ok((StatusCode::CREATED, Json(ChoreMapper::to_dto(chore))))
}

pub async fn list_chores(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<ChoreListQuery>,
) -> Result<Json<ChoreListResponse>, ApiError> {
    info!("GET /api/chores - query: {:?}", query);

    let chores = state
        .chore_service
        .list_chores(user.id(), &query.family_id, query.include_inactive)
        .await?;
    Ok(Json(ChoreMapper::to_chore_list_dto(chores)))
}

pub async fn get_chore(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(chore_id): Path<String>,
) -> Result<Json<ChoreTemplate>, ApiError> {
    info!("GET /api/chores/{}", chore_id);

    let chore = state.chore_service.get_chore(user.id(), &chore_id).await?;
    Ok(Json(ChoreMapper::to_dto(chore)))
}

pub async fn update_chore(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(chore_id): Path<String>,
    Json(request): Json<UpdateChoreRequest>,
) -> Result<Json<ChoreTemplate>, ApiError> {
    info!("PUT /api/chores/{} - request: {:?}", chore_id, request);

    let chore = state
        .chore_service
        .update_chore(user.id(), &chore_id, ChoreMapper::to_update_command(request))
        .await?;
    Ok(Json(ChoreMapper::to_dto(chore)))
}

/// Soft delete; the template stays readable for history
pub async fn deactivate_chore(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(chore_id): Path<String>,
) -> Result<Json<ChoreTemplate>, ApiError> {
    info!("DELETE /api/chores/{}", chore_id);

    let chore = state.chore_service.deactivate_chore(user.id(), &chore_id).await?;
    Ok(Json(ChoreMapper::to_dto(chore)))
}

#[cfg(test)]
mod tests {
    use crate::backend::test_utils::{ApiTestHelper, FAMILY_ID, KID_USER_ID, PARENT_ID};
    use axum::http::StatusCode;
    use serde_json::json;
    use shared::{ChoreListResponse, ChoreTemplate};

    #[tokio::test]
    async fn test_chore_crud() {
        let api = ApiTestHelper::new().await.expect("Failed to create API helper");

        let (status, body) = api
            .send(
                "POST",
                "/api/chores",
                Some(PARENT_ID),
                Some(json!({
                    "family_id": FAMILY_ID,
                    "task_name": "Feed the cat",
                    "reward_amount": 0.5,
                    "is_recurring": true,
                    "interval_days": 1,
                    "suggested_time": "07:00",
                    "due_date": null
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        let chore: ChoreTemplate = serde_json::from_value(body).unwrap();
        assert_eq!(chore.due_date, "2025-06-14");

        let (status, body) = api
            .send(
                "PUT",
                &format!("/api/chores/{}", chore.id),
                Some(PARENT_ID),
                Some(json!({ "reward_amount": 0.75 })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        assert_eq!(body["reward_amount"], json!(0.75));

        let (status, _) = api
            .send(
                "PUT",
                &format!("/api/chores/{}", chore.id),
                Some(KID_USER_ID),
                Some(json!({ "reward_amount": 100.0 })),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = api
            .send("DELETE", &format!("/api/chores/{}", chore.id), Some(PARENT_ID), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["is_active"], json!(false));

        let (_, body) = api
            .send("GET", &format!("/api/chores?family_id={}", FAMILY_ID), Some(KID_USER_ID), None)
            .await;
        let active: ChoreListResponse = serde_json::from_value(body).unwrap();
        assert!(active.chores.is_empty());

        let (_, body) = api
            .send(
                "GET",
                &format!("/api/chores?family_id={}&include_inactive=true", FAMILY_ID),
                Some(KID_USER_ID),
                None,
            )
            .await;
        let all: ChoreListResponse = serde_json::from_value(body).unwrap();
        assert_eq!(all.chores.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_chore_is_rejected() {
        let api = ApiTestHelper::new().await.expect("Failed to create API helper");
        let (status, body) = api
            .send(
                "POST",
                "/api/chores",
                Some(PARENT_ID),
                Some(json!({
                    "family_id": FAMILY_ID,
                    "task_name": "Mow lawn",
                    "reward_amount": 5.0,
                    "is_recurring": true,
                    "interval_days": null,
                    "suggested_time": null,
                    "due_date": null
                })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], json!("validation"));
    }
}
