//! # REST API for Family Membership

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::post,
    Router,
};
use log::info;
use shared::{AddFamilyMemberRequest, FamilyMember, FamilyMemberListResponse};

use crate::backend::domain::commands::family::AddMemberCommand;
use crate::backend::io::rest::auth::AuthenticatedUser;
use crate::backend::io::rest::error::ApiError;
use crate::backend::io::rest::mappers::member_mapper::MemberMapper;
use crate::backend::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/families/:family_id/members", post(add_member).get(list_members))
}

pub async fn add_member(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(family_id): Path<String>,
    Json(request): Json<AddFamilyMemberRequest>,
) -> Result<(StatusCode, Json<FamilyMember>), ApiError> {
    info!("POST /api/families/{}/members - request: {:?}", family_id, request);

    let command = AddMemberCommand {
        family_id,
        user_id: request.user_id,
        role: MemberMapper::role_to_domain(request.role),
    };
    let member = state.family_service.add_member(user.id(), command).await?;
    Ok((StatusCode::CREATED, Json(MemberMapper::to_dto(member))))
}

pub async fn list_members(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(family_id): Path<String>,
) -> Result<Json<FamilyMemberListResponse>, ApiError> {
    info!("GET /api/families/{}/members", family_id);

    let members = state.family_service.list_members(user.id(), &family_id).await?;
    Ok(Json(MemberMapper::to_member_list_dto(members)))
}

#[cfg(test)]
mod tests {
    use crate::backend::test_utils::ApiTestHelper;
    use axum::http::StatusCode;
    use serde_json::json;
    use shared::{FamilyMemberListResponse, FamilyRole};

    #[tokio::test]
    async fn test_found_family_and_enrol_child() {
        let api = ApiTestHelper::new().await.expect("Failed to create API helper");

        let (status, body) = api
            .send(
                "POST",
                "/api/families/family::smith/members",
                Some("user::alice"),
                Some(json!({ "user_id": "user::alice", "role": "parent" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);

        let (status, _) = api
            .send(
                "POST",
                "/api/families/family::smith/members",
                Some("user::alice"),
                Some(json!({ "user_id": "user::bob", "role": "child" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _) = api
            .send(
                "POST",
                "/api/families/family::smith/members",
                Some("user::bob"),
                Some(json!({ "user_id": "user::bob", "role": "parent" })),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = api
            .send("GET", "/api/families/family::smith/members", Some("user::alice"), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        let list: FamilyMemberListResponse = serde_json::from_value(body).unwrap();
        let roles: Vec<(String, FamilyRole)> = list.members.into_iter().map(|m| (m.user_id, m.role)).collect();
        assert_eq!(
            roles,
            vec![
                ("user::alice".to_string(), FamilyRole::Parent),
                ("user::bob".to_string(), FamilyRole::Child),
            ]
        );
    }
}
