//! Member endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        member::{CreateMember, UpdateMemberAddress},
        Member,
    },
};

/// List members
#[utoipa::path(
    get,
    path = "/members",
    tag = "members",
    responses(
        (status = 200, description = "All members", body = Vec<Member>)
    )
)]
pub async fn list_members(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Member>>> {
    let members = state.services.catalog.list_members().await?;
    Ok(Json(members))
}

/// Register a member
#[utoipa::path(
    post,
    path = "/members",
    tag = "members",
    request_body = CreateMember,
    responses(
        (status = 201, description = "Member registered", body = Member),
        (status = 422, description = "Member ID already used")
    )
)]
pub async fn create_member(
    State(state): State<crate::AppState>,
    Json(data): Json<CreateMember>,
) -> AppResult<(StatusCode, Json<Member>)> {
    let member = state.services.catalog.create_member(data).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// Get a member
#[utoipa::path(
    get,
    path = "/members/{id}",
    tag = "members",
    params(("id" = String, Path, description = "Member ID")),
    responses(
        (status = 200, description = "Member details", body = Member),
        (status = 404, description = "Member not found")
    )
)]
pub async fn get_member(
    State(state): State<crate::AppState>,
    Path(member_id): Path<String>,
) -> AppResult<Json<Member>> {
    let member = state.services.catalog.get_member(&member_id).await?;
    Ok(Json(member))
}

/// Change a member's address
#[utoipa::path(
    put,
    path = "/members/{id}/address",
    tag = "members",
    params(("id" = String, Path, description = "Member ID")),
    request_body = UpdateMemberAddress,
    responses(
        (status = 200, description = "Address updated", body = Member),
        (status = 404, description = "Member not found")
    )
)]
pub async fn update_address(
    State(state): State<crate::AppState>,
    Path(member_id): Path<String>,
    Json(data): Json<UpdateMemberAddress>,
) -> AppResult<Json<Member>> {
    let member = state
        .services
        .catalog
        .update_member_address(&member_id, data)
        .await?;
    Ok(Json(member))
}
