//! Branch endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{branch::CreateBranch, Branch},
};

/// List branches
#[utoipa::path(
    get,
    path = "/branches",
    tag = "branches",
    responses(
        (status = 200, description = "All branches", body = Vec<Branch>)
    )
)]
pub async fn list_branches(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Branch>>> {
    let branches = state.services.catalog.list_branches().await?;
    Ok(Json(branches))
}

/// Create a branch, optionally with its founding manager
#[utoipa::path(
    post,
    path = "/branches",
    tag = "branches",
    request_body = CreateBranch,
    responses(
        (status = 201, description = "Branch created", body = Branch),
        (status = 422, description = "Manager is not an employee or duplicate ID")
    )
)]
pub async fn create_branch(
    State(state): State<crate::AppState>,
    Json(data): Json<CreateBranch>,
) -> AppResult<(StatusCode, Json<Branch>)> {
    let branch = state.services.catalog.create_branch(data).await?;
    Ok((StatusCode::CREATED, Json(branch)))
}

/// Get a branch
#[utoipa::path(
    get,
    path = "/branches/{id}",
    tag = "branches",
    params(("id" = String, Path, description = "Branch ID")),
    responses(
        (status = 200, description = "Branch details", body = Branch),
        (status = 404, description = "Branch not found")
    )
)]
pub async fn get_branch(
    State(state): State<crate::AppState>,
    Path(branch_id): Path<String>,
) -> AppResult<Json<Branch>> {
    let branch = state.services.catalog.get_branch(&branch_id).await?;
    Ok(Json(branch))
}
