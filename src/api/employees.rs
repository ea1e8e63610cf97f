//! Employee endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{employee::CreateEmployee, Employee},
};

/// List employees
#[utoipa::path(
    get,
    path = "/employees",
    tag = "employees",
    responses(
        (status = 200, description = "All employees", body = Vec<Employee>)
    )
)]
pub async fn list_employees(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<Employee>>> {
    let employees = state.services.catalog.list_employees().await?;
    Ok(Json(employees))
}

/// Create an employee at an existing branch
#[utoipa::path(
    post,
    path = "/employees",
    tag = "employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 422, description = "Unknown branch or duplicate ID")
    )
)]
pub async fn create_employee(
    State(state): State<crate::AppState>,
    Json(data): Json<CreateEmployee>,
) -> AppResult<(StatusCode, Json<Employee>)> {
    let employee = state.services.catalog.create_employee(data).await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

/// Get an employee
#[utoipa::path(
    get,
    path = "/employees/{id}",
    tag = "employees",
    params(("id" = String, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee details", body = Employee),
        (status = 404, description = "Employee not found")
    )
)]
pub async fn get_employee(
    State(state): State<crate::AppState>,
    Path(emp_id): Path<String>,
) -> AppResult<Json<Employee>> {
    let employee = state.services.catalog.get_employee(&emp_id).await?;
    Ok(Json(employee))
}
