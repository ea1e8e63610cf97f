//! Employee model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Employee {
    pub emp_id: String,
    pub name: String,
    pub position: String,
    pub salary: Decimal,
    /// Branch the employee works at
    pub branch_id: String,
}

/// Create employee request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateEmployee {
    #[validate(length(min = 1, message = "Employee ID is required"))]
    pub emp_id: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub position: String,
    pub salary: Decimal,
    #[validate(length(min = 1, message = "Branch ID is required"))]
    pub branch_id: String,
}

impl From<CreateEmployee> for Employee {
    fn from(e: CreateEmployee) -> Self {
        Self {
            emp_id: e.emp_id,
            name: e.name,
            position: e.position,
            salary: e.salary,
            branch_id: e.branch_id,
        }
    }
}
