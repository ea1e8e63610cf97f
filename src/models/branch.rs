//! Branch model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::employee::Employee;

/// Library branch. `manager_id` references an employee, who may work at another branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Branch {
    pub branch_id: String,
    pub manager_id: String,
    pub address: String,
    pub contact: String,
}

/// Founding manager created together with the branch
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct FoundingManager {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub position: String,
    pub salary: rust_decimal::Decimal,
}

/// Create branch request.
///
/// When `manager` is present the employee `manager_id` is created in the same
/// operation and assigned to the new branch. Otherwise `manager_id` must name
/// an existing employee.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBranch {
    #[validate(length(min = 1, message = "Branch ID is required"))]
    pub branch_id: String,
    #[validate(length(min = 1, message = "Manager ID is required"))]
    pub manager_id: String,
    pub address: String,
    pub contact: String,
    #[validate(nested)]
    pub manager: Option<FoundingManager>,
}

impl CreateBranch {
    /// Split into the branch row and the optional founding manager row
    pub fn into_parts(self) -> (Branch, Option<Employee>) {
        let manager = self.manager.map(|m| Employee {
            emp_id: self.manager_id.clone(),
            name: m.name,
            position: m.position,
            salary: m.salary,
            branch_id: self.branch_id.clone(),
        });
        let branch = Branch {
            branch_id: self.branch_id,
            manager_id: self.manager_id,
            address: self.address,
            contact: self.contact,
        };
        (branch, manager)
    }
}
