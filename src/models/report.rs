//! Report rows produced by the reporting views

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Rental revenue per book category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategoryRevenue {
    pub category: String,
    pub issue_count: i64,
    pub total_revenue: Decimal,
}

/// Issues, returns and revenue processed by a branch's employees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BranchPerformance {
    pub branch_id: String,
    pub manager_id: String,
    pub issued_count: i64,
    pub returned_count: i64,
    pub total_revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EmployeeIssueCount {
    pub emp_id: String,
    pub name: String,
    pub branch_id: String,
    pub issue_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ActiveMember {
    pub member_id: String,
    pub name: String,
    /// Issues dated within the window
    pub issue_count: i64,
    pub last_issued_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BookIssueCount {
    pub isbn: String,
    pub title: String,
    pub issue_count: i64,
}

/// Kinds of data invariant breaches detected by the integrity report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Stored availability disagrees with the ledgers
    AvailabilityMismatch,
    /// More than one open loan for the same book
    MultipleOpenLoans,
    /// More than one return for the same issued record
    DuplicateReturn,
    /// A reference that does not resolve
    DanglingReference,
    /// Return dated before its issue
    ReturnBeforeIssue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct InvariantViolation {
    pub kind: ViolationKind,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IntegrityReport {
    pub healthy: bool,
    pub violations: Vec<InvariantViolation>,
}

/// Query parameters for overdue detection
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct OverdueQuery {
    /// Reference date (defaults to today)
    pub as_of: Option<NaiveDate>,
    /// Grace period in days (defaults to configuration)
    pub grace_days: Option<i64>,
}

/// Query parameters for the active members report
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct ActiveMembersQuery {
    /// Reference date (defaults to today)
    pub as_of: Option<NaiveDate>,
    /// Trailing window in months (defaults to configuration)
    pub months: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct TopEmployeesQuery {
    /// Number of employees to return (defaults to configuration)
    pub limit: Option<usize>,
}
