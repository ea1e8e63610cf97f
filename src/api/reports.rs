//! Reporting endpoints (read-only)

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;

use crate::{
    error::AppResult,
    models::report::{
        ActiveMember, ActiveMembersQuery, BookIssueCount, BranchPerformance, CategoryRevenue,
        EmployeeIssueCount, IntegrityReport, TopEmployeesQuery,
    },
};

/// Rental revenue by book category
#[utoipa::path(
    get,
    path = "/reports/revenue-by-category",
    tag = "reports",
    responses(
        (status = 200, description = "Revenue per category", body = Vec<CategoryRevenue>)
    )
)]
pub async fn revenue_by_category(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<CategoryRevenue>>> {
    let rows = state.services.reports.revenue_by_category().await?;
    Ok(Json(rows))
}

/// Issues, returns and revenue per branch
#[utoipa::path(
    get,
    path = "/reports/branch-performance",
    tag = "reports",
    responses(
        (status = 200, description = "Branch performance", body = Vec<BranchPerformance>)
    )
)]
pub async fn branch_performance(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<BranchPerformance>>> {
    let rows = state.services.reports.branch_performance().await?;
    Ok(Json(rows))
}

/// Employees ranked by issues processed
#[utoipa::path(
    get,
    path = "/reports/top-employees",
    tag = "reports",
    params(TopEmployeesQuery),
    responses(
        (status = 200, description = "Top employees", body = Vec<EmployeeIssueCount>)
    )
)]
pub async fn top_employees(
    State(state): State<crate::AppState>,
    Query(query): Query<TopEmployeesQuery>,
) -> AppResult<Json<Vec<EmployeeIssueCount>>> {
    let rows = state.services.reports.top_employees(query.limit).await?;
    Ok(Json(rows))
}

/// Members who borrowed within the trailing window
#[utoipa::path(
    get,
    path = "/reports/active-members",
    tag = "reports",
    params(ActiveMembersQuery),
    responses(
        (status = 200, description = "Active members", body = Vec<ActiveMember>)
    )
)]
pub async fn active_members(
    State(state): State<crate::AppState>,
    Query(query): Query<ActiveMembersQuery>,
) -> AppResult<Json<Vec<ActiveMember>>> {
    let as_of = query.as_of.unwrap_or_else(|| Utc::now().date_naive());
    let rows = state
        .services
        .reports
        .active_members(as_of, query.months)
        .await?;
    Ok(Json(rows))
}

/// Times each book has been issued
#[utoipa::path(
    get,
    path = "/reports/book-issue-counts",
    tag = "reports",
    responses(
        (status = 200, description = "Issue counts per book", body = Vec<BookIssueCount>)
    )
)]
pub async fn book_issue_counts(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<BookIssueCount>>> {
    let rows = state.services.reports.book_issue_counts().await?;
    Ok(Json(rows))
}

/// Data invariant check
#[utoipa::path(
    get,
    path = "/reports/integrity",
    tag = "reports",
    responses(
        (status = 200, description = "Invariant violations, if any", body = IntegrityReport)
    )
)]
pub async fn integrity(State(state): State<crate::AppState>) -> AppResult<Json<IntegrityReport>> {
    let report = state.services.reports.integrity().await?;
    Ok(Json(report))
}
