//! Loan management endpoints: issue, return and queries

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        loan::{IssueBook, LoanQuery, OverdueLoan, ReturnBook},
        report::OverdueQuery,
        IssuedRecord, Loan, ReturnRecord,
    },
};

/// Return request body; the issued ID comes from the path
#[derive(Deserialize, ToSchema)]
pub struct ReturnRequest {
    /// Caller supplied return ID
    pub return_id: String,
    /// Return date (YYYY-MM-DD)
    pub return_date: NaiveDate,
}

/// List loans
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    params(LoanQuery),
    responses(
        (status = 200, description = "Loans matching the filters", body = Vec<Loan>)
    )
)]
pub async fn list_loans(
    State(state): State<crate::AppState>,
    Query(query): Query<LoanQuery>,
) -> AppResult<Json<Vec<Loan>>> {
    let loans = state.services.loans.list_loans(&query).await?;
    Ok(Json(loans))
}

/// Issue a book to a member
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    request_body = IssueBook,
    responses(
        (status = 201, description = "Book issued", body = IssuedRecord),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Book already issued"),
        (status = 422, description = "Unknown member or employee, or duplicate issued ID")
    )
)]
pub async fn issue_book(
    State(state): State<crate::AppState>,
    Json(request): Json<IssueBook>,
) -> AppResult<(StatusCode, Json<IssuedRecord>)> {
    let record = state.services.loans.issue(request).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Get a loan
#[utoipa::path(
    get,
    path = "/loans/{id}",
    tag = "loans",
    params(("id" = String, Path, description = "Issued ID")),
    responses(
        (status = 200, description = "Loan details", body = Loan),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn get_loan(
    State(state): State<crate::AppState>,
    Path(issued_id): Path<String>,
) -> AppResult<Json<Loan>> {
    let loan = state.services.loans.get_loan(&issued_id).await?;
    Ok(Json(loan))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    params(("id" = String, Path, description = "Issued ID")),
    request_body = ReturnRequest,
    responses(
        (status = 201, description = "Book returned", body = ReturnRecord),
        (status = 404, description = "Loan not found"),
        (status = 409, description = "Already returned"),
        (status = 422, description = "Duplicate return ID or return dated before issue")
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    Path(issued_id): Path<String>,
    Json(request): Json<ReturnRequest>,
) -> AppResult<(StatusCode, Json<ReturnRecord>)> {
    let record = state
        .services
        .loans
        .return_book(ReturnBook {
            issued_id,
            return_id: request.return_id,
            return_date: request.return_date,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Open loans past the grace period
#[utoipa::path(
    get,
    path = "/overdue",
    tag = "loans",
    params(OverdueQuery),
    responses(
        (status = 200, description = "Overdue loans, longest outstanding first", body = Vec<OverdueLoan>),
        (status = 400, description = "Negative grace period")
    )
)]
pub async fn list_overdue(
    State(state): State<crate::AppState>,
    Query(query): Query<OverdueQuery>,
) -> AppResult<Json<Vec<OverdueLoan>>> {
    let as_of = query.as_of.unwrap_or_else(|| Utc::now().date_naive());
    let overdue = state.services.loans.overdue(as_of, query.grace_days).await?;
    Ok(Json(overdue))
}
