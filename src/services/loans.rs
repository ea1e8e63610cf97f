//! Loan management service: the issue/return state machine and loan queries

use chrono::NaiveDate;
use validator::Validate;

use crate::{
    config::LoanPolicyConfig,
    error::{AppError, AppResult, IssueError, ReturnError},
    models::{
        loan::{IssueBook, LoanQuery, OverdueLoan, ReturnBook},
        Availability, IssuedRecord, Loan, ReturnRecord,
    },
    repository::Repository,
};

use super::overdue;

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    policy: LoanPolicyConfig,
}

impl LoansService {
    pub fn new(repository: Repository, policy: LoanPolicyConfig) -> Self {
        Self { repository, policy }
    }

    /// Issue a book to a member
    pub async fn issue(&self, request: IssueBook) -> AppResult<IssuedRecord> {
        request.validate()?;

        match self.repository.ledger.issue(&request).await {
            Ok(record) => {
                tracing::info!(
                    isbn = %record.book_isbn,
                    issued_id = %record.issued_id,
                    member_id = %record.member_id,
                    "Book issued"
                );
                Ok(record)
            }
            Err(IssueError::Database(e)) => {
                tracing::error!(isbn = %request.book_isbn, "Issue failed: {:?}", e);
                Err(AppError::Database(e))
            }
            Err(e) => {
                tracing::warn!(isbn = %request.book_isbn, issued_id = %request.issued_id, "Issue rejected: {}", e);
                Err(e.into())
            }
        }
    }

    /// Return a book for an open issued record
    pub async fn return_book(&self, request: ReturnBook) -> AppResult<ReturnRecord> {
        request.validate()?;

        match self.repository.ledger.return_book(&request).await {
            Ok(record) => {
                tracing::info!(
                    isbn = %record.book_isbn,
                    issued_id = %record.issued_id,
                    return_id = %record.return_id,
                    "Book returned"
                );
                Ok(record)
            }
            Err(ReturnError::Database(e)) => {
                tracing::error!(issued_id = %request.issued_id, "Return failed: {:?}", e);
                Err(AppError::Database(e))
            }
            Err(e) => {
                tracing::warn!(issued_id = %request.issued_id, "Return rejected: {}", e);
                Err(e.into())
            }
        }
    }

    pub async fn availability(&self, isbn: &str) -> AppResult<Availability> {
        self.repository.ledger.availability(isbn).await
    }

    pub async fn get_loan(&self, issued_id: &str) -> AppResult<Loan> {
        self.repository.ledger.get_loan(issued_id).await
    }

    pub async fn list_loans(&self, query: &LoanQuery) -> AppResult<Vec<Loan>> {
        self.repository.ledger.loans(query).await
    }

    /// Loan history of one book, oldest first
    pub async fn book_history(&self, isbn: &str) -> AppResult<Vec<Loan>> {
        // 404 for unknown books rather than an empty history
        self.repository.catalog.get_book(isbn).await?;
        self.repository.ledger.loans(&LoanQuery::for_book(isbn)).await
    }

    /// Open loans older than the grace period as of `as_of`
    pub async fn overdue(
        &self,
        as_of: NaiveDate,
        grace_days: Option<i64>,
    ) -> AppResult<Vec<OverdueLoan>> {
        let grace_days = grace_days.unwrap_or(self.policy.overdue_grace_days);
        if grace_days < 0 {
            return Err(AppError::BadRequest(
                "grace_days must not be negative".to_string(),
            ));
        }
        let snapshot = self.repository.ledger.snapshot().await?;
        Ok(overdue::find_overdue(&snapshot, as_of, grace_days))
    }
}
