//! Issuance ledger models: issued records, return records and the loan view

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// A single issue event. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct IssuedRecord {
    pub issued_id: String,
    pub member_id: String,
    pub book_isbn: String,
    pub employee_id: String,
    pub issued_date: NaiveDate,
}

/// A single return event. At most one per issued record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ReturnRecord {
    pub return_id: String,
    pub issued_id: String,
    pub book_isbn: String,
    pub return_date: NaiveDate,
}

/// Issue a book. All identifiers and the date are supplied by the caller.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct IssueBook {
    #[validate(length(min = 1, message = "Issued ID is required"))]
    pub issued_id: String,
    #[validate(length(min = 1, message = "Book ISBN is required"))]
    pub book_isbn: String,
    #[validate(length(min = 1, message = "Member ID is required"))]
    pub member_id: String,
    #[validate(length(min = 1, message = "Employee ID is required"))]
    pub employee_id: String,
    pub issued_date: NaiveDate,
}

impl IssueBook {
    pub fn to_record(&self) -> IssuedRecord {
        IssuedRecord {
            issued_id: self.issued_id.clone(),
            member_id: self.member_id.clone(),
            book_isbn: self.book_isbn.clone(),
            employee_id: self.employee_id.clone(),
            issued_date: self.issued_date,
        }
    }
}

/// Return a book for an open issued record
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ReturnBook {
    #[validate(length(min = 1, message = "Issued ID is required"))]
    pub issued_id: String,
    #[validate(length(min = 1, message = "Return ID is required"))]
    pub return_id: String,
    pub return_date: NaiveDate,
}

/// Issued record joined with its return, if any
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Loan {
    pub issued_id: String,
    pub member_id: String,
    pub book_isbn: String,
    pub employee_id: String,
    pub issued_date: NaiveDate,
    pub return_id: Option<String>,
    pub return_date: Option<NaiveDate>,
}

impl Loan {
    pub fn from_records(issued: &IssuedRecord, returned: Option<&ReturnRecord>) -> Self {
        Self {
            issued_id: issued.issued_id.clone(),
            member_id: issued.member_id.clone(),
            book_isbn: issued.book_isbn.clone(),
            employee_id: issued.employee_id.clone(),
            issued_date: issued.issued_date,
            return_id: returned.map(|r| r.return_id.clone()),
            return_date: returned.map(|r| r.return_date),
        }
    }

    /// An open loan has no return record
    pub fn is_open(&self) -> bool {
        self.return_id.is_none()
    }
}

/// Loan list filters
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct LoanQuery {
    pub book_isbn: Option<String>,
    pub member_id: Option<String>,
    /// Only loans without a return record
    #[serde(default)]
    pub open_only: bool,
}

impl LoanQuery {
    pub fn for_book(isbn: &str) -> Self {
        Self {
            book_isbn: Some(isbn.to_string()),
            ..Self::default()
        }
    }

    pub fn matches(&self, loan: &Loan) -> bool {
        self.book_isbn.as_ref().map_or(true, |i| &loan.book_isbn == i)
            && self.member_id.as_ref().map_or(true, |m| &loan.member_id == m)
            && (!self.open_only || loan.is_open())
    }
}

/// Open loan older than the grace period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OverdueLoan {
    pub issued_id: String,
    pub member_id: String,
    pub member_name: Option<String>,
    pub book_isbn: String,
    pub book_title: Option<String>,
    pub issued_date: NaiveDate,
    /// Days between the issue date and the reference date
    pub days_outstanding: i64,
    /// Days beyond the grace period
    pub days_overdue: i64,
}
