//! Error types for Shelfmark server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// PostgreSQL SQLSTATE for foreign key violations
const PG_FOREIGN_KEY_VIOLATION: &str = "23503";
/// PostgreSQL SQLSTATE for unique violations
const PG_UNIQUE_VIOLATION: &str = "23505";
/// Unique constraint guarding one return per issuance
pub(crate) const RETURN_ISSUED_ID_CONSTRAINT: &str = "return_status_issued_id_key";

/// Stable error codes exposed to API clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    DbFailure = 3,
    NoSuchData = 5,
    BookAlreadyIssued = 7,
    LoanAlreadyReturned = 8,
    ConstraintViolation = 9,
    BadValue = 18,
}

/// Failure of the issue transition
#[derive(Error, Debug)]
pub enum IssueError {
    #[error("Book {0} not found")]
    NotFound(String),

    #[error("Book {0} is already issued")]
    AlreadyIssued(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

/// Failure of the return transition
#[derive(Error, Debug)]
pub enum ReturnError {
    #[error("Issued record {0} not found")]
    NotFound(String),

    #[error("Issued record {0} is already returned")]
    AlreadyReturned(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already issued: {0}")]
    AlreadyIssued(String),

    #[error("Already returned: {0}")]
    AlreadyReturned(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Constraint class of a database error, decided from SQLSTATE and constraint name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Violation {
    ForeignKey,
    Unique,
    /// Unique breach on the one-return-per-issue constraint
    DuplicateReturn,
    Other,
}

pub(crate) fn violation_of(code: Option<&str>, constraint: Option<&str>) -> Violation {
    match code {
        Some(PG_FOREIGN_KEY_VIOLATION) => Violation::ForeignKey,
        Some(PG_UNIQUE_VIOLATION) if constraint == Some(RETURN_ISSUED_ID_CONSTRAINT) => {
            Violation::DuplicateReturn
        }
        Some(PG_UNIQUE_VIOLATION) => Violation::Unique,
        _ => Violation::Other,
    }
}

/// Classification of a database error raised by an insert or commit
#[derive(Debug)]
pub(crate) enum DbFailure {
    ForeignKey(String),
    Unique(String),
    DuplicateReturn(String),
    Other(sqlx::Error),
}

pub(crate) fn classify(err: sqlx::Error) -> DbFailure {
    if let sqlx::Error::Database(db) = &err {
        let message = db.message().to_string();
        match violation_of(db.code().as_deref(), db.constraint()) {
            Violation::ForeignKey => return DbFailure::ForeignKey(message),
            Violation::Unique => return DbFailure::Unique(message),
            Violation::DuplicateReturn => return DbFailure::DuplicateReturn(message),
            Violation::Other => {}
        }
    }
    DbFailure::Other(err)
}

impl From<DbFailure> for AppError {
    fn from(failure: DbFailure) -> Self {
        match failure {
            DbFailure::ForeignKey(msg)
            | DbFailure::Unique(msg)
            | DbFailure::DuplicateReturn(msg) => AppError::ConstraintViolation(msg),
            DbFailure::Other(e) => AppError::Database(e),
        }
    }
}

impl From<DbFailure> for IssueError {
    fn from(failure: DbFailure) -> Self {
        match failure {
            DbFailure::ForeignKey(msg)
            | DbFailure::Unique(msg)
            | DbFailure::DuplicateReturn(msg) => IssueError::ConstraintViolation(msg),
            DbFailure::Other(e) => IssueError::Database(e),
        }
    }
}

impl From<DbFailure> for ReturnError {
    fn from(failure: DbFailure) -> Self {
        match failure {
            DbFailure::DuplicateReturn(msg) => ReturnError::AlreadyReturned(msg),
            DbFailure::ForeignKey(msg) | DbFailure::Unique(msg) => {
                ReturnError::ConstraintViolation(msg)
            }
            DbFailure::Other(e) => ReturnError::Database(e),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        classify(err).into()
    }
}

impl From<sqlx::Error> for IssueError {
    fn from(err: sqlx::Error) -> Self {
        classify(err).into()
    }
}

impl From<sqlx::Error> for ReturnError {
    fn from(err: sqlx::Error) -> Self {
        classify(err).into()
    }
}

impl From<IssueError> for AppError {
    fn from(err: IssueError) -> Self {
        match err {
            IssueError::NotFound(isbn) => AppError::NotFound(format!("Book {} not found", isbn)),
            IssueError::AlreadyIssued(isbn) => {
                AppError::AlreadyIssued(format!("Book {} is already issued", isbn))
            }
            IssueError::ConstraintViolation(msg) => AppError::ConstraintViolation(msg),
            IssueError::Database(e) => AppError::Database(e),
        }
    }
}

impl From<ReturnError> for AppError {
    fn from(err: ReturnError) -> Self {
        match err {
            ReturnError::NotFound(id) => {
                AppError::NotFound(format!("Issued record {} not found", id))
            }
            ReturnError::AlreadyReturned(id) => {
                AppError::AlreadyReturned(format!("Issued record {} is already returned", id))
            }
            ReturnError::ConstraintViolation(msg) => AppError::ConstraintViolation(msg),
            ReturnError::Database(e) => AppError::Database(e),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, ErrorCode) {
        match self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NoSuchData),
            AppError::AlreadyIssued(_) => (StatusCode::CONFLICT, ErrorCode::BookAlreadyIssued),
            AppError::AlreadyReturned(_) => {
                (StatusCode::CONFLICT, ErrorCode::LoanAlreadyReturned)
            }
            AppError::ConstraintViolation(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::ConstraintViolation)
            }
            AppError::Validation(_) | AppError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue)
            }
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::DbFailure),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Failure),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = match &self {
            AppError::NotFound(msg)
            | AppError::AlreadyIssued(msg)
            | AppError::AlreadyReturned(msg)
            | AppError::ConstraintViolation(msg)
            | AppError::Validation(msg)
            | AppError::BadRequest(msg) => msg.clone(),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Database error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_errors_map_to_http_statuses() {
        let cases = [
            (IssueError::NotFound("978-0-1".into()), StatusCode::NOT_FOUND),
            (IssueError::AlreadyIssued("978-0-1".into()), StatusCode::CONFLICT),
            (
                IssueError::ConstraintViolation("member M9".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
        ];
        for (err, status) in cases {
            let app: AppError = err.into();
            assert_eq!(app.into_response().status(), status);
        }
    }

    #[test]
    fn test_return_errors_map_to_app_errors() {
        let app: AppError = ReturnError::AlreadyReturned("IS1".into()).into();
        assert!(matches!(app, AppError::AlreadyReturned(ref m) if m.contains("IS1")));

        let app: AppError = ReturnError::NotFound("IS2".into()).into();
        assert!(matches!(app, AppError::NotFound(_)));
    }

    #[test]
    fn test_non_database_sqlx_error_stays_database() {
        let app: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(app, AppError::Database(_)));
        assert_eq!(
            app.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_sqlstate_classification() {
        assert_eq!(
            violation_of(Some("23503"), Some("issued_status_member_id_fkey")),
            Violation::ForeignKey
        );
        assert_eq!(
            violation_of(Some("23505"), Some("issued_status_pkey")),
            Violation::Unique
        );
        assert_eq!(violation_of(Some("23505"), None), Violation::Unique);
        assert_eq!(
            violation_of(Some("23505"), Some("return_status_issued_id_key")),
            Violation::DuplicateReturn
        );
        assert_eq!(
            violation_of(Some("22003"), Some("return_status_issued_id_key")),
            Violation::Other
        );
        assert_eq!(violation_of(None, None), Violation::Other);
    }

    #[test]
    fn test_racing_second_return_is_already_returned() {
        let err: ReturnError = DbFailure::DuplicateReturn("duplicate key".into()).into();
        assert!(matches!(err, ReturnError::AlreadyReturned(_)));

        let app: AppError = err.into();
        assert_eq!(app.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_constraint_failures_map_to_constraint_violation() {
        let err: ReturnError = DbFailure::Unique("return_status_pkey".into()).into();
        assert!(matches!(err, ReturnError::ConstraintViolation(_)));

        let err: IssueError = DbFailure::ForeignKey("member".into()).into();
        assert!(matches!(err, IssueError::ConstraintViolation(_)));
        let err: IssueError = DbFailure::Unique("issued_status_pkey".into()).into();
        assert!(matches!(err, IssueError::ConstraintViolation(_)));

        let app: AppError = DbFailure::ForeignKey("branch".into()).into();
        assert_eq!(
            app.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
