//! Issuance and return ledgers for PostgreSQL
//!
//! Issue and return run in a transaction that holds a row lock on the book
//! (and on the issued record for returns), so two transitions on the same
//! book are serialized and the availability flag never diverges from the
//! ledgers.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult, IssueError, ReturnError},
    models::{
        book::BookRow,
        loan::{IssueBook, LoanQuery, ReturnBook},
        Availability, Book, Branch, Employee, IssuedRecord, LibrarySnapshot, Loan, Member,
        ReturnRecord,
    },
};

use super::LedgerRepository;

const LOAN_SELECT: &str = r#"
    SELECT i.issued_id, i.member_id, i.book_isbn, i.employee_id, i.issued_date,
           r.return_id, r.return_date
    FROM issued_status i
    LEFT JOIN return_status r ON r.issued_id = i.issued_id
"#;

#[derive(Clone)]
pub struct PgLedgerRepository {
    pool: Pool<Postgres>,
}

impl PgLedgerRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn loan_from_row(row: &sqlx::postgres::PgRow) -> Loan {
        Loan {
            issued_id: row.get("issued_id"),
            member_id: row.get("member_id"),
            book_isbn: row.get("book_isbn"),
            employee_id: row.get("employee_id"),
            issued_date: row.get("issued_date"),
            return_id: row.get("return_id"),
            return_date: row.get("return_date"),
        }
    }
}

#[async_trait]
impl LedgerRepository for PgLedgerRepository {
    async fn issue(&self, request: &IssueBook) -> Result<IssuedRecord, IssueError> {
        let mut tx = self.pool.begin().await?;

        // Lock the book row; a concurrent issue blocks here until we commit
        let availability: Option<i16> =
            sqlx::query_scalar("SELECT availability FROM books WHERE isbn = $1 FOR UPDATE")
                .bind(&request.book_isbn)
                .fetch_optional(&mut *tx)
                .await?;

        match availability.map(Availability::from) {
            None => return Err(IssueError::NotFound(request.book_isbn.clone())),
            Some(Availability::Issued) => {
                return Err(IssueError::AlreadyIssued(request.book_isbn.clone()))
            }
            Some(Availability::Available) => {}
        }

        let record = sqlx::query_as::<_, IssuedRecord>(
            r#"
            INSERT INTO issued_status (issued_id, member_id, book_isbn, employee_id, issued_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&request.issued_id)
        .bind(&request.member_id)
        .bind(&request.book_isbn)
        .bind(&request.employee_id)
        .bind(request.issued_date)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE books SET availability = $1 WHERE isbn = $2")
            .bind(i16::from(Availability::Issued))
            .bind(&request.book_isbn)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(record)
    }

    async fn return_book(&self, request: &ReturnBook) -> Result<ReturnRecord, ReturnError> {
        let mut tx = self.pool.begin().await?;

        let issued = sqlx::query_as::<_, IssuedRecord>(
            "SELECT * FROM issued_status WHERE issued_id = $1 FOR UPDATE",
        )
        .bind(&request.issued_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ReturnError::NotFound(request.issued_id.clone()))?;

        // The book row guards availability for issue as well
        sqlx::query("SELECT 1 FROM books WHERE isbn = $1 FOR UPDATE")
            .bind(&issued.book_isbn)
            .execute(&mut *tx)
            .await?;

        let already_returned: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM return_status WHERE issued_id = $1)",
        )
        .bind(&request.issued_id)
        .fetch_one(&mut *tx)
        .await?;

        if already_returned {
            return Err(ReturnError::AlreadyReturned(request.issued_id.clone()));
        }

        if request.return_date < issued.issued_date {
            return Err(ReturnError::ConstraintViolation(format!(
                "Return date {} precedes issue date {}",
                request.return_date, issued.issued_date
            )));
        }

        let record = sqlx::query_as::<_, ReturnRecord>(
            r#"
            INSERT INTO return_status (return_id, issued_id, book_isbn, return_date)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&request.return_id)
        .bind(&request.issued_id)
        .bind(&issued.book_isbn)
        .bind(request.return_date)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE books SET availability = $1 WHERE isbn = $2")
            .bind(i16::from(Availability::Available))
            .bind(&issued.book_isbn)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(record)
    }

    async fn availability(&self, isbn: &str) -> AppResult<Availability> {
        sqlx::query_scalar::<_, i16>("SELECT availability FROM books WHERE isbn = $1")
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?
            .map(Availability::from)
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", isbn)))
    }

    async fn get_loan(&self, issued_id: &str) -> AppResult<Loan> {
        let sql = format!("{} WHERE i.issued_id = $1", LOAN_SELECT);
        let row = sqlx::query(&sql)
            .bind(issued_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Issued record {} not found", issued_id)))?;

        Ok(Self::loan_from_row(&row))
    }

    async fn loans(&self, query: &LoanQuery) -> AppResult<Vec<Loan>> {
        let mut conditions = Vec::new();
        let mut idx = 1;

        if query.book_isbn.is_some() {
            conditions.push(format!("i.book_isbn = ${}", idx));
            idx += 1;
        }
        if query.member_id.is_some() {
            conditions.push(format!("i.member_id = ${}", idx));
        }
        if query.open_only {
            conditions.push("r.return_id IS NULL".to_string());
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let sql = format!(
            "{} {} ORDER BY i.issued_date, i.issued_id",
            LOAN_SELECT, where_clause
        );

        let mut builder = sqlx::query(&sql);
        if let Some(ref isbn) = query.book_isbn {
            builder = builder.bind(isbn);
        }
        if let Some(ref member_id) = query.member_id {
            builder = builder.bind(member_id);
        }

        let rows = builder.fetch_all(&self.pool).await?;
        Ok(rows.iter().map(Self::loan_from_row).collect())
    }

    async fn snapshot(&self) -> AppResult<LibrarySnapshot> {
        // MVCC snapshot: sees one committed state and takes no row locks
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let books = sqlx::query_as::<_, BookRow>("SELECT * FROM books ORDER BY isbn")
            .fetch_all(&mut *tx)
            .await?
            .into_iter()
            .map(Book::from)
            .collect();
        let members = sqlx::query_as::<_, Member>("SELECT * FROM members ORDER BY member_id")
            .fetch_all(&mut *tx)
            .await?;
        let employees = sqlx::query_as::<_, Employee>("SELECT * FROM employees ORDER BY emp_id")
            .fetch_all(&mut *tx)
            .await?;
        let branches = sqlx::query_as::<_, Branch>("SELECT * FROM branches ORDER BY branch_id")
            .fetch_all(&mut *tx)
            .await?;
        let issued = sqlx::query_as::<_, IssuedRecord>(
            "SELECT * FROM issued_status ORDER BY issued_date, issued_id",
        )
        .fetch_all(&mut *tx)
        .await?;
        let returns = sqlx::query_as::<_, ReturnRecord>(
            "SELECT * FROM return_status ORDER BY return_date, return_id",
        )
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(LibrarySnapshot {
            books,
            members,
            employees,
            branches,
            issued,
            returns,
        })
    }
}
