//! Repository layer for catalog and ledger storage
//!
//! Two backends implement the same traits: PostgreSQL through `sqlx`
//! ([`catalog::PgCatalogRepository`], [`ledger::PgLedgerRepository`]) and a
//! process-local store ([`memory::MemoryStore`]).

pub mod catalog;
pub mod ledger;
pub mod memory;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use std::sync::Arc;

use crate::{
    error::{AppResult, IssueError, ReturnError},
    models::{
        book::{BookQuery, UpdateBook},
        loan::{IssueBook, LoanQuery, ReturnBook},
        Availability, Book, Branch, Employee, IssuedRecord, LibrarySnapshot, Loan, Member,
        ReturnRecord,
    },
};

/// Reference data: books, members, employees and branches
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn create_book(&self, book: &Book) -> AppResult<Book>;
    async fn get_book(&self, isbn: &str) -> AppResult<Book>;
    async fn list_books(&self, query: &BookQuery) -> AppResult<Vec<Book>>;
    /// Update metadata only; availability belongs to the ledger
    async fn update_book(&self, isbn: &str, update: &UpdateBook) -> AppResult<Book>;

    async fn create_member(&self, member: &Member) -> AppResult<Member>;
    async fn get_member(&self, member_id: &str) -> AppResult<Member>;
    async fn list_members(&self) -> AppResult<Vec<Member>>;
    async fn update_member_address(&self, member_id: &str, address: &str) -> AppResult<Member>;

    async fn create_employee(&self, employee: &Employee) -> AppResult<Employee>;
    async fn get_employee(&self, emp_id: &str) -> AppResult<Employee>;
    async fn list_employees(&self) -> AppResult<Vec<Employee>>;

    /// Create a branch, optionally together with its founding manager
    async fn create_branch(&self, branch: &Branch, manager: Option<Employee>) -> AppResult<Branch>;
    async fn get_branch(&self, branch_id: &str) -> AppResult<Branch>;
    async fn list_branches(&self) -> AppResult<Vec<Branch>>;
}

/// Issuance and return ledgers plus the availability guard
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Append an issued record and mark the book issued, atomically
    async fn issue(&self, request: &IssueBook) -> Result<IssuedRecord, IssueError>;
    /// Append a return record and mark the book available, atomically
    async fn return_book(&self, request: &ReturnBook) -> Result<ReturnRecord, ReturnError>;

    async fn availability(&self, isbn: &str) -> AppResult<Availability>;
    async fn get_loan(&self, issued_id: &str) -> AppResult<Loan>;
    async fn loans(&self, query: &LoanQuery) -> AppResult<Vec<Loan>>;

    /// Consistent read of every collection; must not block writers
    async fn snapshot(&self) -> AppResult<LibrarySnapshot>;
}

/// Main repository struct holding both storage facets
#[derive(Clone)]
pub struct Repository {
    pub catalog: Arc<dyn CatalogRepository>,
    pub ledger: Arc<dyn LedgerRepository>,
}

impl Repository {
    /// Create a PostgreSQL-backed repository with the given database pool
    pub fn postgres(pool: Pool<Postgres>) -> Self {
        Self {
            catalog: Arc::new(catalog::PgCatalogRepository::new(pool.clone())),
            ledger: Arc::new(ledger::PgLedgerRepository::new(pool)),
        }
    }

    /// Create a repository backed by a fresh process-local store
    pub fn in_memory() -> Self {
        let store = Arc::new(memory::MemoryStore::new());
        Self {
            catalog: store.clone(),
            ledger: store,
        }
    }

    pub fn from_parts(
        catalog: Arc<dyn CatalogRepository>,
        ledger: Arc<dyn LedgerRepository>,
    ) -> Self {
        Self { catalog, ledger }
    }
}
