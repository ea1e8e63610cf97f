//! Process-local store implementing both repository traits
//!
//! Every mutation runs its check and its writes under a single write guard, so
//! a transition is atomic and transitions on the same book are serialized.
//! Reads and snapshots take the read guard only long enough to clone.

use async_trait::async_trait;
use indexmap::IndexMap;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::{
    error::{AppError, AppResult, IssueError, ReturnError},
    models::{
        book::{BookQuery, UpdateBook},
        loan::{IssueBook, LoanQuery, ReturnBook},
        Availability, Book, Branch, Employee, IssuedRecord, LibrarySnapshot, Loan, Member,
        ReturnRecord,
    },
};

use super::{CatalogRepository, LedgerRepository};

#[derive(Debug, Default)]
struct LibraryState {
    books: IndexMap<String, Book>,
    members: IndexMap<String, Member>,
    employees: IndexMap<String, Employee>,
    branches: IndexMap<String, Branch>,
    issued: IndexMap<String, IssuedRecord>,
    /// Keyed by return_id
    returns: IndexMap<String, ReturnRecord>,
    /// issued_id -> return_id
    returned_by_issue: HashMap<String, String>,
}

impl LibraryState {
    fn loan(&self, issued: &IssuedRecord) -> Loan {
        let returned = self
            .returned_by_issue
            .get(&issued.issued_id)
            .and_then(|rid| self.returns.get(rid));
        Loan::from_records(issued, returned)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<LibraryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn duplicate(entity: &str, id: &str) -> AppError {
    AppError::ConstraintViolation(format!("{} {} already exists", entity, id))
}

#[async_trait]
impl CatalogRepository for MemoryStore {
    async fn create_book(&self, book: &Book) -> AppResult<Book> {
        let mut state = self.state.write().await;
        if state.books.contains_key(&book.isbn) {
            return Err(duplicate("Book", &book.isbn));
        }
        state.books.insert(book.isbn.clone(), book.clone());
        Ok(book.clone())
    }

    async fn get_book(&self, isbn: &str) -> AppResult<Book> {
        self.state
            .read()
            .await
            .books
            .get(isbn)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", isbn)))
    }

    async fn list_books(&self, query: &BookQuery) -> AppResult<Vec<Book>> {
        let state = self.state.read().await;
        let mut books: Vec<Book> = state
            .books
            .values()
            .filter(|b| query.matches(b))
            .cloned()
            .collect();
        books.sort_by(|a, b| a.isbn.cmp(&b.isbn));
        Ok(books)
    }

    async fn update_book(&self, isbn: &str, update: &UpdateBook) -> AppResult<Book> {
        let mut state = self.state.write().await;
        let book = state
            .books
            .get_mut(isbn)
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", isbn)))?;
        update.apply(book);
        Ok(book.clone())
    }

    async fn create_member(&self, member: &Member) -> AppResult<Member> {
        let mut state = self.state.write().await;
        if state.members.contains_key(&member.member_id) {
            return Err(duplicate("Member", &member.member_id));
        }
        state
            .members
            .insert(member.member_id.clone(), member.clone());
        Ok(member.clone())
    }

    async fn get_member(&self, member_id: &str) -> AppResult<Member> {
        self.state
            .read()
            .await
            .members
            .get(member_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Member {} not found", member_id)))
    }

    async fn list_members(&self) -> AppResult<Vec<Member>> {
        let state = self.state.read().await;
        let mut members: Vec<Member> = state.members.values().cloned().collect();
        members.sort_by(|a, b| a.member_id.cmp(&b.member_id));
        Ok(members)
    }

    async fn update_member_address(&self, member_id: &str, address: &str) -> AppResult<Member> {
        let mut state = self.state.write().await;
        let member = state
            .members
            .get_mut(member_id)
            .ok_or_else(|| AppError::NotFound(format!("Member {} not found", member_id)))?;
        member.address = address.to_string();
        Ok(member.clone())
    }

    async fn create_employee(&self, employee: &Employee) -> AppResult<Employee> {
        let mut state = self.state.write().await;
        if state.employees.contains_key(&employee.emp_id) {
            return Err(duplicate("Employee", &employee.emp_id));
        }
        if !state.branches.contains_key(&employee.branch_id) {
            return Err(AppError::ConstraintViolation(format!(
                "Branch {} does not exist",
                employee.branch_id
            )));
        }
        state
            .employees
            .insert(employee.emp_id.clone(), employee.clone());
        Ok(employee.clone())
    }

    async fn get_employee(&self, emp_id: &str) -> AppResult<Employee> {
        self.state
            .read()
            .await
            .employees
            .get(emp_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", emp_id)))
    }

    async fn list_employees(&self) -> AppResult<Vec<Employee>> {
        let state = self.state.read().await;
        let mut employees: Vec<Employee> = state.employees.values().cloned().collect();
        employees.sort_by(|a, b| a.emp_id.cmp(&b.emp_id));
        Ok(employees)
    }

    async fn create_branch(&self, branch: &Branch, manager: Option<Employee>) -> AppResult<Branch> {
        let mut state = self.state.write().await;
        if state.branches.contains_key(&branch.branch_id) {
            return Err(duplicate("Branch", &branch.branch_id));
        }
        match manager {
            Some(manager) => {
                if state.employees.contains_key(&manager.emp_id) {
                    return Err(duplicate("Employee", &manager.emp_id));
                }
                if manager.emp_id != branch.manager_id || manager.branch_id != branch.branch_id {
                    return Err(AppError::ConstraintViolation(format!(
                        "Founding manager {} must be assigned to branch {}",
                        manager.emp_id, branch.branch_id
                    )));
                }
                state.employees.insert(manager.emp_id.clone(), manager);
            }
            None => {
                if !state.employees.contains_key(&branch.manager_id) {
                    return Err(AppError::ConstraintViolation(format!(
                        "Manager {} is not an employee",
                        branch.manager_id
                    )));
                }
            }
        }
        state
            .branches
            .insert(branch.branch_id.clone(), branch.clone());
        Ok(branch.clone())
    }

    async fn get_branch(&self, branch_id: &str) -> AppResult<Branch> {
        self.state
            .read()
            .await
            .branches
            .get(branch_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Branch {} not found", branch_id)))
    }

    async fn list_branches(&self) -> AppResult<Vec<Branch>> {
        let state = self.state.read().await;
        let mut branches: Vec<Branch> = state.branches.values().cloned().collect();
        branches.sort_by(|a, b| a.branch_id.cmp(&b.branch_id));
        Ok(branches)
    }
}

#[async_trait]
impl LedgerRepository for MemoryStore {
    async fn issue(&self, request: &IssueBook) -> Result<IssuedRecord, IssueError> {
        let mut state = self.state.write().await;

        match state.books.get(&request.book_isbn) {
            None => return Err(IssueError::NotFound(request.book_isbn.clone())),
            Some(book) if book.availability == Availability::Issued => {
                return Err(IssueError::AlreadyIssued(request.book_isbn.clone()))
            }
            Some(_) => {}
        }
        if state.issued.contains_key(&request.issued_id) {
            return Err(IssueError::ConstraintViolation(format!(
                "Issued record {} already exists",
                request.issued_id
            )));
        }
        if !state.members.contains_key(&request.member_id) {
            return Err(IssueError::ConstraintViolation(format!(
                "Member {} does not exist",
                request.member_id
            )));
        }
        if !state.employees.contains_key(&request.employee_id) {
            return Err(IssueError::ConstraintViolation(format!(
                "Employee {} does not exist",
                request.employee_id
            )));
        }

        let record = request.to_record();
        state
            .issued
            .insert(record.issued_id.clone(), record.clone());
        if let Some(book) = state.books.get_mut(&request.book_isbn) {
            book.availability = Availability::Issued;
        }
        Ok(record)
    }

    async fn return_book(&self, request: &ReturnBook) -> Result<ReturnRecord, ReturnError> {
        let mut state = self.state.write().await;

        let issued = state
            .issued
            .get(&request.issued_id)
            .cloned()
            .ok_or_else(|| ReturnError::NotFound(request.issued_id.clone()))?;

        if state.returned_by_issue.contains_key(&request.issued_id) {
            return Err(ReturnError::AlreadyReturned(request.issued_id.clone()));
        }
        if state.returns.contains_key(&request.return_id) {
            return Err(ReturnError::ConstraintViolation(format!(
                "Return record {} already exists",
                request.return_id
            )));
        }
        if request.return_date < issued.issued_date {
            return Err(ReturnError::ConstraintViolation(format!(
                "Return date {} precedes issue date {}",
                request.return_date, issued.issued_date
            )));
        }

        let record = ReturnRecord {
            return_id: request.return_id.clone(),
            issued_id: issued.issued_id.clone(),
            book_isbn: issued.book_isbn.clone(),
            return_date: request.return_date,
        };
        state
            .returned_by_issue
            .insert(record.issued_id.clone(), record.return_id.clone());
        state
            .returns
            .insert(record.return_id.clone(), record.clone());
        if let Some(book) = state.books.get_mut(&issued.book_isbn) {
            book.availability = Availability::Available;
        }
        Ok(record)
    }

    async fn availability(&self, isbn: &str) -> AppResult<Availability> {
        self.state
            .read()
            .await
            .books
            .get(isbn)
            .map(|b| b.availability)
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", isbn)))
    }

    async fn get_loan(&self, issued_id: &str) -> AppResult<Loan> {
        let state = self.state.read().await;
        state
            .issued
            .get(issued_id)
            .map(|i| state.loan(i))
            .ok_or_else(|| AppError::NotFound(format!("Issued record {} not found", issued_id)))
    }

    async fn loans(&self, query: &LoanQuery) -> AppResult<Vec<Loan>> {
        let state = self.state.read().await;
        let mut loans: Vec<Loan> = state
            .issued
            .values()
            .map(|i| state.loan(i))
            .filter(|l| query.matches(l))
            .collect();
        loans.sort_by(|a, b| {
            a.issued_date
                .cmp(&b.issued_date)
                .then_with(|| a.issued_id.cmp(&b.issued_id))
        });
        Ok(loans)
    }

    async fn snapshot(&self) -> AppResult<LibrarySnapshot> {
        let state = self.state.read().await;
        Ok(LibrarySnapshot {
            books: state.books.values().cloned().collect(),
            members: state.members.values().cloned().collect(),
            employees: state.employees.values().cloned().collect(),
            branches: state.branches.values().cloned().collect(),
            issued: state.issued.values().cloned().collect(),
            returns: state.returns.values().cloned().collect(),
        })
    }
}
