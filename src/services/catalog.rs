//! Catalog service: books, members, employees and branches

use rust_decimal::Decimal;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{BookQuery, CreateBook, UpdateBook},
        branch::CreateBranch,
        employee::CreateEmployee,
        member::{CreateMember, UpdateMemberAddress},
        Book, Branch, Employee, Member,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

/// Integer digits of `books.rental_price NUMERIC(10, 2)`
const RENTAL_PRICE_INTEGER_DIGITS: u32 = 8;
/// Integer digits of `employees.salary NUMERIC(12, 2)`
const SALARY_INTEGER_DIGITS: u32 = 10;

/// A non-negative amount with at most two decimals that fits `integer_digits`
fn ensure_money(field: &str, value: Decimal, integer_digits: u32) -> AppResult<()> {
    if value.is_sign_negative() {
        return Err(AppError::Validation(format!("{} must not be negative", field)));
    }
    if value.normalize().scale() > 2 {
        return Err(AppError::Validation(format!(
            "{} must have at most 2 decimal places",
            field
        )));
    }
    if value >= Decimal::from(10u64.pow(integer_digits)) {
        return Err(AppError::Validation(format!(
            "{} must be below 10^{}",
            field, integer_digits
        )));
    }
    Ok(())
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Catalog a new book (always available)
    pub async fn create_book(&self, data: CreateBook) -> AppResult<Book> {
        data.validate()?;
        ensure_money("rental_price", data.rental_price, RENTAL_PRICE_INTEGER_DIGITS)?;

        let book = self.repository.catalog.create_book(&data.into_book()).await?;
        tracing::info!(isbn = %book.isbn, "Book catalogued");
        Ok(book)
    }

    pub async fn get_book(&self, isbn: &str) -> AppResult<Book> {
        self.repository.catalog.get_book(isbn).await
    }

    pub async fn list_books(&self, query: &BookQuery) -> AppResult<Vec<Book>> {
        self.repository.catalog.list_books(query).await
    }

    /// Update book metadata
    pub async fn update_book(&self, isbn: &str, data: UpdateBook) -> AppResult<Book> {
        data.validate()?;
        if let Some(price) = data.rental_price {
            ensure_money("rental_price", price, RENTAL_PRICE_INTEGER_DIGITS)?;
        }
        self.repository.catalog.update_book(isbn, &data).await
    }

    /// Register a member
    pub async fn create_member(&self, data: CreateMember) -> AppResult<Member> {
        data.validate()?;
        let member = self.repository.catalog.create_member(&data.into()).await?;
        tracing::info!(member_id = %member.member_id, "Member registered");
        Ok(member)
    }

    pub async fn get_member(&self, member_id: &str) -> AppResult<Member> {
        self.repository.catalog.get_member(member_id).await
    }

    pub async fn list_members(&self) -> AppResult<Vec<Member>> {
        self.repository.catalog.list_members().await
    }

    pub async fn update_member_address(
        &self,
        member_id: &str,
        data: UpdateMemberAddress,
    ) -> AppResult<Member> {
        data.validate()?;
        self.repository
            .catalog
            .update_member_address(member_id, &data.address)
            .await
    }

    pub async fn create_employee(&self, data: CreateEmployee) -> AppResult<Employee> {
        data.validate()?;
        ensure_money("salary", data.salary, SALARY_INTEGER_DIGITS)?;
        self.repository.catalog.create_employee(&data.into()).await
    }

    pub async fn get_employee(&self, emp_id: &str) -> AppResult<Employee> {
        self.repository.catalog.get_employee(emp_id).await
    }

    pub async fn list_employees(&self) -> AppResult<Vec<Employee>> {
        self.repository.catalog.list_employees().await
    }

    /// Create a branch; a founding manager, if given, is created with it
    pub async fn create_branch(&self, data: CreateBranch) -> AppResult<Branch> {
        data.validate()?;
        if let Some(ref manager) = data.manager {
            ensure_money("manager.salary", manager.salary, SALARY_INTEGER_DIGITS)?;
        }
        let (branch, manager) = data.into_parts();
        let branch = self.repository.catalog.create_branch(&branch, manager).await?;
        tracing::info!(branch_id = %branch.branch_id, manager_id = %branch.manager_id, "Branch created");
        Ok(branch)
    }

    pub async fn get_branch(&self, branch_id: &str) -> AppResult<Branch> {
        self.repository.catalog.get_branch(branch_id).await
    }

    pub async fn list_branches(&self) -> AppResult<Vec<Branch>> {
        self.repository.catalog.list_branches().await
    }
}
