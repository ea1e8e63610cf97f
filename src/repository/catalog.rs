//! Catalog repository for PostgreSQL

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{BookQuery, BookRow, UpdateBook},
        Book, Branch, Employee, Member,
    },
};

use super::CatalogRepository;

#[derive(Clone)]
pub struct PgCatalogRepository {
    pool: Pool<Postgres>,
}

impl PgCatalogRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    async fn create_book(&self, book: &Book) -> AppResult<Book> {
        let row = sqlx::query_as::<_, BookRow>(
            r#"
            INSERT INTO books (isbn, title, category, rental_price, availability, author, publisher)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&book.isbn)
        .bind(&book.title)
        .bind(&book.category)
        .bind(book.rental_price)
        .bind(i16::from(book.availability))
        .bind(&book.author)
        .bind(&book.publisher)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn get_book(&self, isbn: &str) -> AppResult<Book> {
        sqlx::query_as::<_, BookRow>("SELECT * FROM books WHERE isbn = $1")
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?
            .map(Book::from)
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", isbn)))
    }

    async fn list_books(&self, query: &BookQuery) -> AppResult<Vec<Book>> {
        let mut conditions = Vec::new();
        let mut idx = 1;

        if query.category.is_some() {
            conditions.push(format!("category = ${}", idx));
            idx += 1;
        }
        if query.availability.is_some() {
            conditions.push(format!("availability = ${}", idx));
            idx += 1;
        }
        if query.min_rental_price.is_some() {
            conditions.push(format!("rental_price >= ${}", idx));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let sql = format!("SELECT * FROM books {} ORDER BY isbn", where_clause);

        let mut builder = sqlx::query_as::<_, BookRow>(&sql);
        if let Some(ref category) = query.category {
            builder = builder.bind(category);
        }
        if let Some(availability) = query.availability {
            builder = builder.bind(i16::from(availability));
        }
        if let Some(min) = query.min_rental_price {
            builder = builder.bind(min);
        }

        let rows = builder.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn update_book(&self, isbn: &str, update: &UpdateBook) -> AppResult<Book> {
        sqlx::query_as::<_, BookRow>(
            r#"
            UPDATE books SET
                title = COALESCE($2, title),
                category = COALESCE($3, category),
                rental_price = COALESCE($4, rental_price),
                author = COALESCE($5, author),
                publisher = COALESCE($6, publisher)
            WHERE isbn = $1
            RETURNING *
            "#,
        )
        .bind(isbn)
        .bind(&update.title)
        .bind(&update.category)
        .bind(update.rental_price)
        .bind(&update.author)
        .bind(&update.publisher)
        .fetch_optional(&self.pool)
        .await?
        .map(Book::from)
        .ok_or_else(|| AppError::NotFound(format!("Book {} not found", isbn)))
    }

    async fn create_member(&self, member: &Member) -> AppResult<Member> {
        let row = sqlx::query_as::<_, Member>(
            r#"
            INSERT INTO members (member_id, name, address, registration_date)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&member.member_id)
        .bind(&member.name)
        .bind(&member.address)
        .bind(member.registration_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn get_member(&self, member_id: &str) -> AppResult<Member> {
        sqlx::query_as::<_, Member>("SELECT * FROM members WHERE member_id = $1")
            .bind(member_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member {} not found", member_id)))
    }

    async fn list_members(&self) -> AppResult<Vec<Member>> {
        let rows = sqlx::query_as::<_, Member>("SELECT * FROM members ORDER BY member_id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn update_member_address(&self, member_id: &str, address: &str) -> AppResult<Member> {
        sqlx::query_as::<_, Member>(
            "UPDATE members SET address = $2 WHERE member_id = $1 RETURNING *",
        )
        .bind(member_id)
        .bind(address)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Member {} not found", member_id)))
    }

    async fn create_employee(&self, employee: &Employee) -> AppResult<Employee> {
        // Deferred branch FK is checked at commit, so run in a transaction
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, Employee>(
            r#"
            INSERT INTO employees (emp_id, name, position, salary, branch_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&employee.emp_id)
        .bind(&employee.name)
        .bind(&employee.position)
        .bind(employee.salary)
        .bind(&employee.branch_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    async fn get_employee(&self, emp_id: &str) -> AppResult<Employee> {
        sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE emp_id = $1")
            .bind(emp_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", emp_id)))
    }

    async fn list_employees(&self) -> AppResult<Vec<Employee>> {
        let rows = sqlx::query_as::<_, Employee>("SELECT * FROM employees ORDER BY emp_id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn create_branch(&self, branch: &Branch, manager: Option<Employee>) -> AppResult<Branch> {
        // branches.manager_id and employees.branch_id reference each other;
        // both constraints are DEFERRABLE INITIALLY DEFERRED.
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, Branch>(
            r#"
            INSERT INTO branches (branch_id, manager_id, address, contact)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&branch.branch_id)
        .bind(&branch.manager_id)
        .bind(&branch.address)
        .bind(&branch.contact)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(manager) = manager {
            sqlx::query(
                r#"
                INSERT INTO employees (emp_id, name, position, salary, branch_id)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(&manager.emp_id)
            .bind(&manager.name)
            .bind(&manager.position)
            .bind(manager.salary)
            .bind(&manager.branch_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(row)
    }

    async fn get_branch(&self, branch_id: &str) -> AppResult<Branch> {
        sqlx::query_as::<_, Branch>("SELECT * FROM branches WHERE branch_id = $1")
            .bind(branch_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Branch {} not found", branch_id)))
    }

    async fn list_branches(&self) -> AppResult<Vec<Branch>> {
        let rows = sqlx::query_as::<_, Branch>("SELECT * FROM branches ORDER BY branch_id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
