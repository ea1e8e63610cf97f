//! API handlers for Shelfmark REST endpoints

pub mod books;
pub mod branches;
pub mod employees;
pub mod health;
pub mod loans;
pub mod members;
pub mod openapi;
pub mod reports;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/:isbn", get(books::get_book).put(books::update_book))
        .route("/books/:isbn/availability", get(books::get_availability))
        .route("/books/:isbn/loans", get(books::get_book_loans))
        // Members
        .route("/members", get(members::list_members).post(members::create_member))
        .route("/members/:id", get(members::get_member))
        .route("/members/:id/address", put(members::update_address))
        // Employees
        .route("/employees", get(employees::list_employees).post(employees::create_employee))
        .route("/employees/:id", get(employees::get_employee))
        // Branches
        .route("/branches", get(branches::list_branches).post(branches::create_branch))
        .route("/branches/:id", get(branches::get_branch))
        // Loans
        .route("/loans", get(loans::list_loans).post(loans::issue_book))
        .route("/loans/:id", get(loans::get_loan))
        .route("/loans/:id/return", post(loans::return_book))
        .route("/overdue", get(loans::list_overdue))
        // Reports
        .route("/reports/revenue-by-category", get(reports::revenue_by_category))
        .route("/reports/branch-performance", get(reports::branch_performance))
        .route("/reports/top-employees", get(reports::top_employees))
        .route("/reports/active-members", get(reports::active_members))
        .route("/reports/book-issue-counts", get(reports::book_issue_counts))
        .route("/reports/integrity", get(reports::integrity))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
