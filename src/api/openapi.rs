//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, branches, employees, health, loans, members, reports};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Shelfmark API",
        version = "0.1.0",
        description = "Library book issuing REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Books
        books::list_books,
        books::create_book,
        books::get_book,
        books::update_book,
        books::get_availability,
        books::get_book_loans,
        // Members
        members::list_members,
        members::create_member,
        members::get_member,
        members::update_address,
        // Employees
        employees::list_employees,
        employees::create_employee,
        employees::get_employee,
        // Branches
        branches::list_branches,
        branches::create_branch,
        branches::get_branch,
        // Loans
        loans::list_loans,
        loans::issue_book,
        loans::get_loan,
        loans::return_book,
        loans::list_overdue,
        // Reports
        reports::revenue_by_category,
        reports::branch_performance,
        reports::top_employees,
        reports::active_members,
        reports::book_issue_counts,
        reports::integrity,
    ),
    components(
        schemas(
            // Books
            crate::models::book::Book,
            crate::models::book::Availability,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::book::BookAvailability,
            // Members
            crate::models::member::Member,
            crate::models::member::CreateMember,
            crate::models::member::UpdateMemberAddress,
            // Employees & branches
            crate::models::employee::Employee,
            crate::models::employee::CreateEmployee,
            crate::models::branch::Branch,
            crate::models::branch::CreateBranch,
            crate::models::branch::FoundingManager,
            // Loans
            crate::models::loan::IssuedRecord,
            crate::models::loan::ReturnRecord,
            crate::models::loan::IssueBook,
            crate::models::loan::Loan,
            crate::models::loan::OverdueLoan,
            loans::ReturnRequest,
            // Reports
            crate::models::report::CategoryRevenue,
            crate::models::report::BranchPerformance,
            crate::models::report::EmployeeIssueCount,
            crate::models::report::ActiveMember,
            crate::models::report::BookIssueCount,
            crate::models::report::IntegrityReport,
            crate::models::report::InvariantViolation,
            crate::models::report::ViolationKind,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Book catalog"),
        (name = "members", description = "Library members"),
        (name = "employees", description = "Library staff"),
        (name = "branches", description = "Library branches"),
        (name = "loans", description = "Issuing and returning books"),
        (name = "reports", description = "Read-only reports")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
