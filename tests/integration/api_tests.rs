//! API integration tests, run in-process against the in-memory backend

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use shelfmark_server::{api, repository::Repository, AppConfig, AppState};
use tower::ServiceExt;

fn app() -> Router {
    api::router(AppState::new(AppConfig::default(), Repository::in_memory()))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(format!("/api/v1{}", uri));
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("Failed to build request"),
        None => builder.body(Body::empty()).expect("Failed to build request"),
    };

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to send request");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Failed to parse response")
    };
    (status, body)
}

/// Branch B1 managed by E1, member M1, book 978-0-1
async fn seed(app: &Router) {
    let (status, _) = send(
        app,
        "POST",
        "/branches",
        Some(json!({
            "branch_id": "B1",
            "manager_id": "E1",
            "address": "1 Main St",
            "contact": "555-0100",
            "manager": { "name": "Ada", "position": "Manager", "salary": "50000.00" }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        app,
        "POST",
        "/members",
        Some(json!({
            "member_id": "M1",
            "name": "Grace",
            "address": "2 Side St",
            "registration_date": "2024-01-02"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        "POST",
        "/books",
        Some(json!({
            "isbn": "978-0-1",
            "title": "Dune",
            "category": "Fiction",
            "rental_price": "6.50",
            "author": "Frank Herbert",
            "publisher": "Chilton"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["availability"], "available");
}

fn issue_body(issued_id: &str, date: &str) -> Value {
    json!({
        "issued_id": issued_id,
        "book_isbn": "978-0-1",
        "member_id": "M1",
        "employee_id": "E1",
        "issued_date": date
    })
}

#[tokio::test]
async fn test_health_check() {
    let app = app();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, "GET", "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_issue_and_return_over_http() {
    let app = app();
    seed(&app).await;

    let (status, body) = send(&app, "POST", "/loans", Some(issue_body("IS1", "2024-03-01"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["issued_id"], "IS1");

    let (_, body) = send(&app, "GET", "/books/978-0-1/availability", None).await;
    assert_eq!(body["availability"], "issued");

    let (status, body) = send(&app, "POST", "/loans", Some(issue_body("IS2", "2024-03-02"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "BookAlreadyIssued");

    let (status, body) = send(
        &app,
        "POST",
        "/loans/IS1/return",
        Some(json!({ "return_id": "RS1", "return_date": "2024-03-06" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["book_isbn"], "978-0-1");

    let (status, body) = send(
        &app,
        "POST",
        "/loans/IS1/return",
        Some(json!({ "return_id": "RS2", "return_date": "2024-03-07" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "LoanAlreadyReturned");

    let (_, body) = send(&app, "GET", "/loans/IS1", None).await;
    assert_eq!(body["return_id"], "RS1");

    let (_, body) = send(&app, "GET", "/books/978-0-1/loans", None).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_issue_error_statuses() {
    let app = app();
    seed(&app).await;

    let mut unknown_book = issue_body("IS1", "2024-03-01");
    unknown_book["book_isbn"] = json!("000-0-0");
    let (status, _) = send(&app, "POST", "/loans", Some(unknown_book)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let mut unknown_member = issue_body("IS1", "2024-03-01");
    unknown_member["member_id"] = json!("M404");
    let (status, body) = send(&app, "POST", "/loans", Some(unknown_member)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "ConstraintViolation");

    let (status, _) = send(&app, "POST", "/loans", Some(issue_body("", "2024-03-01"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/loans/IS404/return",
        Some(json!({ "return_id": "RS1", "return_date": "2024-03-06" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Nothing above may leave a trace
    let (_, body) = send(&app, "GET", "/reports/integrity", None).await;
    assert_eq!(body["healthy"], true);
    let (_, body) = send(&app, "GET", "/loans", None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_overdue_endpoint() {
    let app = app();
    seed(&app).await;
    send(&app, "POST", "/loans", Some(issue_body("IS1", "2024-03-01"))).await;

    let (status, body) = send(&app, "GET", "/overdue?as_of=2024-04-01", None).await;
    assert_eq!(status, StatusCode::OK);
    let overdue = body.as_array().expect("array");
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0]["days_outstanding"], 31);
    assert_eq!(overdue[0]["member_name"], "Grace");

    let (_, body) = send(&app, "GET", "/overdue?as_of=2024-03-30", None).await;
    assert_eq!(body, json!([]));

    let (_, body) = send(&app, "GET", "/overdue?as_of=2024-03-30&grace_days=7", None).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let (status, _) = send(&app, "GET", "/overdue?grace_days=-3", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reports() {
    let app = app();
    seed(&app).await;
    send(&app, "POST", "/loans", Some(issue_body("IS1", "2024-03-01"))).await;

    let (_, body) = send(&app, "GET", "/reports/revenue-by-category", None).await;
    assert_eq!(body[0]["category"], "Fiction");
    assert_eq!(body[0]["issue_count"], 1);

    let (_, body) = send(&app, "GET", "/reports/branch-performance", None).await;
    assert_eq!(body[0]["branch_id"], "B1");
    assert_eq!(body[0]["issued_count"], 1);
    assert_eq!(body[0]["returned_count"], 0);

    let (_, body) = send(&app, "GET", "/reports/top-employees?limit=1", None).await;
    assert_eq!(body[0]["emp_id"], "E1");

    let (_, body) = send(&app, "GET", "/reports/active-members?as_of=2024-04-15", None).await;
    assert_eq!(body[0]["member_id"], "M1");
    let (_, body) = send(
        &app,
        "GET",
        "/reports/active-members?as_of=2024-06-15&months=2",
        None,
    )
    .await;
    assert_eq!(body, json!([]));

    let (_, body) = send(&app, "GET", "/reports/book-issue-counts", None).await;
    assert_eq!(body[0]["isbn"], "978-0-1");
}

#[tokio::test]
async fn test_catalog_endpoints() {
    let app = app();
    seed(&app).await;

    let (status, _) = send(
        &app,
        "POST",
        "/books",
        Some(json!({
            "isbn": "978-0-1",
            "title": "Duplicate",
            "category": "Fiction",
            "rental_price": "1.00",
            "author": "",
            "publisher": ""
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send(
        &app,
        "PUT",
        "/books/978-0-1",
        Some(json!({ "rental_price": "7.25" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Dune");
    assert_eq!(body["availability"], "available");

    let (status, body) = send(
        &app,
        "PUT",
        "/members/M1/address",
        Some(json!({ "address": "9 New Rd" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["address"], "9 New Rd");

    let (status, _) = send(
        &app,
        "POST",
        "/employees",
        Some(json!({
            "emp_id": "E2",
            "name": "Linus",
            "position": "Clerk",
            "salary": "30000",
            "branch_id": "B9"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(&app, "GET", "/members/M404", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, "GET", "/books?category=Fiction&availability=available", None).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    let (_, body) = send(&app, "GET", "/books?min_rental_price=10", None).await;
    assert_eq!(body, json!([]));
}
