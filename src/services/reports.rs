//! Reporting views
//!
//! Each report is a pure aggregation over a [`LibrarySnapshot`]; the service
//! only fetches the snapshot and applies policy defaults.

use chrono::{Months, NaiveDate};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::{
    config::LoanPolicyConfig,
    error::{AppError, AppResult},
    models::{
        report::{
            ActiveMember, BookIssueCount, BranchPerformance, CategoryRevenue, EmployeeIssueCount,
            IntegrityReport,
        },
        LibrarySnapshot,
    },
    repository::Repository,
};

use super::integrity::check_invariants;

#[derive(Clone)]
pub struct ReportsService {
    repository: Repository,
    policy: LoanPolicyConfig,
}

impl ReportsService {
    pub fn new(repository: Repository, policy: LoanPolicyConfig) -> Self {
        Self { repository, policy }
    }

    pub async fn revenue_by_category(&self) -> AppResult<Vec<CategoryRevenue>> {
        let snapshot = self.repository.ledger.snapshot().await?;
        Ok(revenue_by_category(&snapshot))
    }

    pub async fn branch_performance(&self) -> AppResult<Vec<BranchPerformance>> {
        let snapshot = self.repository.ledger.snapshot().await?;
        Ok(branch_performance(&snapshot))
    }

    pub async fn top_employees(&self, limit: Option<usize>) -> AppResult<Vec<EmployeeIssueCount>> {
        let limit = limit.unwrap_or(self.policy.top_employees_limit);
        if limit == 0 {
            return Err(AppError::BadRequest("limit must be at least 1".to_string()));
        }
        let snapshot = self.repository.ledger.snapshot().await?;
        Ok(top_employees(&snapshot, limit))
    }

    pub async fn active_members(
        &self,
        as_of: NaiveDate,
        months: Option<u32>,
    ) -> AppResult<Vec<ActiveMember>> {
        let months = months.unwrap_or(self.policy.active_member_window_months);
        if months == 0 {
            return Err(AppError::BadRequest("months must be at least 1".to_string()));
        }
        let since = as_of
            .checked_sub_months(Months::new(months))
            .ok_or_else(|| AppError::BadRequest(format!("Window of {} months is out of range", months)))?;
        let snapshot = self.repository.ledger.snapshot().await?;
        Ok(active_members(&snapshot, since, as_of))
    }

    pub async fn book_issue_counts(&self) -> AppResult<Vec<BookIssueCount>> {
        let snapshot = self.repository.ledger.snapshot().await?;
        Ok(book_issue_counts(&snapshot))
    }

    pub async fn integrity(&self) -> AppResult<IntegrityReport> {
        let snapshot = self.repository.ledger.snapshot().await?;
        let violations = check_invariants(&snapshot);
        if !violations.is_empty() {
            tracing::warn!("Integrity check found {} violation(s)", violations.len());
        }
        Ok(IntegrityReport {
            healthy: violations.is_empty(),
            violations,
        })
    }
}

/// Rental revenue and issue count per category, highest revenue first
pub fn revenue_by_category(snapshot: &LibrarySnapshot) -> Vec<CategoryRevenue> {
    let books = snapshot.books_by_isbn();
    let mut by_category: IndexMap<&str, (i64, Decimal)> = IndexMap::new();

    for issued in &snapshot.issued {
        if let Some(book) = books.get(issued.book_isbn.as_str()) {
            let entry = by_category
                .entry(book.category.as_str())
                .or_insert((0, Decimal::ZERO));
            entry.0 += 1;
            entry.1 += book.rental_price;
        }
    }

    let mut rows: Vec<CategoryRevenue> = by_category
        .into_iter()
        .map(|(category, (issue_count, total_revenue))| CategoryRevenue {
            category: category.to_string(),
            issue_count,
            total_revenue,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.total_revenue
            .cmp(&a.total_revenue)
            .then_with(|| a.category.cmp(&b.category))
    });
    rows
}

/// Per-branch activity, attributed through the issuing employee's branch
pub fn branch_performance(snapshot: &LibrarySnapshot) -> Vec<BranchPerformance> {
    let books = snapshot.books_by_isbn();
    let employees = snapshot.employees_by_id();
    let returns = snapshot.returns_by_issue();

    let mut rows: IndexMap<&str, BranchPerformance> = snapshot
        .branches
        .iter()
        .map(|b| {
            (
                b.branch_id.as_str(),
                BranchPerformance {
                    branch_id: b.branch_id.clone(),
                    manager_id: b.manager_id.clone(),
                    issued_count: 0,
                    returned_count: 0,
                    total_revenue: Decimal::ZERO,
                },
            )
        })
        .collect();

    for issued in &snapshot.issued {
        let Some(employee) = employees.get(issued.employee_id.as_str()) else {
            continue;
        };
        let Some(row) = rows.get_mut(employee.branch_id.as_str()) else {
            continue;
        };
        row.issued_count += 1;
        if returns.contains_key(issued.issued_id.as_str()) {
            row.returned_count += 1;
        }
        if let Some(book) = books.get(issued.book_isbn.as_str()) {
            row.total_revenue += book.rental_price;
        }
    }

    let mut rows: Vec<BranchPerformance> = rows.into_values().collect();
    rows.sort_by(|a, b| a.branch_id.cmp(&b.branch_id));
    rows
}

/// Employees ranked by issues processed; ties broken by emp_id
pub fn top_employees(snapshot: &LibrarySnapshot, limit: usize) -> Vec<EmployeeIssueCount> {
    let mut counts: HashMap<&str, i64> = HashMap::new();
    for issued in &snapshot.issued {
        *counts.entry(issued.employee_id.as_str()).or_default() += 1;
    }

    let mut rows: Vec<EmployeeIssueCount> = snapshot
        .employees
        .iter()
        .filter_map(|e| {
            counts.get(e.emp_id.as_str()).map(|&issue_count| EmployeeIssueCount {
                emp_id: e.emp_id.clone(),
                name: e.name.clone(),
                branch_id: e.branch_id.clone(),
                issue_count,
            })
        })
        .collect();
    rows.sort_by(|a, b| {
        b.issue_count
            .cmp(&a.issue_count)
            .then_with(|| a.emp_id.cmp(&b.emp_id))
    });
    rows.truncate(limit);
    rows
}

/// Members with at least one issue dated in `[since, as_of]`
pub fn active_members(snapshot: &LibrarySnapshot, since: NaiveDate, as_of: NaiveDate) -> Vec<ActiveMember> {
    let mut activity: HashMap<&str, (i64, NaiveDate)> = HashMap::new();
    for issued in snapshot
        .issued
        .iter()
        .filter(|i| i.issued_date >= since && i.issued_date <= as_of)
    {
        let entry = activity
            .entry(issued.member_id.as_str())
            .or_insert((0, issued.issued_date));
        entry.0 += 1;
        entry.1 = entry.1.max(issued.issued_date);
    }

    let mut rows: Vec<ActiveMember> = snapshot
        .members
        .iter()
        .filter_map(|m| {
            activity
                .get(m.member_id.as_str())
                .map(|&(issue_count, last_issued_date)| ActiveMember {
                    member_id: m.member_id.clone(),
                    name: m.name.clone(),
                    issue_count,
                    last_issued_date,
                })
        })
        .collect();
    rows.sort_by(|a, b| a.member_id.cmp(&b.member_id));
    rows
}

/// Times each book has been issued, most issued first
pub fn book_issue_counts(snapshot: &LibrarySnapshot) -> Vec<BookIssueCount> {
    let mut counts: HashMap<&str, i64> = HashMap::new();
    for issued in &snapshot.issued {
        *counts.entry(issued.book_isbn.as_str()).or_default() += 1;
    }

    let mut rows: Vec<BookIssueCount> = snapshot
        .books
        .iter()
        .filter_map(|b| {
            counts.get(b.isbn.as_str()).map(|&issue_count| BookIssueCount {
                isbn: b.isbn.clone(),
                title: b.title.clone(),
                issue_count,
            })
        })
        .collect();
    rows.sort_by(|a, b| {
        b.issue_count
            .cmp(&a.issue_count)
            .then_with(|| a.isbn.cmp(&b.isbn))
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Availability, Book, Branch, Employee, IssuedRecord, Member, ReturnRecord};
    use crate::repository::{MockCatalogRepository, MockLedgerRepository};
    use std::sync::Arc;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn book(isbn: &str, category: &str, cents: i64) -> Book {
        Book {
            isbn: isbn.into(),
            title: format!("Title {}", isbn),
            category: category.into(),
            rental_price: Decimal::new(cents, 2),
            availability: Availability::Available,
            author: "Author".into(),
            publisher: "Publisher".into(),
        }
    }

    fn employee(id: &str, branch: &str) -> Employee {
        Employee {
            emp_id: id.into(),
            name: format!("Name {}", id),
            position: "Clerk".into(),
            salary: Decimal::new(3000000, 2),
            branch_id: branch.into(),
        }
    }

    fn member(id: &str) -> Member {
        Member {
            member_id: id.into(),
            name: format!("Member {}", id),
            address: "Somewhere".into(),
            registration_date: date(1, 1),
        }
    }

    fn issue(id: &str, isbn: &str, member: &str, emp: &str, on: NaiveDate) -> IssuedRecord {
        IssuedRecord {
            issued_id: id.into(),
            member_id: member.into(),
            book_isbn: isbn.into(),
            employee_id: emp.into(),
            issued_date: on,
        }
    }

    fn fixture() -> LibrarySnapshot {
        LibrarySnapshot {
            books: vec![
                book("b1", "History", 600),
                book("b2", "Fiction", 450),
                book("b3", "Fiction", 300),
            ],
            members: vec![member("M1"), member("M2"), member("M3")],
            employees: vec![employee("E1", "B1"), employee("E2", "B2"), employee("E3", "B2")],
            branches: vec![
                Branch {
                    branch_id: "B1".into(),
                    manager_id: "E1".into(),
                    address: "North".into(),
                    contact: "1".into(),
                },
                Branch {
                    branch_id: "B2".into(),
                    manager_id: "E1".into(),
                    address: "South".into(),
                    contact: "2".into(),
                },
                Branch {
                    branch_id: "B3".into(),
                    manager_id: "E2".into(),
                    address: "East".into(),
                    contact: "3".into(),
                },
            ],
            issued: vec![
                issue("I1", "b1", "M1", "E1", date(1, 5)),
                issue("I2", "b2", "M2", "E2", date(4, 20)),
                issue("I3", "b3", "M1", "E2", date(5, 2)),
                issue("I4", "b2", "M3", "E3", date(5, 10)),
            ],
            returns: vec![
                ReturnRecord {
                    return_id: "R1".into(),
                    issued_id: "I1".into(),
                    book_isbn: "b1".into(),
                    return_date: date(1, 20),
                },
                ReturnRecord {
                    return_id: "R2".into(),
                    issued_id: "I2".into(),
                    book_isbn: "b2".into(),
                    return_date: date(5, 1),
                },
            ],
        }
    }

    #[test]
    fn test_revenue_by_category() {
        let rows = revenue_by_category(&fixture());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].category, "Fiction");
        assert_eq!(rows[0].issue_count, 3);
        assert_eq!(rows[0].total_revenue, Decimal::new(1200, 2));
        assert_eq!(rows[1].category, "History");
        assert_eq!(rows[1].total_revenue, Decimal::new(600, 2));
    }

    #[test]
    fn test_branch_performance_includes_idle_branches() {
        let rows = branch_performance(&fixture());
        assert_eq!(rows.len(), 3);

        assert_eq!(rows[0].branch_id, "B1");
        assert_eq!((rows[0].issued_count, rows[0].returned_count), (1, 1));
        assert_eq!(rows[0].total_revenue, Decimal::new(600, 2));

        assert_eq!(rows[1].branch_id, "B2");
        assert_eq!((rows[1].issued_count, rows[1].returned_count), (3, 1));
        assert_eq!(rows[1].total_revenue, Decimal::new(1200, 2));

        assert_eq!(rows[2].branch_id, "B3");
        assert_eq!(rows[2].issued_count, 0);
        assert_eq!(rows[2].total_revenue, Decimal::ZERO);
    }

    #[test]
    fn test_top_employees_ranked_and_truncated() {
        let rows = top_employees(&fixture(), 2);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].emp_id, "E2");
        assert_eq!(rows[0].issue_count, 2);
        // E1 and E3 tie on one issue each
        assert_eq!(rows[1].emp_id, "E1");
    }

    #[test]
    fn test_active_members_window() {
        let as_of = date(6, 1);
        let since = as_of.checked_sub_months(Months::new(2)).unwrap();
        let rows = active_members(&fixture(), since, as_of);

        let ids: Vec<_> = rows.iter().map(|r| r.member_id.as_str()).collect();
        assert_eq!(ids, vec!["M1", "M2", "M3"]);
        let m1 = &rows[0];
        assert_eq!(m1.issue_count, 1);
        assert_eq!(m1.last_issued_date, date(5, 2));

        let since = as_of.checked_sub_months(Months::new(1)).unwrap();
        let rows = active_members(&fixture(), since, as_of);
        let ids: Vec<_> = rows.iter().map(|r| r.member_id.as_str()).collect();
        assert_eq!(ids, vec!["M1", "M3"]);
    }

    fn service(ledger: MockLedgerRepository) -> ReportsService {
        ReportsService::new(
            Repository::from_parts(Arc::new(MockCatalogRepository::new()), Arc::new(ledger)),
            LoanPolicyConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_zero_month_window_rejected() {
        let mut ledger = MockLedgerRepository::new();
        ledger.expect_snapshot().times(0);

        let err = service(ledger)
            .active_members(date(6, 1), Some(0))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_default_window_comes_from_policy() {
        let mut ledger = MockLedgerRepository::new();
        ledger.expect_snapshot().times(1).returning(|| Ok(fixture()));

        let rows = service(ledger).active_members(date(6, 1), None).await.unwrap();
        let ids: Vec<_> = rows.iter().map(|r| r.member_id.as_str()).collect();
        assert_eq!(ids, vec!["M1", "M2", "M3"]);
    }

    #[test]
    fn test_book_issue_counts() {
        let rows = book_issue_counts(&fixture());
        assert_eq!(rows[0].isbn, "b2");
        assert_eq!(rows[0].issue_count, 2);
        assert_eq!(rows.len(), 3);
    }
}
