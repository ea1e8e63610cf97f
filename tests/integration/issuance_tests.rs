//! Issuance lifecycle tests through the service layer

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use shelfmark_server::{
    config::LoanPolicyConfig,
    models::{
        book::CreateBook,
        branch::{CreateBranch, FoundingManager},
        loan::{IssueBook, LoanQuery, ReturnBook},
        member::CreateMember,
        Availability,
    },
    repository::{LedgerRepository, Repository},
    services::{integrity::check_invariants, Services},
    AppError,
};

fn day(n: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(n)
}

async fn library() -> (Services, Repository) {
    let repository = Repository::in_memory();
    let services = Services::new(repository.clone(), LoanPolicyConfig::default());

    services
        .catalog
        .create_branch(CreateBranch {
            branch_id: "B1".into(),
            manager_id: "E1".into(),
            address: "1 Main St".into(),
            contact: "555-0100".into(),
            manager: Some(FoundingManager {
                name: "Ada".into(),
                position: "Manager".into(),
                salary: Decimal::new(5000000, 2),
            }),
        })
        .await
        .unwrap();
    services
        .catalog
        .create_member(CreateMember {
            member_id: "M1".into(),
            name: "Grace".into(),
            address: "2 Side St".into(),
            registration_date: day(-30),
        })
        .await
        .unwrap();
    services
        .catalog
        .create_book(CreateBook {
            isbn: "978-0-1".into(),
            title: "Dune".into(),
            category: "Fiction".into(),
            rental_price: Decimal::new(650, 2),
            author: "Frank Herbert".into(),
            publisher: "Chilton".into(),
        })
        .await
        .unwrap();

    (services, repository)
}

fn issue(issued_id: &str, on: NaiveDate) -> IssueBook {
    IssueBook {
        issued_id: issued_id.into(),
        book_isbn: "978-0-1".into(),
        member_id: "M1".into(),
        employee_id: "E1".into(),
        issued_date: on,
    }
}

async fn assert_consistent(repository: &Repository) {
    let snapshot = repository.ledger.snapshot().await.unwrap();
    assert_eq!(check_invariants(&snapshot), vec![]);
}

#[tokio::test]
async fn test_end_to_end_lifecycle() {
    let (services, repository) = library().await;
    let loans = &services.loans;

    assert_eq!(loans.availability("978-0-1").await.unwrap(), Availability::Available);

    // Day 0: issue
    let first = loans.issue(issue("IS1", day(0))).await.unwrap();
    assert_eq!(loans.availability("978-0-1").await.unwrap(), Availability::Issued);
    assert_eq!(loans.list_loans(&LoanQuery::default()).await.unwrap().len(), 1);
    assert_consistent(&repository).await;

    // Day 1: second issue rejected
    let err = loans.issue(issue("IS2", day(1))).await.unwrap_err();
    assert!(matches!(err, AppError::AlreadyIssued(_)));
    assert_eq!(loans.list_loans(&LoanQuery::default()).await.unwrap().len(), 1);
    assert_consistent(&repository).await;

    // Day 5: return
    let returned = loans
        .return_book(ReturnBook {
            issued_id: first.issued_id.clone(),
            return_id: "RS1".into(),
            return_date: day(5),
        })
        .await
        .unwrap();
    assert_eq!(returned.issued_id, "IS1");
    assert_eq!(loans.availability("978-0-1").await.unwrap(), Availability::Available);
    assert_consistent(&repository).await;

    // Day 6: re-issue creates an independent record
    let second = loans.issue(issue("IS3", day(6))).await.unwrap();
    assert_ne!(second.issued_id, first.issued_id);
    assert_eq!(loans.availability("978-0-1").await.unwrap(), Availability::Issued);

    let history = loans.book_history("978-0-1").await.unwrap();
    assert_eq!(history.len(), 2);
    assert!(!history[0].is_open());
    assert!(history[1].is_open());
    assert_consistent(&repository).await;
}

#[tokio::test]
async fn test_returned_loan_not_overdue_regardless_of_age() {
    let (services, _) = library().await;
    let loans = &services.loans;

    loans.issue(issue("IS1", day(0))).await.unwrap();
    assert_eq!(loans.overdue(day(31), None).await.unwrap().len(), 1);
    assert!(loans.overdue(day(29), None).await.unwrap().is_empty());

    loans
        .return_book(ReturnBook {
            issued_id: "IS1".into(),
            return_id: "RS1".into(),
            return_date: day(40),
        })
        .await
        .unwrap();
    assert!(loans.overdue(day(400), None).await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_issue_and_return_keep_invariants() {
    let (services, repository) = library().await;

    for round in 0..10 {
        let tasks: Vec<_> = (0..8)
            .map(|n| {
                let services = services.clone();
                tokio::spawn(async move {
                    services
                        .loans
                        .issue(issue(&format!("IS{}-{}", round, n), day(round)))
                        .await
                })
            })
            .collect();

        let mut winners = Vec::new();
        for task in tasks {
            if let Ok(record) = task.await.unwrap() {
                winners.push(record);
            }
        }
        assert_eq!(winners.len(), 1, "round {}", round);
        assert_consistent(&repository).await;

        services
            .loans
            .return_book(ReturnBook {
                issued_id: winners[0].issued_id.clone(),
                return_id: format!("RS{}", round),
                return_date: day(round),
            })
            .await
            .unwrap();
        assert_consistent(&repository).await;
    }

    let open = services
        .loans
        .list_loans(&LoanQuery {
            open_only: true,
            ..LoanQuery::default()
        })
        .await
        .unwrap();
    assert!(open.is_empty());
}
