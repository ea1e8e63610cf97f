//! Data invariant verification over a snapshot

use std::collections::{HashMap, HashSet};

use crate::models::{
    report::{InvariantViolation, ViolationKind},
    Availability, LibrarySnapshot,
};

fn violation(kind: ViolationKind, detail: String) -> InvariantViolation {
    InvariantViolation { kind, detail }
}

/// Every invariant breach found in `snapshot`. Empty on a healthy store.
pub fn check_invariants(snapshot: &LibrarySnapshot) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    let books = snapshot.books_by_isbn();
    let members = snapshot.members_by_id();
    let employees = snapshot.employees_by_id();
    let branches: HashSet<&str> = snapshot
        .branches
        .iter()
        .map(|b| b.branch_id.as_str())
        .collect();
    let issued: HashMap<&str, _> = snapshot
        .issued
        .iter()
        .map(|i| (i.issued_id.as_str(), i))
        .collect();

    let mut returns_per_issue: HashMap<&str, usize> = HashMap::new();
    for r in &snapshot.returns {
        *returns_per_issue.entry(r.issued_id.as_str()).or_default() += 1;
        match issued.get(r.issued_id.as_str()) {
            None => violations.push(violation(
                ViolationKind::DanglingReference,
                format!("Return {} references unknown issued record {}", r.return_id, r.issued_id),
            )),
            Some(i) => {
                if i.book_isbn != r.book_isbn {
                    violations.push(violation(
                        ViolationKind::DanglingReference,
                        format!(
                            "Return {} names book {} but issued record {} is for {}",
                            r.return_id, r.book_isbn, i.issued_id, i.book_isbn
                        ),
                    ));
                }
                if r.return_date < i.issued_date {
                    violations.push(violation(
                        ViolationKind::ReturnBeforeIssue,
                        format!("Return {} is dated before issue {}", r.return_id, i.issued_id),
                    ));
                }
            }
        }
    }
    let mut duplicated: Vec<_> = returns_per_issue
        .iter()
        .filter(|(_, n)| **n > 1)
        .map(|(id, n)| (*id, *n))
        .collect();
    duplicated.sort();
    for (issued_id, n) in duplicated {
        violations.push(violation(
            ViolationKind::DuplicateReturn,
            format!("Issued record {} has {} returns", issued_id, n),
        ));
    }

    let mut open_per_book: HashMap<&str, usize> = HashMap::new();
    for i in &snapshot.issued {
        if !books.contains_key(i.book_isbn.as_str()) {
            violations.push(violation(
                ViolationKind::DanglingReference,
                format!("Issued record {} references unknown book {}", i.issued_id, i.book_isbn),
            ));
        }
        if !members.contains_key(i.member_id.as_str()) {
            violations.push(violation(
                ViolationKind::DanglingReference,
                format!("Issued record {} references unknown member {}", i.issued_id, i.member_id),
            ));
        }
        if !employees.contains_key(i.employee_id.as_str()) {
            violations.push(violation(
                ViolationKind::DanglingReference,
                format!(
                    "Issued record {} references unknown employee {}",
                    i.issued_id, i.employee_id
                ),
            ));
        }
        if !returns_per_issue.contains_key(i.issued_id.as_str()) {
            *open_per_book.entry(i.book_isbn.as_str()).or_default() += 1;
        }
    }

    for book in &snapshot.books {
        let open = open_per_book.get(book.isbn.as_str()).copied().unwrap_or(0);
        if open > 1 {
            violations.push(violation(
                ViolationKind::MultipleOpenLoans,
                format!("Book {} has {} open loans", book.isbn, open),
            ));
        }
        let expected = if open > 0 {
            Availability::Issued
        } else {
            Availability::Available
        };
        if book.availability != expected {
            violations.push(violation(
                ViolationKind::AvailabilityMismatch,
                format!(
                    "Book {} is {} but has {} open loan(s)",
                    book.isbn, book.availability, open
                ),
            ));
        }
    }

    for e in &snapshot.employees {
        if !branches.contains(e.branch_id.as_str()) {
            violations.push(violation(
                ViolationKind::DanglingReference,
                format!("Employee {} references unknown branch {}", e.emp_id, e.branch_id),
            ));
        }
    }
    for b in &snapshot.branches {
        if !employees.contains_key(b.manager_id.as_str()) {
            violations.push(violation(
                ViolationKind::DanglingReference,
                format!("Branch {} manager {} is not an employee", b.branch_id, b.manager_id),
            ));
        }
    }

    violations
}
