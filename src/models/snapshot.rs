//! Point-in-time copy of the whole store, consumed by overdue detection and reports

use serde::Serialize;
use std::collections::HashMap;

use super::{Book, Branch, Employee, IssuedRecord, Member, ReturnRecord};

/// Consistent copy of the catalog and both ledgers.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LibrarySnapshot {
    pub books: Vec<Book>,
    pub members: Vec<Member>,
    pub employees: Vec<Employee>,
    pub branches: Vec<Branch>,
    pub issued: Vec<IssuedRecord>,
    pub returns: Vec<ReturnRecord>,
}

impl LibrarySnapshot {
    /// Return records keyed by issued_id
    pub fn returns_by_issue(&self) -> HashMap<&str, &ReturnRecord> {
        self.returns
            .iter()
            .map(|r| (r.issued_id.as_str(), r))
            .collect()
    }

    /// Issued records that have no return record
    pub fn open_loans(&self) -> impl Iterator<Item = &IssuedRecord> {
        let returned = self.returns_by_issue();
        self.issued
            .iter()
            .filter(move |i| !returned.contains_key(i.issued_id.as_str()))
    }

    pub fn books_by_isbn(&self) -> HashMap<&str, &Book> {
        self.books.iter().map(|b| (b.isbn.as_str(), b)).collect()
    }

    pub fn members_by_id(&self) -> HashMap<&str, &Member> {
        self.members
            .iter()
            .map(|m| (m.member_id.as_str(), m))
            .collect()
    }

    pub fn employees_by_id(&self) -> HashMap<&str, &Employee> {
        self.employees
            .iter()
            .map(|e| (e.emp_id.as_str(), e))
            .collect()
    }
}
