//! Data models for Shelfmark

pub mod book;
pub mod branch;
pub mod employee;
pub mod loan;
pub mod member;
pub mod report;
pub mod snapshot;

// Re-export commonly used types
pub use book::{Availability, Book};
pub use branch::Branch;
pub use employee::Employee;
pub use loan::{IssuedRecord, Loan, ReturnRecord};
pub use member::Member;
pub use snapshot::LibrarySnapshot;
