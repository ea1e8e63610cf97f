//! Overdue detection over a ledger snapshot

use chrono::NaiveDate;

use crate::models::{loan::OverdueLoan, LibrarySnapshot};

/// Open loans whose age in days exceeds `grace_days` as of `as_of`.
///
/// Returned loans are never reported. Results are ordered by days outstanding,
/// longest first, then by issued_id.
pub fn find_overdue(snapshot: &LibrarySnapshot, as_of: NaiveDate, grace_days: i64) -> Vec<OverdueLoan> {
    let members = snapshot.members_by_id();
    let books = snapshot.books_by_isbn();

    let mut overdue: Vec<OverdueLoan> = snapshot
        .open_loans()
        .filter_map(|issued| {
            let days_outstanding = (as_of - issued.issued_date).num_days();
            if days_outstanding <= grace_days {
                return None;
            }
            Some(OverdueLoan {
                issued_id: issued.issued_id.clone(),
                member_id: issued.member_id.clone(),
                member_name: members
                    .get(issued.member_id.as_str())
                    .map(|m| m.name.clone()),
                book_isbn: issued.book_isbn.clone(),
                book_title: books.get(issued.book_isbn.as_str()).map(|b| b.title.clone()),
                issued_date: issued.issued_date,
                days_outstanding,
                days_overdue: days_outstanding - grace_days,
            })
        })
        .collect();

    overdue.sort_by(|a, b| {
        b.days_outstanding
            .cmp(&a.days_outstanding)
            .then_with(|| a.issued_id.cmp(&b.issued_id))
    });
    overdue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IssuedRecord, Member, ReturnRecord};
    use chrono::Duration;

    fn now() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    fn issued(id: &str, age_days: i64) -> IssuedRecord {
        IssuedRecord {
            issued_id: id.into(),
            member_id: "M1".into(),
            book_isbn: format!("isbn-{}", id),
            employee_id: "E1".into(),
            issued_date: now() - Duration::days(age_days),
        }
    }

    #[test]
    fn test_grace_boundary() {
        let snapshot = LibrarySnapshot {
            issued: vec![issued("old", 31), issued("young", 29), issued("edge", 30)],
            members: vec![Member {
                member_id: "M1".into(),
                name: "Grace".into(),
                address: "2 Side St".into(),
                registration_date: now() - Duration::days(400),
            }],
            ..LibrarySnapshot::default()
        };

        let overdue = find_overdue(&snapshot, now(), 30);
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].issued_id, "old");
        assert_eq!(overdue[0].days_outstanding, 31);
        assert_eq!(overdue[0].days_overdue, 1);
        assert_eq!(overdue[0].member_name.as_deref(), Some("Grace"));
    }

    #[test]
    fn test_returned_loan_never_flagged() {
        let old = issued("ancient", 365);
        let snapshot = LibrarySnapshot {
            returns: vec![ReturnRecord {
                return_id: "RS1".into(),
                issued_id: old.issued_id.clone(),
                book_isbn: old.book_isbn.clone(),
                return_date: old.issued_date + Duration::days(10),
            }],
            issued: vec![old],
            ..LibrarySnapshot::default()
        };

        assert!(find_overdue(&snapshot, now(), 30).is_empty());
    }

    #[test]
    fn test_sorted_longest_first() {
        let snapshot = LibrarySnapshot {
            issued: vec![issued("a", 40), issued("b", 90), issued("c", 60)],
            ..LibrarySnapshot::default()
        };

        let ids: Vec<_> = find_overdue(&snapshot, now(), 30)
            .into_iter()
            .map(|o| o.issued_id)
            .collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }
}
