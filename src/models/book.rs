//! Book (catalog entry) model and related types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Book availability, derived from the issuance and return ledgers
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
#[repr(i16)]
pub enum Availability {
    #[default]
    Available = 0,
    Issued = 1,
}

impl From<i16> for Availability {
    fn from(v: i16) -> Self {
        match v {
            1 => Availability::Issued,
            _ => Availability::Available,
        }
    }
}

impl From<Availability> for i16 {
    fn from(a: Availability) -> Self {
        a as i16
    }
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Availability::Available => "available",
            Availability::Issued => "issued",
        };
        write!(f, "{}", label)
    }
}

/// Book model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Book {
    pub isbn: String,
    pub title: String,
    pub category: String,
    pub rental_price: Decimal,
    pub availability: Availability,
    pub author: String,
    pub publisher: String,
}

/// Raw `books` row (availability stored as SMALLINT)
#[derive(Debug, Clone, FromRow)]
pub struct BookRow {
    pub isbn: String,
    pub title: String,
    pub category: String,
    pub rental_price: Decimal,
    pub availability: i16,
    pub author: String,
    pub publisher: String,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Self {
            isbn: row.isbn,
            title: row.title,
            category: row.category,
            rental_price: row.rental_price,
            availability: Availability::from(row.availability),
            author: row.author,
            publisher: row.publisher,
        }
    }
}

/// Catalog a new book. Books always enter the catalog available.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "ISBN is required"))]
    pub isbn: String,
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,
    pub rental_price: Decimal,
    pub author: String,
    pub publisher: String,
}

impl CreateBook {
    pub fn into_book(self) -> Book {
        Book {
            isbn: self.isbn,
            title: self.title,
            category: self.category,
            rental_price: self.rental_price,
            availability: Availability::Available,
            author: self.author,
            publisher: self.publisher,
        }
    }
}

/// Update book metadata. Availability is not updatable here.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Category must not be empty"))]
    pub category: Option<String>,
    pub rental_price: Option<Decimal>,
    pub author: Option<String>,
    pub publisher: Option<String>,
}

impl UpdateBook {
    /// Apply the provided fields onto an existing book
    pub fn apply(&self, book: &mut Book) {
        if let Some(ref title) = self.title {
            book.title = title.clone();
        }
        if let Some(ref category) = self.category {
            book.category = category.clone();
        }
        if let Some(price) = self.rental_price {
            book.rental_price = price;
        }
        if let Some(ref author) = self.author {
            book.author = author.clone();
        }
        if let Some(ref publisher) = self.publisher {
            book.publisher = publisher.clone();
        }
    }
}

/// Book list filters
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    /// Exact category
    pub category: Option<String>,
    /// Current availability
    pub availability: Option<Availability>,
    /// Minimum rental price (inclusive)
    pub min_rental_price: Option<Decimal>,
}

impl BookQuery {
    pub fn matches(&self, book: &Book) -> bool {
        self.category.as_ref().map_or(true, |c| &book.category == c)
            && self.availability.map_or(true, |a| book.availability == a)
            && self
                .min_rental_price
                .map_or(true, |min| book.rental_price >= min)
    }
}

/// Availability response for a single book
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookAvailability {
    pub isbn: String,
    pub availability: Availability,
}
