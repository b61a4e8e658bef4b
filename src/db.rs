mod schema;

pub use schema::Database;

use crate::error::{AppError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Book record served by the catalog and admin API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    /// Server-assigned unique ID.
    pub id: i64,
    /// Book title.
    pub title: String,
    /// Primary author.
    pub author: String,
    /// Price; absent prices sort last in catalog listings.
    pub price: Option<f64>,
    /// Category (free text, matched case-insensitively).
    pub category: String,
    /// ISBN.
    pub isbn: Option<String>,
    /// Publication date.
    pub publish_date: Option<NaiveDate>,
    /// Publisher.
    pub publisher: Option<String>,
    /// Language code.
    pub language: Option<String>,
    /// Page count.
    pub pages: Option<i64>,
    /// Binding format (hardcover, paperback, ebook...).
    pub format: Option<String>,
    /// Book description.
    pub description: Option<String>,
    /// Cover image URI.
    pub cover_image: Option<String>,
    /// Average rating (0-5).
    pub rating: Option<f64>,
    /// Review count.
    pub reviews: i64,
    /// Whether the book is in stock.
    pub in_stock: bool,
}

/// Incoming book payload for create and update operations.
///
/// Validated at the HTTP boundary so malformed records never reach SQL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookPayload {
    /// Book title.
    pub title: String,
    /// Primary author.
    pub author: String,
    /// Price.
    pub price: Option<f64>,
    /// Category.
    pub category: String,
    /// ISBN.
    pub isbn: Option<String>,
    /// Publication date.
    pub publish_date: Option<NaiveDate>,
    /// Publisher.
    pub publisher: Option<String>,
    /// Language code.
    pub language: Option<String>,
    /// Page count.
    pub pages: Option<i64>,
    /// Binding format.
    pub format: Option<String>,
    /// Book description.
    pub description: Option<String>,
    /// Cover image URI.
    pub cover_image: Option<String>,
    /// Average rating (0-5).
    pub rating: Option<f64>,
    /// Review count.
    #[serde(default)]
    pub reviews: i64,
    /// Whether the book is in stock.
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
}

fn default_in_stock() -> bool {
    true
}

impl BookPayload {
    /// Check the payload's semantic rules.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(AppError::Validation("title must not be empty".to_string()));
        }
        if self.author.trim().is_empty() {
            return Err(AppError::Validation("author must not be empty".to_string()));
        }
        if self.category.trim().is_empty() {
            return Err(AppError::Validation(
                "category must not be empty".to_string(),
            ));
        }
        if let Some(price) = self.price
            && price < 0.0
        {
            return Err(AppError::Validation(
                "price must not be negative".to_string(),
            ));
        }
        if let Some(pages) = self.pages
            && pages < 1
        {
            return Err(AppError::Validation("pages must be positive".to_string()));
        }
        if let Some(rating) = self.rating
            && !(0.0..=5.0).contains(&rating)
        {
            return Err(AppError::Validation(
                "rating must be between 0 and 5".to_string(),
            ));
        }
        if self.reviews < 0 {
            return Err(AppError::Validation(
                "reviews must not be negative".to_string(),
            ));
        }

        Ok(())
    }
}

/// One page of catalog results with the filtered-set row count.
#[derive(Debug)]
pub struct BookPage {
    /// Books on the requested page.
    pub books: Vec<Book>,
    /// Total rows matching the filter across all pages.
    pub total: u64,
}
