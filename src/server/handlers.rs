//! HTTP request handlers.

use crate::catalog::{self, BookQuery, SortOrder};
use crate::db::{Book, BookPayload};
use crate::error::{AppError, Result};
use crate::server::AppState;
use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::Html,
};
use serde::{Deserialize, Serialize};

/// Unwrap a JSON body, reporting malformed or incomplete payloads as 400.
fn parse_body<T>(body: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    let Json(value) = body.map_err(|e| AppError::Validation(e.body_text()))?;
    Ok(value)
}

// ============================================================================
// STATUS PAGE
// ============================================================================

/// Index page shown when no client UI is configured.
pub async fn index(State(state): State<AppState>) -> Result<Html<String>> {
    let book_count = state.db.count_books()?;
    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <style>
        body {{ font-family: system-ui, sans-serif; max-width: 600px; margin: 2rem auto; padding: 0 1rem; }}
        h1 {{ color: #333; }}
        a {{ color: #0066cc; }}
        .stats {{ background: #f5f5f5; padding: 1rem; border-radius: 8px; margin: 1rem 0; }}
        code {{ background: #e8e8e8; padding: 0.2rem 0.4rem; border-radius: 4px; }}
    </style>
</head>
<body>
    <h1>{title}</h1>
    <div class="stats">
        <p><strong>{book_count}</strong> books in catalog</p>
    </div>
    <h2>API</h2>
    <p>The catalog is served under <code>/api/books</code>.</p>
    <ul>
        <li><a href="/api/books">Browse the catalog (JSON)</a></li>
        <li><code>/api/books?search=...&amp;category=...&amp;sort=price_desc</code></li>
    </ul>
</body>
</html>"#,
        title = state.config.server.title,
        book_count = book_count,
    );

    Ok(Html(html))
}

// ============================================================================
// CATALOG
// ============================================================================

/// Catalog list query parameters.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Page number (1-based).
    #[serde(default = "default_page")]
    page: u32,
    /// Items per page. The storefront also sends this as `itemsPerPage`.
    #[serde(default = "default_limit", alias = "itemsPerPage")]
    limit: u32,
    /// Substring search over title, author and description.
    #[serde(default)]
    search: String,
    /// Category filter ("all" disables it).
    #[serde(default = "default_category")]
    category: String,
    /// Sort order (`price_asc` or `price_desc`).
    #[serde(default = "default_sort")]
    sort: String,
}

fn default_page() -> u32 {
    catalog::DEFAULT_PAGE
}

fn default_limit() -> u32 {
    catalog::DEFAULT_LIMIT
}

fn default_category() -> String {
    catalog::CATEGORY_ALL.to_string()
}

fn default_sort() -> String {
    SortOrder::default().as_param().to_string()
}

impl ListParams {
    /// Normalize into a catalog query, clamping page and limit.
    fn into_query(self, max_page_size: u32) -> BookQuery {
        BookQuery {
            page: self.page.max(1),
            limit: self.limit.clamp(1, max_page_size),
            search: self.search,
            category: self.category,
            sort: SortOrder::parse(&self.sort),
        }
    }
}

/// Filter set echoed back in list responses.
#[derive(Debug, Serialize)]
pub struct FilterEcho {
    /// Search term as applied.
    search: String,
    /// Category as applied.
    category: String,
    /// Canonical sort order as applied.
    sort: &'static str,
}

/// Catalog list response envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookListResponse {
    /// Books on the requested page.
    books: Vec<Book>,
    /// Total books matching the filter.
    total: u64,
    /// Page count under the requested limit.
    total_pages: u64,
    /// The requested page.
    current_page: u32,
    /// Echoed filters.
    filters: FilterEcho,
}

/// List the catalog with search, category, sort and pagination.
pub async fn list_books(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<BookListResponse>> {
    let query = params.into_query(state.config.catalog.max_page_size);
    let page = state.db.list_books(&query)?;

    Ok(Json(BookListResponse {
        total: page.total,
        total_pages: query.total_pages(page.total),
        current_page: query.page,
        books: page.books,
        filters: FilterEcho {
            search: query.search,
            category: query.category,
            sort: query.sort.as_param(),
        },
    }))
}

// ============================================================================
// ADMIN CRUD
// ============================================================================

/// Get a single book by ID.
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Book>> {
    let book = state
        .db
        .get_book(id)?
        .ok_or_else(|| AppError::NotFound(id.to_string()))?;

    Ok(Json(book))
}

/// Create a new book.
pub async fn create_book(
    State(state): State<AppState>,
    body: std::result::Result<Json<BookPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>)> {
    let payload = parse_body(body)?;
    payload.validate()?;
    let book = state.db.create_book(&payload)?;

    Ok((StatusCode::CREATED, Json(book)))
}

/// Replace every field of an existing book.
pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: std::result::Result<Json<BookPayload>, JsonRejection>,
) -> Result<Json<Book>> {
    let payload = parse_body(body)?;
    payload.validate()?;
    let book = state
        .db
        .update_book(id, &payload)?
        .ok_or_else(|| AppError::NotFound(id.to_string()))?;

    Ok(Json(book))
}

/// Delete confirmation message.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    /// Human-readable confirmation.
    message: String,
}

/// Delete a book by ID.
pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>> {
    if !state.db.delete_book(id)? {
        return Err(AppError::NotFound(id.to_string()));
    }

    Ok(Json(DeleteResponse {
        message: "Book deleted successfully".to_string(),
    }))
}
