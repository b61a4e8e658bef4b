use crate::catalog::BookQuery;
use crate::db::*;
use crate::error::{AppError, Result};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use std::path::Path;
use std::sync::Arc;

/// Column index of the window count appended to catalog listing rows.
const TOTAL_COUNT_COLUMN: usize = 16;

/// Database wrapper for thread-safe access.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)
            .map_err(|e| AppError::Internal(format!("Failed to open database: {}", e)))?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.initialize_schema()?;
        Ok(db)
    }

    /// Open in-memory database (for testing).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::Internal(format!("Failed to open database: {}", e)))?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.initialize_schema()?;
        Ok(db)
    }

    /// Initialize database schema.
    fn initialize_schema(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            r#"
            -- Books table
            CREATE TABLE IF NOT EXISTS books (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                author TEXT NOT NULL,
                price REAL,
                category TEXT NOT NULL,
                isbn TEXT,
                publish_date TEXT,
                publisher TEXT,
                language TEXT,
                pages INTEGER,
                format TEXT,
                description TEXT,
                cover_image TEXT,
                rating REAL,
                reviews INTEGER NOT NULL DEFAULT 0,
                in_stock INTEGER NOT NULL DEFAULT 1
            );

            -- Indexes
            CREATE INDEX IF NOT EXISTS idx_books_category ON books(category);
            CREATE INDEX IF NOT EXISTS idx_books_price ON books(price);
            "#,
        )
        .map_err(|e| AppError::Internal(format!("Failed to initialize schema: {}", e)))?;

        Ok(())
    }

    // ========== CATALOG OPERATIONS ==========

    /// Run a catalog listing query.
    ///
    /// Each returned row carries the filtered-set row count in its trailing
    /// window-count column; the count is read once and stripped from the
    /// mapped books. An empty page reports a total of zero.
    pub fn list_books(&self, query: &BookQuery) -> Result<BookPage> {
        let (sql, values) = query.to_sql();

        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| AppError::Internal(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map(params_from_iter(values), |row| {
                Ok((
                    Self::row_to_book(row)?,
                    row.get::<_, i64>(TOTAL_COUNT_COLUMN)?,
                ))
            })
            .map_err(|e| AppError::Internal(format!("Failed to list books: {}", e)))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| AppError::Internal(format!("Failed to collect books: {}", e)))?;

        let total = rows.first().map(|(_, count)| *count as u64).unwrap_or(0);
        let books = rows.into_iter().map(|(book, _)| book).collect();

        Ok(BookPage { books, total })
    }

    /// Count all books in the catalog.
    pub fn count_books(&self) -> Result<u64> {
        let conn = self.conn.lock();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM books", [], |row| row.get(0))
            .map_err(|e| AppError::Internal(format!("Failed to count books: {}", e)))?;
        Ok(count as u64)
    }

    // ========== BOOK OPERATIONS ==========

    /// Get book by ID.
    pub fn get_book(&self, id: i64) -> Result<Option<Book>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, title, author, price, category, isbn, publish_date, publisher,
                    language, pages, format, description, cover_image, rating, reviews, in_stock
             FROM books WHERE id = ?1",
            params![id],
            Self::row_to_book,
        )
        .optional()
        .map_err(|e| AppError::Internal(format!("Failed to get book: {}", e)))
    }

    /// Insert a new book and return the stored record.
    pub fn create_book(&self, payload: &BookPayload) -> Result<Book> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction()
            .map_err(|e| AppError::Internal(format!("Failed to start transaction: {}", e)))?;

        tx.execute(
            "INSERT INTO books (
                title, author, price, category, isbn, publish_date,
                publisher, language, pages, format, description,
                cover_image, rating, reviews, in_stock
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                payload.title,
                payload.author,
                payload.price,
                payload.category,
                payload.isbn,
                payload.publish_date,
                payload.publisher,
                payload.language,
                payload.pages,
                payload.format,
                payload.description,
                payload.cover_image,
                payload.rating,
                payload.reviews,
                payload.in_stock,
            ],
        )
        .map_err(|e| AppError::Internal(format!("Failed to create book: {}", e)))?;

        let id = tx.last_insert_rowid();
        let book = tx
            .query_row(
                "SELECT id, title, author, price, category, isbn, publish_date, publisher,
                        language, pages, format, description, cover_image, rating, reviews, in_stock
                 FROM books WHERE id = ?1",
                params![id],
                Self::row_to_book,
            )
            .map_err(|e| AppError::Internal(format!("Failed to read created book: {}", e)))?;

        tx.commit()
            .map_err(|e| AppError::Internal(format!("Failed to commit: {}", e)))?;

        Ok(book)
    }

    /// Replace every field of a book. Returns `None` when the ID is absent.
    pub fn update_book(&self, id: i64, payload: &BookPayload) -> Result<Option<Book>> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction()
            .map_err(|e| AppError::Internal(format!("Failed to start transaction: {}", e)))?;

        let rows = tx
            .execute(
                "UPDATE books SET
                    title = ?1, author = ?2, price = ?3, category = ?4, isbn = ?5,
                    publish_date = ?6, publisher = ?7, language = ?8, pages = ?9,
                    format = ?10, description = ?11, cover_image = ?12, rating = ?13,
                    reviews = ?14, in_stock = ?15
                 WHERE id = ?16",
                params![
                    payload.title,
                    payload.author,
                    payload.price,
                    payload.category,
                    payload.isbn,
                    payload.publish_date,
                    payload.publisher,
                    payload.language,
                    payload.pages,
                    payload.format,
                    payload.description,
                    payload.cover_image,
                    payload.rating,
                    payload.reviews,
                    payload.in_stock,
                    id,
                ],
            )
            .map_err(|e| AppError::Internal(format!("Failed to update book: {}", e)))?;

        if rows == 0 {
            return Ok(None);
        }

        let book = tx
            .query_row(
                "SELECT id, title, author, price, category, isbn, publish_date, publisher,
                        language, pages, format, description, cover_image, rating, reviews, in_stock
                 FROM books WHERE id = ?1",
                params![id],
                Self::row_to_book,
            )
            .map_err(|e| AppError::Internal(format!("Failed to read updated book: {}", e)))?;

        tx.commit()
            .map_err(|e| AppError::Internal(format!("Failed to commit: {}", e)))?;

        Ok(Some(book))
    }

    /// Delete a book by ID. Returns whether a row was removed.
    pub fn delete_book(&self, id: i64) -> Result<bool> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction()
            .map_err(|e| AppError::Internal(format!("Failed to start transaction: {}", e)))?;

        let rows = tx
            .execute("DELETE FROM books WHERE id = ?1", params![id])
            .map_err(|e| AppError::Internal(format!("Failed to delete book: {}", e)))?;

        tx.commit()
            .map_err(|e| AppError::Internal(format!("Failed to commit: {}", e)))?;

        Ok(rows > 0)
    }

    /// Helper to convert a row to Book.
    fn row_to_book(row: &rusqlite::Row<'_>) -> rusqlite::Result<Book> {
        Ok(Book {
            id: row.get(0)?,
            title: row.get(1)?,
            author: row.get(2)?,
            price: row.get(3)?,
            category: row.get(4)?,
            isbn: row.get(5)?,
            publish_date: row.get(6)?,
            publisher: row.get(7)?,
            language: row.get(8)?,
            pages: row.get(9)?,
            format: row.get(10)?,
            description: row.get(11)?,
            cover_image: row.get(12)?,
            rating: row.get(13)?,
            reviews: row.get(14)?,
            in_stock: row.get(15)?,
        })
    }
}
