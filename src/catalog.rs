//! Catalog query pipeline.
//!
//! Turns user-supplied search/category/sort/pagination parameters into a
//! single parameterized SQL statement: filter predicates, a window count over
//! the filtered set, price ordering with nulls last, then limit/offset.

use rusqlite::types::Value;

/// Category value meaning "no category filter".
pub const CATEGORY_ALL: &str = "all";

/// Default page number.
pub const DEFAULT_PAGE: u32 = 1;

/// Default items per page.
pub const DEFAULT_LIMIT: u32 = 10;

/// Sort order for catalog listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Price ascending, null prices last.
    #[default]
    PriceAsc,
    /// Price descending, null prices last.
    PriceDesc,
}

impl SortOrder {
    /// Parse a sort parameter. Unrecognized values fall back to ascending.
    pub fn parse(value: &str) -> Self {
        match value {
            "price_desc" => SortOrder::PriceDesc,
            _ => SortOrder::PriceAsc,
        }
    }

    /// ORDER BY clause body. Null prices sort last in both directions.
    pub fn order_clause(&self) -> &'static str {
        match self {
            SortOrder::PriceAsc => "price ASC NULLS LAST",
            SortOrder::PriceDesc => "price DESC NULLS LAST",
        }
    }

    /// Canonical parameter form, echoed back in list responses.
    pub fn as_param(&self) -> &'static str {
        match self {
            SortOrder::PriceAsc => "price_asc",
            SortOrder::PriceDesc => "price_desc",
        }
    }
}

/// Builds WHERE predicates with their bound values in lockstep.
///
/// Placeholder indexes are taken from the builder's own value count, so the
/// numbering stays deterministic no matter which optional filters are
/// present. User input only ever reaches the statement as a bound value.
#[derive(Debug, Default)]
pub struct FilterBuilder {
    clauses: Vec<String>,
    values: Vec<Value>,
}

impl FilterBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value and return its 1-based placeholder index.
    fn bind(&mut self, value: impl Into<Value>) -> usize {
        self.values.push(value.into());
        self.values.len()
    }

    /// Add a substring predicate over title, author and description.
    ///
    /// Empty or whitespace-only terms contribute nothing.
    pub fn search(mut self, term: &str) -> Self {
        let term = term.trim();
        if term.is_empty() {
            return self;
        }

        let n = self.bind(format!("%{}%", term));
        self.clauses.push(format!(
            "(LOWER(title) LIKE LOWER(?{n}) \
             OR LOWER(author) LIKE LOWER(?{n}) \
             OR LOWER(description) LIKE LOWER(?{n}))"
        ));
        self
    }

    /// Add a case-insensitive category equality predicate.
    ///
    /// The default category [`CATEGORY_ALL`] contributes nothing.
    pub fn category(mut self, category: &str) -> Self {
        if category == CATEGORY_ALL {
            return self;
        }

        let n = self.bind(category.to_string());
        self.clauses.push(format!("LOWER(category) = LOWER(?{n})"));
        self
    }

    /// Number of predicates emitted so far.
    pub fn clause_count(&self) -> usize {
        self.clauses.len()
    }

    /// Render the WHERE clause, or an empty string without predicates.
    pub fn where_clause(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }
}

/// Normalized catalog query parameters.
#[derive(Debug, Clone)]
pub struct BookQuery {
    /// Page number (1-based).
    pub page: u32,
    /// Items per page.
    pub limit: u32,
    /// Substring search term (empty means no search predicate).
    pub search: String,
    /// Category filter ([`CATEGORY_ALL`] means no category predicate).
    pub category: String,
    /// Price sort order.
    pub sort: SortOrder,
}

impl Default for BookQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            search: String::new(),
            category: CATEGORY_ALL.to_string(),
            sort: SortOrder::default(),
        }
    }
}

impl BookQuery {
    /// Row offset of the requested page.
    pub fn offset(&self) -> u32 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    /// Page count for a total row count under this query's limit.
    pub fn total_pages(&self, total: u64) -> u64 {
        if self.limit == 0 {
            0
        } else {
            total.div_ceil(u64::from(self.limit))
        }
    }

    /// Assemble the catalog statement and its bound values.
    ///
    /// The filtered set is materialized once; `COUNT(*) OVER ()` carries the
    /// full filtered row count on every returned row, so pagination metadata
    /// is correct even on the last page. Limit and offset bind through the
    /// same builder to keep placeholder numbering sequential.
    pub fn to_sql(&self) -> (String, Vec<Value>) {
        let mut filter = FilterBuilder::new()
            .search(&self.search)
            .category(&self.category);

        let limit_n = filter.bind(i64::from(self.limit));
        let offset_n = filter.bind(i64::from(self.offset()));

        let sql = format!(
            "WITH filtered_books AS (SELECT * FROM books{})
             SELECT *, COUNT(*) OVER () AS total_count
             FROM filtered_books
             ORDER BY {}
             LIMIT ?{} OFFSET ?{}",
            filter.where_clause(),
            self.sort.order_clause(),
            limit_n,
            offset_n,
        );

        (sql, filter.values)
    }
}
