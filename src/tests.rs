use crate::catalog::{BookQuery, FilterBuilder, SortOrder};
use crate::config::Config;
use crate::db::{BookPayload, Database};
use chrono::NaiveDate;

fn test_db() -> Database {
    Database::open_memory().unwrap()
}

fn book(title: &str, author: &str, price: Option<f64>, category: &str) -> BookPayload {
    BookPayload {
        title: title.to_string(),
        author: author.to_string(),
        price,
        category: category.to_string(),
        isbn: None,
        publish_date: None,
        publisher: None,
        language: None,
        pages: None,
        format: None,
        description: None,
        cover_image: None,
        rating: None,
        reviews: 0,
        in_stock: true,
    }
}

/// Five books across three categories, one without a price.
fn seed_catalog(db: &Database) {
    let mut dune = book("Dune", "Frank Herbert", Some(9.99), "Science Fiction");
    dune.description = Some("Spice, sand and prophecy".to_string());
    db.create_book(&dune).unwrap();

    db.create_book(&book("Hyperion", "Dan Simmons", Some(12.50), "Science Fiction"))
        .unwrap();
    db.create_book(&book("Emma", "Jane Austen", Some(7.25), "Romance"))
        .unwrap();
    db.create_book(&book("Persuasion", "Jane Austen", None, "Romance"))
        .unwrap();
    db.create_book(&book("SQL for Smarties", "Joe Celko", Some(45.00), "Programming"))
        .unwrap();
}

// ========== BOOK CRUD ==========

#[test]
fn db_create_and_get_book() {
    let db = test_db();
    let payload = BookPayload {
        title: "The Rust Programming Language".to_string(),
        author: "Steve Klabnik".to_string(),
        price: Some(39.95),
        category: "Programming".to_string(),
        isbn: Some("978-1718503106".to_string()),
        publish_date: NaiveDate::from_ymd_opt(2023, 2, 28),
        publisher: Some("No Starch Press".to_string()),
        language: Some("en".to_string()),
        pages: Some(560),
        format: Some("paperback".to_string()),
        description: Some("The official book on the Rust language".to_string()),
        cover_image: Some("https://covers.example.com/trpl.jpg".to_string()),
        rating: Some(4.8),
        reviews: 1024,
        in_stock: true,
    };

    let created = db.create_book(&payload).unwrap();
    assert!(created.id >= 1);

    let found = db.get_book(created.id).unwrap().unwrap();
    assert_eq!(found.id, created.id);
    assert_eq!(found.title, payload.title);
    assert_eq!(found.author, payload.author);
    assert_eq!(found.price, payload.price);
    assert_eq!(found.category, payload.category);
    assert_eq!(found.isbn, payload.isbn);
    assert_eq!(found.publish_date, payload.publish_date);
    assert_eq!(found.publisher, payload.publisher);
    assert_eq!(found.language, payload.language);
    assert_eq!(found.pages, payload.pages);
    assert_eq!(found.format, payload.format);
    assert_eq!(found.description, payload.description);
    assert_eq!(found.cover_image, payload.cover_image);
    assert_eq!(found.rating, payload.rating);
    assert_eq!(found.reviews, payload.reviews);
    assert_eq!(found.in_stock, payload.in_stock);
}

#[test]
fn db_ids_are_server_assigned_and_distinct() {
    let db = test_db();

    let first = db
        .create_book(&book("First", "A", Some(1.0), "Test"))
        .unwrap();
    let second = db
        .create_book(&book("Second", "B", Some(2.0), "Test"))
        .unwrap();

    assert_ne!(first.id, second.id);
    assert!(second.id > first.id);
}

#[test]
fn db_get_missing_book() {
    let db = test_db();
    assert!(db.get_book(42).unwrap().is_none());
}

#[test]
fn db_update_replaces_every_field() {
    let db = test_db();
    let created = db
        .create_book(&book("Draft", "Nobody", Some(5.0), "Misc"))
        .unwrap();

    let mut replacement = book("Emma", "Jane Austen", Some(7.25), "Romance");
    replacement.isbn = Some("978-0141439587".to_string());
    replacement.pages = Some(474);
    replacement.rating = Some(4.2);
    replacement.reviews = 310;
    replacement.in_stock = false;

    let updated = db.update_book(created.id, &replacement).unwrap().unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.title, "Emma");
    assert_eq!(updated.author, "Jane Austen");
    assert_eq!(updated.isbn, Some("978-0141439587".to_string()));
    assert_eq!(updated.pages, Some(474));
    assert_eq!(updated.reviews, 310);
    assert!(!updated.in_stock);

    // No leftover fields from the old record
    let found = db.get_book(created.id).unwrap().unwrap();
    assert_eq!(found.category, "Romance");
    assert_eq!(found.publisher, None);
}

#[test]
fn db_update_missing_returns_none() {
    let db = test_db();
    let result = db
        .update_book(999, &book("Ghost", "Nobody", None, "Misc"))
        .unwrap();
    assert!(result.is_none());
}

#[test]
fn db_delete_then_get_is_absent() {
    let db = test_db();
    let created = db
        .create_book(&book("To Delete", "A", Some(3.0), "Test"))
        .unwrap();

    assert!(db.delete_book(created.id).unwrap());
    assert!(db.get_book(created.id).unwrap().is_none());

    // Deleting again reports absence
    assert!(!db.delete_book(created.id).unwrap());
}

// ========== CATALOG LISTING ==========

#[test]
fn list_empty_catalog() {
    let db = test_db();
    let query = BookQuery::default();

    let page = db.list_books(&query).unwrap();
    assert!(page.books.is_empty());
    assert_eq!(page.total, 0);
    assert_eq!(query.total_pages(page.total), 0);
}

#[test]
fn list_defaults_return_everything() {
    let db = test_db();
    seed_catalog(&db);

    let query = BookQuery::default();
    let page = db.list_books(&query).unwrap();

    assert_eq!(page.books.len(), 5);
    assert_eq!(page.total, 5);
    assert_eq!(query.total_pages(page.total), 1);
}

#[test]
fn list_pagination_invariants() {
    let db = test_db();
    seed_catalog(&db);

    for limit in [1u32, 2, 3, 10] {
        for page_no in 1u32..=4 {
            let query = BookQuery {
                page: page_no,
                limit,
                ..BookQuery::default()
            };
            let page = db.list_books(&query).unwrap();

            assert!(page.books.len() <= limit as usize);
            if !page.books.is_empty() {
                assert_eq!(page.total, 5);
                assert_eq!(query.total_pages(page.total), 5u64.div_ceil(limit as u64));
            }
        }
    }
}

#[test]
fn list_pages_do_not_overlap() {
    let db = test_db();
    seed_catalog(&db);

    let first = db
        .list_books(&BookQuery {
            page: 1,
            limit: 2,
            ..BookQuery::default()
        })
        .unwrap();
    let second = db
        .list_books(&BookQuery {
            page: 2,
            limit: 2,
            ..BookQuery::default()
        })
        .unwrap();

    assert_eq!(first.books.len(), 2);
    assert_eq!(second.books.len(), 2);
    for book in &second.books {
        assert!(first.books.iter().all(|b| b.id != book.id));
    }
}

#[test]
fn list_page_beyond_end_is_empty_not_error() {
    let db = test_db();
    seed_catalog(&db);

    let page = db
        .list_books(&BookQuery {
            page: 99,
            ..BookQuery::default()
        })
        .unwrap();

    assert!(page.books.is_empty());
}

#[test]
fn list_no_filters_equals_default_filters() {
    let db = test_db();
    seed_catalog(&db);

    let implicit = db.list_books(&BookQuery::default()).unwrap();
    let explicit = db
        .list_books(&BookQuery {
            search: String::new(),
            category: "all".to_string(),
            ..BookQuery::default()
        })
        .unwrap();

    let implicit_ids: Vec<i64> = implicit.books.iter().map(|b| b.id).collect();
    let explicit_ids: Vec<i64> = explicit.books.iter().map(|b| b.id).collect();
    assert_eq!(implicit_ids, explicit_ids);
    assert_eq!(implicit.total, explicit.total);
}

#[test]
fn list_search_is_case_insensitive() {
    let db = test_db();
    seed_catalog(&db);

    let page = db
        .list_books(&BookQuery {
            search: "dUnE".to_string(),
            ..BookQuery::default()
        })
        .unwrap();

    assert_eq!(page.total, 1);
    assert_eq!(page.books[0].title, "Dune");
}

#[test]
fn list_search_matches_author_and_description() {
    let db = test_db();
    seed_catalog(&db);

    let by_author = db
        .list_books(&BookQuery {
            search: "austen".to_string(),
            ..BookQuery::default()
        })
        .unwrap();
    assert_eq!(by_author.total, 2);

    let by_description = db
        .list_books(&BookQuery {
            search: "spice".to_string(),
            ..BookQuery::default()
        })
        .unwrap();
    assert_eq!(by_description.total, 1);
    assert_eq!(by_description.books[0].title, "Dune");
}

#[test]
fn list_search_without_match_is_empty_success() {
    let db = test_db();
    seed_catalog(&db);

    let query = BookQuery {
        search: "zzz-no-such-book".to_string(),
        ..BookQuery::default()
    };
    let page = db.list_books(&query).unwrap();

    assert!(page.books.is_empty());
    assert_eq!(page.total, 0);
    assert_eq!(query.total_pages(page.total), 0);
}

#[test]
fn list_whitespace_search_is_ignored() {
    let db = test_db();
    seed_catalog(&db);

    let page = db
        .list_books(&BookQuery {
            search: "   ".to_string(),
            ..BookQuery::default()
        })
        .unwrap();

    assert_eq!(page.total, 5);
}

#[test]
fn list_category_is_case_insensitive() {
    let db = test_db();
    seed_catalog(&db);

    let page = db
        .list_books(&BookQuery {
            category: "romance".to_string(),
            ..BookQuery::default()
        })
        .unwrap();

    assert_eq!(page.total, 2);
    for book in &page.books {
        assert_eq!(book.category, "Romance");
    }
}

#[test]
fn list_search_and_category_combine() {
    let db = test_db();
    seed_catalog(&db);

    let page = db
        .list_books(&BookQuery {
            search: "austen".to_string(),
            category: "Science Fiction".to_string(),
            ..BookQuery::default()
        })
        .unwrap();

    assert_eq!(page.total, 0);
}

#[test]
fn list_window_count_covers_all_pages() {
    let db = test_db();
    seed_catalog(&db);

    // Last page still reports the full filtered total
    let query = BookQuery {
        page: 3,
        limit: 2,
        ..BookQuery::default()
    };
    let page = db.list_books(&query).unwrap();

    assert_eq!(page.books.len(), 1);
    assert_eq!(page.total, 5);
    assert_eq!(query.total_pages(page.total), 3);
}

#[test]
fn list_price_asc_sorts_nulls_last() {
    let db = test_db();
    seed_catalog(&db);

    let page = db
        .list_books(&BookQuery {
            sort: SortOrder::PriceAsc,
            ..BookQuery::default()
        })
        .unwrap();

    let prices: Vec<Option<f64>> = page.books.iter().map(|b| b.price).collect();
    assert_eq!(
        prices,
        vec![
            Some(7.25),
            Some(9.99),
            Some(12.50),
            Some(45.00),
            None
        ]
    );
}

#[test]
fn list_price_desc_reverses_price_asc() {
    let db = test_db();
    seed_catalog(&db);

    let asc = db
        .list_books(&BookQuery {
            sort: SortOrder::PriceAsc,
            ..BookQuery::default()
        })
        .unwrap()
        .books;
    let desc = db
        .list_books(&BookQuery {
            sort: SortOrder::PriceDesc,
            ..BookQuery::default()
        })
        .unwrap()
        .books;

    // Null prices sort last in both directions
    assert!(asc.last().unwrap().price.is_none());
    assert!(desc.last().unwrap().price.is_none());

    let asc_ids: Vec<i64> = asc
        .iter()
        .filter(|b| b.price.is_some())
        .map(|b| b.id)
        .collect();
    let mut desc_ids: Vec<i64> = desc
        .iter()
        .filter(|b| b.price.is_some())
        .map(|b| b.id)
        .collect();
    desc_ids.reverse();

    assert_eq!(asc_ids, desc_ids);
}

// ========== QUERY PIPELINE ==========

#[test]
fn filter_builder_skips_default_inputs() {
    let builder = FilterBuilder::new().search("  ").category("all");

    assert_eq!(builder.clause_count(), 0);
    assert_eq!(builder.where_clause(), "");
}

#[test]
fn filter_builder_numbers_placeholders_from_its_own_state() {
    let with_both = FilterBuilder::new().search("dune").category("Fiction");
    let clause = with_both.where_clause();
    assert_eq!(with_both.clause_count(), 2);
    assert!(clause.contains("?1"));
    assert!(clause.contains("LOWER(category) = LOWER(?2)"));

    // Without a search term the category predicate takes the first slot
    let category_only = FilterBuilder::new().search("").category("Fiction");
    assert!(
        category_only
            .where_clause()
            .contains("LOWER(category) = LOWER(?1)")
    );
}

#[test]
fn book_query_binds_limit_and_offset_after_filters() {
    let filtered = BookQuery {
        search: "dune".to_string(),
        category: "Fiction".to_string(),
        ..BookQuery::default()
    };
    let (sql, values) = filtered.to_sql();
    assert!(sql.contains("LIMIT ?3 OFFSET ?4"));
    assert_eq!(values.len(), 4);

    let unfiltered = BookQuery::default();
    let (sql, values) = unfiltered.to_sql();
    assert!(sql.contains("LIMIT ?1 OFFSET ?2"));
    assert_eq!(values.len(), 2);
    assert!(!sql.contains("WHERE"));
}

#[test]
fn book_query_statement_shape() {
    let (sql, _) = BookQuery::default().to_sql();

    assert!(sql.contains("WITH filtered_books AS"));
    assert!(sql.contains("COUNT(*) OVER ()"));
    assert!(sql.contains("ORDER BY price ASC NULLS LAST"));
}

#[test]
fn book_query_offset() {
    let query = BookQuery {
        page: 3,
        limit: 10,
        ..BookQuery::default()
    };
    assert_eq!(query.offset(), 20);

    let first = BookQuery::default();
    assert_eq!(first.offset(), 0);

    // Page zero saturates instead of underflowing
    let zero = BookQuery {
        page: 0,
        ..BookQuery::default()
    };
    assert_eq!(zero.offset(), 0);
}

#[test]
fn book_query_total_pages() {
    let query = BookQuery {
        limit: 2,
        ..BookQuery::default()
    };
    assert_eq!(query.total_pages(0), 0);
    assert_eq!(query.total_pages(4), 2);
    assert_eq!(query.total_pages(5), 3);
}

#[test]
fn sort_order_parse_and_fallback() {
    assert_eq!(SortOrder::parse("price_asc"), SortOrder::PriceAsc);
    assert_eq!(SortOrder::parse("price_desc"), SortOrder::PriceDesc);
    assert_eq!(SortOrder::parse("title_asc"), SortOrder::PriceAsc);
    assert_eq!(SortOrder::parse(""), SortOrder::PriceAsc);

    assert_eq!(SortOrder::PriceAsc.as_param(), "price_asc");
    assert_eq!(SortOrder::PriceDesc.as_param(), "price_desc");
}

// ========== PAYLOAD VALIDATION ==========

#[test]
fn payload_valid_passes() {
    assert!(book("Dune", "Frank Herbert", Some(9.99), "Science Fiction")
        .validate()
        .is_ok());
}

#[test]
fn payload_empty_title_rejected() {
    assert!(book("  ", "Author", None, "Test").validate().is_err());
}

#[test]
fn payload_empty_author_rejected() {
    assert!(book("Title", "", None, "Test").validate().is_err());
}

#[test]
fn payload_negative_price_rejected() {
    assert!(book("Title", "Author", Some(-0.01), "Test")
        .validate()
        .is_err());
}

#[test]
fn payload_rating_out_of_range_rejected() {
    let mut payload = book("Title", "Author", None, "Test");
    payload.rating = Some(5.5);
    assert!(payload.validate().is_err());

    payload.rating = Some(-1.0);
    assert!(payload.validate().is_err());

    payload.rating = Some(5.0);
    assert!(payload.validate().is_ok());
}

#[test]
fn payload_non_positive_pages_rejected() {
    let mut payload = book("Title", "Author", None, "Test");
    payload.pages = Some(0);
    assert!(payload.validate().is_err());
}

#[test]
fn payload_negative_reviews_rejected() {
    let mut payload = book("Title", "Author", None, "Test");
    payload.reviews = -1;
    assert!(payload.validate().is_err());
}

// ========== CONFIG ==========

#[test]
fn config_parse_toml() {
    let toml = r#"
[server]
bind = "127.0.0.1:9090"
title = "Test Store"
static_dir = "/srv/store/client"

[database]
path = "/tmp/test.db"

[catalog]
max_page_size = 50
"#;
    let config: Config = toml::from_str(toml).unwrap();
    assert_eq!(config.server.bind.port(), 9090);
    assert_eq!(config.server.title, "Test Store");
    assert_eq!(
        config.server.static_dir,
        Some(std::path::PathBuf::from("/srv/store/client"))
    );
    assert_eq!(config.catalog.max_page_size, 50);
}

#[test]
fn config_default_values() {
    let config = Config::default();
    assert_eq!(config.server.bind.port(), 8080);
    assert!(config.server.static_dir.is_none());
    assert_eq!(config.catalog.max_page_size, 100);
}

// ========== PERSISTENCE ==========

#[test]
fn db_open_creates_parents_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("bookstore.db");

    let db = Database::open(&path).unwrap();
    db.create_book(&book("Persisted", "Author", Some(1.0), "Test"))
        .unwrap();
    drop(db);

    let reopened = Database::open(&path).unwrap();
    assert_eq!(reopened.count_books().unwrap(), 1);
}
