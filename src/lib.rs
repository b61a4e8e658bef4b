//! bookstore-rs: A lightweight online bookstore server.
//!
//! This crate provides a JSON REST API over a single relational catalog of
//! books, designed to back a browser storefront and its admin panel.
//!
//! # Features
//!
//! - Catalog listing with substring search, category filter, price sorting
//!   and pagination in a single SQL pass (window count, no second query)
//! - Full CRUD on book records for the admin panel
//! - Boundary validation of book payloads (400 instead of database errors)
//! - Optional static serving of the client UI
//! - TOML configuration and CLI management commands (init, seed)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Catalog query pipeline: filters, sort order, statement assembly.
pub mod catalog;
/// Configuration and CLI.
pub mod config;
/// Database operations.
pub mod db;
/// Error types.
pub mod error;
/// HTTP server.
pub mod server;

#[cfg(test)]
mod tests;

pub use catalog::{BookQuery, SortOrder};
pub use config::{Cli, Command, Config};
pub use db::Database;
pub use error::{AppError, Result};
pub use server::AppState;
