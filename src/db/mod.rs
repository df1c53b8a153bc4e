//! Database module: models, schema and one store per table.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `sqlite.rs`: pool bootstrap and schema init
//! - `accounts.rs` / `calendar.rs` / `inventory.rs` / `registry.rs`: the
//!   per-table stores

pub mod accounts;
pub mod calendar;
pub mod inventory;
pub mod models;
pub mod registry;
pub mod schema;
pub mod sqlite;

pub use schema::SQLITE_INIT;
pub use sqlite::{SqlitePool, connect};
