//! Database layer
//!
//! Database abstraction for the sweetshop backend. Supports:
//! - SQLite (default, for single-binary deployment)
//! - MySQL (for larger deployments)
//!
//! The driver is selected from configuration. A trait-based abstraction
//! (`DatabasePool`) lets the repositories work against either backend
//! without knowing which one is active.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{
    create_pool, create_test_pool, DatabasePool, DynDatabasePool, MysqlDatabase, SqliteDatabase,
};
