//! Database layer - pool, cursor backing, repositories, schema bootstrap
//!
//! # Design Principles
//!
//! - One bounded connection pool, constructed in `main` and passed through
//!   state - no process-wide singleton
//! - Rely on DB constraints and classify the violation - no check-then-insert
//! - Every statement is parameterized; the cursor queries are fixed constants

pub mod cursor;
pub mod pool;
pub mod repos;
pub mod schema;

pub use cursor::PgCursorSource;
pub use pool::{create_pool, create_pool_with_options};
pub use repos::*;
pub use schema::ensure_schema;
