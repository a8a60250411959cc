//! rowboat-server: HTTP record service over PostgreSQL.
//!
//! Exposes plain CRUD on the records table plus listing endpoints that drain
//! a server-side cursor in bounded batches (see `rowboat-core`). A small
//! ledger demo rides along: balance lookup, duplicate-safe entry insert, and
//! a cursor-streamed history.

pub mod db;
pub mod http;

pub use db::{create_pool, ensure_schema};
pub use http::{run_server, ServerConfig};
