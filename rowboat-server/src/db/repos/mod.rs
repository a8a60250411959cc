//! Repository implementations for database access
//!
//! Each repository borrows the pool, runs one parameterized statement per
//! operation, and lets the pool take the connection back unconditionally -
//! statement failure included. "Not found" is a distinguished result, not a
//! generic error.

pub mod ledger;
pub mod records;

pub use ledger::{AccountBalance, LedgerEntry, LedgerRepo, NewLedgerEntry};
pub use records::{Record, RecordRepo};

use thiserror::Error;

/// Database error type shared by the repositories.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(sqlx::Error),

    /// A write would duplicate a value under a uniqueness constraint.
    /// Postgres reports these as SQLSTATE 23505; sqlx surfaces that as
    /// `ErrorKind::UniqueViolation`.
    #[error("unique violation: {message}")]
    UniqueViolation { message: String },

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db) if db.is_unique_violation() => Self::UniqueViolation {
                message: db.message().to_owned(),
            },
            other => Self::Sqlx(other),
        }
    }
}
