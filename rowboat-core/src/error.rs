//! Structured error types for the cursor drain.
//!
//! Uses `thiserror` so callers get composable errors with the underlying
//! driver failure preserved as a source. The HTTP layer maps all three
//! variants to 500-class responses; the distinction matters for diagnostics
//! (a `Close` failure means rows were read and then discarded).

use thiserror::Error;

/// Failure in one phase of a cursor drain.
///
/// Whichever variant surfaces, the borrowed connection has already gone back
/// to the pool by the time the caller sees it.
#[derive(Error, Debug)]
pub enum CursorError {
    /// Borrowing a connection or declaring the cursor failed
    #[error("failed to open cursor: {source}")]
    Open {
        #[source]
        source: sqlx::Error,
    },

    /// A batch fetch failed; remaining batches are abandoned
    #[error("cursor read failed: {source}")]
    Read {
        #[source]
        source: sqlx::Error,
    },

    /// Closing an exhausted cursor failed; rows read so far are discarded
    #[error("cursor close failed: {source}")]
    Close {
        #[source]
        source: sqlx::Error,
    },
}

/// Result type alias for cursor operations
pub type Result<T> = std::result::Result<T, CursorError>;
