//! rowboat-core: batch cursor reading over a server-side cursor.
//!
//! The interesting piece of rowboat is the cursor drain loop: open a cursor,
//! pull rows in bounded batches until a read comes back empty, then close the
//! cursor and hand the connection back - exactly once, on every exit path.
//! This crate holds that loop and the trait seams it runs against; the
//! Postgres wiring lives in `rowboat-server`.

pub mod cursor;
pub mod error;

pub use cursor::{batch_size_or, read_all, CursorSource, RowCursor, DEFAULT_BATCH_SIZE};
pub use error::{CursorError, Result};
