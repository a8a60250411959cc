//! Batch cursor drain loop.
//!
//! A server-side cursor is opened for one query, read in batches of at most
//! `batch_size` rows until a read comes back empty, then closed before the
//! connection returns to the pool. The drain is a plain iterative loop;
//! batch N+1 is never requested before batch N completes.
//!
//! The traits here are the seam between the drain logic and the database
//! driver. Production code uses the Postgres implementation in
//! `rowboat-server`; tests substitute scripted fakes.

use async_trait::async_trait;

use crate::error::{CursorError, Result};

/// Fallback batch size when a caller passes zero.
pub const DEFAULT_BATCH_SIZE: u32 = 10;

/// An open server-side cursor bound to one query.
///
/// Implementations own the borrowed connection; dropping the cursor is the
/// one place the connection goes back to the pool.
#[async_trait]
pub trait RowCursor: Send {
    type Row: Send;

    /// Fetch the next batch of at most `max_rows` rows.
    ///
    /// An empty batch signals exhaustion. Must not be called again after it
    /// returns an error or after [`close`](RowCursor::close).
    async fn read(&mut self, max_rows: u32) -> std::result::Result<Vec<Self::Row>, sqlx::Error>;

    /// Close the cursor. Called at most once, before the cursor is dropped.
    async fn close(&mut self) -> std::result::Result<(), sqlx::Error>;
}

/// Opens cursors. Implemented over a connection pool in production and by
/// scripted fakes in tests.
#[async_trait]
pub trait CursorSource: Send + Sync {
    type Cursor: RowCursor;

    /// Borrow a connection and declare a cursor for `query`.
    async fn open(&self, query: &str) -> std::result::Result<Self::Cursor, sqlx::Error>;
}

/// Resolve a batch size from a raw query-string value.
///
/// Absent, non-numeric, and non-positive input all fall back to `default`
/// rather than erroring.
pub fn batch_size_or(raw: Option<&str>, default: u32) -> u32 {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(default)
}

/// Drain a cursor to exhaustion, accumulating every row in order.
///
/// Exactly one connection is borrowed and released per call. On success the
/// cursor sees `ceil(total / batch_size)` non-empty reads, one empty read,
/// and one close, in that order, before the connection is released.
///
/// Failure paths:
/// - open failure: [`CursorError::Open`], nothing was read.
/// - read failure: [`CursorError::Read`]; remaining batches are abandoned and
///   the cursor is NOT closed - the connection goes back to the pool with the
///   cursor still declared on the session (deliberate; see DESIGN.md before
///   adding a close attempt here).
/// - close failure: [`CursorError::Close`]; the rows read so far are
///   discarded, not returned.
pub async fn read_all<S>(
    source: &S,
    query: &str,
    batch_size: u32,
) -> Result<Vec<<S::Cursor as RowCursor>::Row>>
where
    S: CursorSource,
{
    let batch_size = if batch_size == 0 {
        DEFAULT_BATCH_SIZE
    } else {
        batch_size
    };

    let mut cursor = source
        .open(query)
        .await
        .map_err(|source| CursorError::Open { source })?;

    let mut rows = Vec::new();
    loop {
        // On error the cursor drops here unclosed; dropping releases the
        // connection.
        let batch = cursor
            .read(batch_size)
            .await
            .map_err(|source| CursorError::Read { source })?;
        if batch.is_empty() {
            break;
        }
        rows.extend(batch);
        tracing::debug!(total = rows.len(), "cursor batch read");
    }

    // Close before the connection is handed back. A close failure wins over
    // the successful reads: the accumulated rows are dropped with `rows`.
    cursor
        .close()
        .await
        .map_err(|source| CursorError::Close { source })?;

    tracing::debug!(rows = rows.len(), "cursor drained");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Shared observation point that outlives the consumed cursor.
    #[derive(Default)]
    struct Probe {
        read_sizes: Mutex<Vec<usize>>,
        closes: AtomicUsize,
        releases: AtomicUsize,
    }

    impl Probe {
        fn read_sizes(&self) -> Vec<usize> {
            self.read_sizes.lock().unwrap().clone()
        }

        fn closes(&self) -> usize {
            self.closes.load(Ordering::SeqCst)
        }

        fn releases(&self) -> usize {
            self.releases.load(Ordering::SeqCst)
        }
    }

    struct FakeCursor {
        rows: Vec<i64>,
        pos: usize,
        reads_done: usize,
        fail_on_read: Option<usize>,
        fail_close: bool,
        probe: Arc<Probe>,
    }

    #[async_trait]
    impl RowCursor for FakeCursor {
        type Row = i64;

        async fn read(&mut self, max_rows: u32) -> std::result::Result<Vec<i64>, sqlx::Error> {
            let call = self.reads_done;
            self.reads_done += 1;
            if self.fail_on_read == Some(call) {
                return Err(sqlx::Error::Protocol("fetch failed".into()));
            }
            let end = (self.pos + max_rows as usize).min(self.rows.len());
            let batch = self.rows[self.pos..end].to_vec();
            self.pos = end;
            self.probe.read_sizes.lock().unwrap().push(batch.len());
            Ok(batch)
        }

        async fn close(&mut self) -> std::result::Result<(), sqlx::Error> {
            self.probe.closes.fetch_add(1, Ordering::SeqCst);
            if self.fail_close {
                return Err(sqlx::Error::Protocol("close failed".into()));
            }
            Ok(())
        }
    }

    // Dropping the cursor stands in for releasing the pooled connection.
    impl Drop for FakeCursor {
        fn drop(&mut self) {
            self.probe.releases.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct FakeSource {
        rows: Vec<i64>,
        fail_open: bool,
        fail_on_read: Option<usize>,
        fail_close: bool,
        probe: Arc<Probe>,
    }

    impl FakeSource {
        fn with_rows(rows: Vec<i64>) -> Self {
            Self {
                rows,
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl CursorSource for FakeSource {
        type Cursor = FakeCursor;

        async fn open(&self, _query: &str) -> std::result::Result<FakeCursor, sqlx::Error> {
            if self.fail_open {
                return Err(sqlx::Error::Protocol("open failed".into()));
            }
            Ok(FakeCursor {
                rows: self.rows.clone(),
                pos: 0,
                reads_done: 0,
                fail_on_read: self.fail_on_read,
                fail_close: self.fail_close,
                probe: Arc::clone(&self.probe),
            })
        }
    }

    #[tokio::test]
    async fn five_rows_batch_two_drains_in_order() {
        let source = FakeSource::with_rows(vec![1, 2, 3, 4, 5]);

        let rows = read_all(&source, "SELECT 1", 2).await.unwrap();

        assert_eq!(rows, vec![1, 2, 3, 4, 5]);
        assert_eq!(source.probe.read_sizes(), vec![2, 2, 1, 0]);
        assert_eq!(source.probe.closes(), 1);
        assert_eq!(source.probe.releases(), 1);
    }

    #[tokio::test]
    async fn read_count_is_ceiling_plus_one() {
        let source = FakeSource::with_rows((1..=7).collect());

        let rows = read_all(&source, "SELECT 1", 3).await.unwrap();

        assert_eq!(rows.len(), 7);
        // ceil(7/3) = 3 non-empty reads, then the empty read that signals
        // exhaustion.
        assert_eq!(source.probe.read_sizes(), vec![3, 3, 1, 0]);
    }

    #[tokio::test]
    async fn empty_result_is_one_read_and_no_error() {
        let source = FakeSource::with_rows(vec![]);

        let rows = read_all(&source, "SELECT 1", 4).await.unwrap();

        assert!(rows.is_empty());
        assert_eq!(source.probe.read_sizes(), vec![0]);
        assert_eq!(source.probe.closes(), 1);
        assert_eq!(source.probe.releases(), 1);
    }

    #[tokio::test]
    async fn zero_batch_size_falls_back_to_default() {
        let source = FakeSource::with_rows((1..=25).collect());

        let rows = read_all(&source, "SELECT 1", 0).await.unwrap();

        assert_eq!(rows.len(), 25);
        assert_eq!(source.probe.read_sizes(), vec![10, 10, 5, 0]);
    }

    #[tokio::test]
    async fn read_failure_skips_close_but_releases() {
        let source = FakeSource {
            rows: (1..=5).collect(),
            fail_on_read: Some(1),
            ..FakeSource::default()
        };

        let err = read_all(&source, "SELECT 1", 2).await.unwrap_err();

        assert!(matches!(err, CursorError::Read { .. }));
        assert_eq!(source.probe.read_sizes(), vec![2]);
        assert_eq!(source.probe.closes(), 0);
        assert_eq!(source.probe.releases(), 1);
    }

    #[tokio::test]
    async fn open_failure_touches_nothing() {
        let source = FakeSource {
            fail_open: true,
            ..FakeSource::default()
        };

        let err = read_all(&source, "SELECT 1", 2).await.unwrap_err();

        assert!(matches!(err, CursorError::Open { .. }));
        assert_eq!(source.probe.closes(), 0);
        assert_eq!(source.probe.releases(), 0);
    }

    #[tokio::test]
    async fn close_failure_discards_accumulated_rows() {
        let source = FakeSource {
            rows: (1..=5).collect(),
            fail_close: true,
            ..FakeSource::default()
        };

        let err = read_all(&source, "SELECT 1", 2).await.unwrap_err();

        // All rows were read, then the close error masked them.
        assert!(matches!(err, CursorError::Close { .. }));
        assert_eq!(source.probe.read_sizes(), vec![2, 2, 1, 0]);
        assert_eq!(source.probe.closes(), 1);
        assert_eq!(source.probe.releases(), 1);
    }

    #[test]
    fn batch_size_parsing() {
        assert_eq!(batch_size_or(Some("5"), 10), 5);
        assert_eq!(batch_size_or(Some(" 7 "), 10), 7);
        assert_eq!(batch_size_or(None, 10), 10);
        assert_eq!(batch_size_or(Some("abc"), 10), 10);
        assert_eq!(batch_size_or(Some("-3"), 10), 10);
        assert_eq!(batch_size_or(Some("0"), 2), 2);
        assert_eq!(batch_size_or(Some(""), 2), 2);
    }
}
