//! Postgres backing for the rowboat-core cursor traits.
//!
//! A [`PgCursor`] owns the pooled connection it was declared on, so dropping
//! the cursor is the single point where the connection goes back to the pool,
//! on every exit path. Cursors are declared `WITH HOLD` because no enclosing
//! transaction is used; a cursor abandoned after a failed read therefore
//! stays on the session until the pool recycles that connection (see
//! DESIGN.md).
//!
//! Queries handed to [`PgCursorSource::open`] are interpolated into the
//! DECLARE statement verbatim; callers pass fixed internal constants, never
//! user input.

use std::marker::PhantomData;

use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres};
use uuid::Uuid;

use rowboat_core::{CursorSource, RowCursor};

/// Opens server-side cursors on connections borrowed from a [`PgPool`],
/// decoding rows into `T`.
pub struct PgCursorSource<T> {
    pool: PgPool,
    _marker: PhantomData<fn() -> T>,
}

impl<T> PgCursorSource<T> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _marker: PhantomData,
        }
    }
}

/// An open Postgres cursor and the connection it lives on.
pub struct PgCursor<T> {
    conn: PoolConnection<Postgres>,
    name: String,
    _marker: PhantomData<fn() -> T>,
}

#[async_trait]
impl<T> CursorSource for PgCursorSource<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin + 'static,
{
    type Cursor = PgCursor<T>;

    async fn open(&self, query: &str) -> Result<PgCursor<T>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        // Names are per-session; the uuid keeps concurrent drains on a
        // recycled connection from colliding.
        let name = format!("rowboat_cur_{}", Uuid::new_v4().simple());
        sqlx::query(&format!(
            "DECLARE {name} NO SCROLL CURSOR WITH HOLD FOR {query}"
        ))
        .execute(&mut *conn)
        .await?;

        tracing::debug!(cursor = %name, "cursor declared");
        Ok(PgCursor {
            conn,
            name,
            _marker: PhantomData,
        })
    }
}

#[async_trait]
impl<T> RowCursor for PgCursor<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin + 'static,
{
    type Row = T;

    async fn read(&mut self, max_rows: u32) -> Result<Vec<T>, sqlx::Error> {
        sqlx::query_as::<_, T>(&format!("FETCH FORWARD {} FROM {}", max_rows, self.name))
            .fetch_all(&mut *self.conn)
            .await
    }

    async fn close(&mut self) -> Result<(), sqlx::Error> {
        sqlx::query(&format!("CLOSE {}", self.name))
            .execute(&mut *self.conn)
            .await?;
        tracing::debug!(cursor = %self.name, "cursor closed");
        Ok(())
    }
}
