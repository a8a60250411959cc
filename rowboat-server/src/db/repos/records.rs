//! Record repository
//!
//! Thin CRUD over the records table: one parameterized statement per
//! operation, `RETURNING *` so the caller gets the affected row back without
//! a second query.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use super::DbError;

/// Query the cursor-streamed listing runs against. `ORDER BY id` pins the
/// row order the drain must preserve across batches.
pub const LIST_QUERY: &str =
    "SELECT id, name, email, created_at, updated_at FROM records ORDER BY id";

/// Record row from the database
#[derive(Debug, Clone, FromRow)]
pub struct Record {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Record repository
pub struct RecordRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> RecordRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a record. A duplicate email comes back as
    /// [`DbError::UniqueViolation`] and no row is created.
    pub async fn create(&self, name: &str, email: &str) -> Result<Record, DbError> {
        let record = sqlx::query_as::<_, Record>(
            "INSERT INTO records (name, email) VALUES ($1, $2) RETURNING *",
        )
        .bind(name)
        .bind(email)
        .fetch_one(self.pool)
        .await?;

        Ok(record)
    }

    /// Update a record by id, bumping `updated_at`.
    pub async fn update(&self, id: i64, name: &str, email: &str) -> Result<Record, DbError> {
        sqlx::query_as::<_, Record>(
            "UPDATE records SET name = $1, email = $2, updated_at = NOW() \
             WHERE id = $3 RETURNING *",
        )
        .bind(name)
        .bind(email)
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound {
            resource: "record",
            id: id.to_string(),
        })
    }

    /// Delete a record by id, returning the deleted row.
    pub async fn delete(&self, id: i64) -> Result<Record, DbError> {
        sqlx::query_as::<_, Record>("DELETE FROM records WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::NotFound {
                resource: "record",
                id: id.to_string(),
            })
    }

    /// Fetch a single record by id.
    pub async fn get(&self, id: i64) -> Result<Record, DbError> {
        sqlx::query_as::<_, Record>(
            "SELECT id, name, email, created_at, updated_at FROM records WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound {
            resource: "record",
            id: id.to_string(),
        })
    }
}
