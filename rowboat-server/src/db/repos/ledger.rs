//! Ledger repository
//!
//! Demo service alongside the records CRUD: balance lookup by account,
//! duplicate-safe entry insert (transaction ids are unique), and the query
//! the cursor-streamed history runs against. Amounts are integer cents.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use super::DbError;

/// Query for the cursor-streamed ledger history.
pub const HISTORY_QUERY: &str = "SELECT id, transaction_id, account_id, amount_cents, \
     entry_type, created_at FROM ledger_entries ORDER BY id";

/// Ledger entry row from the database
#[derive(Debug, Clone, FromRow)]
pub struct LedgerEntry {
    pub id: i64,
    pub transaction_id: i64,
    pub account_id: i64,
    pub amount_cents: i64,
    pub entry_type: String,
    pub created_at: DateTime<Utc>,
}

/// Entry to insert; `entry_type` defaults to "deposit" at the HTTP layer.
#[derive(Debug, Clone)]
pub struct NewLedgerEntry {
    pub transaction_id: i64,
    pub account_id: i64,
    pub amount_cents: i64,
    pub entry_type: String,
}

/// Balance row keyed by account id
#[derive(Debug, Clone, FromRow)]
pub struct AccountBalance {
    pub account_id: i64,
    pub balance_cents: i64,
}

/// Ledger repository
pub struct LedgerRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> LedgerRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Look up the balance for one account.
    pub async fn balance(&self, account_id: i64) -> Result<AccountBalance, DbError> {
        sqlx::query_as::<_, AccountBalance>(
            "SELECT account_id, balance_cents FROM account_balances WHERE account_id = $1",
        )
        .bind(account_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound {
            resource: "account",
            id: account_id.to_string(),
        })
    }

    /// Insert a ledger entry. A duplicate transaction id comes back as
    /// [`DbError::UniqueViolation`].
    pub async fn record_entry(&self, entry: &NewLedgerEntry) -> Result<LedgerEntry, DbError> {
        let row = sqlx::query_as::<_, LedgerEntry>(
            "INSERT INTO ledger_entries (transaction_id, account_id, amount_cents, entry_type) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(entry.transaction_id)
        .bind(entry.account_id)
        .bind(entry.amount_cents)
        .bind(&entry.entry_type)
        .fetch_one(self.pool)
        .await?;

        Ok(row)
    }
}
