//! Schema bootstrap
//!
//! Creates the tables at startup if they are missing. Plain
//! `CREATE TABLE IF NOT EXISTS`, no versioned migrations.

use sqlx::PgPool;

/// Create the records, ledger, and balance tables if absent.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Ensuring database schema...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS records (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ledger_entries (
            id BIGSERIAL PRIMARY KEY,
            transaction_id BIGINT NOT NULL UNIQUE,
            account_id BIGINT NOT NULL,
            amount_cents BIGINT NOT NULL,
            entry_type TEXT NOT NULL DEFAULT 'deposit',
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS account_balances (
            account_id BIGINT PRIMARY KEY,
            balance_cents BIGINT NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Schema ready");
    Ok(())
}
