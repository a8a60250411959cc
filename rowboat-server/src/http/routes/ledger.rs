//! Ledger demo endpoints
//!
//! Balance lookup, duplicate-safe entry insert, and a cursor-streamed
//! history read. The history default batch size is deliberately tiny so the
//! batching is visible against small tables.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::db::cursor::PgCursorSource;
use crate::db::repos::ledger::HISTORY_QUERY;
use crate::db::repos::{LedgerEntry, LedgerRepo, NewLedgerEntry};
use crate::http::error::ApiError;
use crate::http::server::AppState;
use rowboat_core::{batch_size_or, read_all};

/// Batch size for the history drain when `limit` is absent or invalid.
const DEFAULT_HISTORY_BATCH: u32 = 2;

/// Entry insert request body
#[derive(Deserialize)]
pub struct EntryBody {
    pub transaction_id: i64,
    pub account_id: i64,
    pub amount_cents: i64,
    /// Defaults to "deposit"
    pub entry_type: Option<String>,
}

/// Ledger entry response
#[derive(Serialize)]
pub struct EntryResponse {
    pub id: i64,
    pub transaction_id: i64,
    pub account_id: i64,
    pub amount_cents: i64,
    pub entry_type: String,
    pub created_at: String,
}

impl From<LedgerEntry> for EntryResponse {
    fn from(e: LedgerEntry) -> Self {
        Self {
            id: e.id,
            transaction_id: e.transaction_id,
            account_id: e.account_id,
            amount_cents: e.amount_cents,
            entry_type: e.entry_type,
            created_at: e.created_at.to_rfc3339(),
        }
    }
}

/// Balance response
#[derive(Serialize)]
pub struct BalanceResponse {
    pub account_id: i64,
    pub balance_cents: i64,
}

/// History query parameters; raw string for the same fallback handling as
/// the records listing.
#[derive(Deserialize)]
pub struct HistoryParams {
    pub limit: Option<String>,
}

/// History response
#[derive(Serialize)]
pub struct HistoryResponse {
    pub count: usize,
    pub entries: Vec<EntryResponse>,
}

/// GET /ledger/accounts/{id}/balance
async fn get_balance(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let balance = LedgerRepo::new(&state.pool).balance(id).await?;
    Ok(Json(BalanceResponse {
        account_id: balance.account_id,
        balance_cents: balance.balance_cents,
    }))
}

/// POST /ledger/entries - insert an entry; duplicate transaction ids are 400
async fn create_entry(
    State(state): State<Arc<AppState>>,
    Json(body): Json<EntryBody>,
) -> Result<(StatusCode, Json<EntryResponse>), ApiError> {
    let entry = NewLedgerEntry {
        transaction_id: body.transaction_id,
        account_id: body.account_id,
        amount_cents: body.amount_cents,
        entry_type: body.entry_type.unwrap_or_else(|| "deposit".into()),
    };
    let row = LedgerRepo::new(&state.pool).record_entry(&entry).await?;

    Ok((StatusCode::CREATED, Json(EntryResponse::from(row))))
}

/// GET /ledger/entries?limit=N - drain the full history through a cursor
async fn list_entries(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let batch_size = batch_size_or(params.limit.as_deref(), DEFAULT_HISTORY_BATCH);
    let source = PgCursorSource::<LedgerEntry>::new(state.pool.clone());
    let entries = read_all(&source, HISTORY_QUERY, batch_size).await?;

    Ok(Json(HistoryResponse {
        count: entries.len(),
        entries: entries.into_iter().map(EntryResponse::from).collect(),
    }))
}

/// Ledger routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ledger/accounts/{id}/balance", get(get_balance))
        .route("/ledger/entries", post(create_entry).get(list_entries))
}
