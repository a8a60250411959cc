//! Record endpoints
//!
//! Single-row CRUD plus the cursor-streamed listing. The listing borrows one
//! pooled connection, drains a server-side cursor in `limit`-sized batches,
//! and returns every row with its count.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::db::cursor::PgCursorSource;
use crate::db::repos::records::LIST_QUERY;
use crate::db::repos::{Record, RecordRepo};
use crate::http::error::ApiError;
use crate::http::server::AppState;
use rowboat_core::{batch_size_or, read_all};

/// Batch size for the listing when `limit` is absent or invalid.
const DEFAULT_LIST_BATCH: u32 = 10;

/// Create/update request body
#[derive(Deserialize)]
pub struct RecordBody {
    pub name: String,
    pub email: String,
}

/// Record response
#[derive(Serialize)]
pub struct RecordResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Record> for RecordResponse {
    fn from(r: Record) -> Self {
        Self {
            id: r.id,
            name: r.name,
            email: r.email,
            created_at: r.created_at.to_rfc3339(),
            updated_at: r.updated_at.to_rfc3339(),
        }
    }
}

/// Listing query parameters. `limit` is kept as a raw string so non-numeric
/// input falls back to the default instead of rejecting the request.
#[derive(Deserialize)]
pub struct ListParams {
    pub limit: Option<String>,
}

/// Listing response
#[derive(Serialize)]
pub struct RecordListResponse {
    pub count: usize,
    pub records: Vec<RecordResponse>,
}

/// GET /records?limit=N - drain all records through a server-side cursor
async fn list_records(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<RecordListResponse>, ApiError> {
    let batch_size = batch_size_or(params.limit.as_deref(), DEFAULT_LIST_BATCH);
    let source = PgCursorSource::<Record>::new(state.pool.clone());
    let records = read_all(&source, LIST_QUERY, batch_size).await?;

    Ok(Json(RecordListResponse {
        count: records.len(),
        records: records.into_iter().map(RecordResponse::from).collect(),
    }))
}

/// POST /records - create a record
async fn create_record(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RecordBody>,
) -> Result<(StatusCode, Json<RecordResponse>), ApiError> {
    let record = RecordRepo::new(&state.pool)
        .create(&body.name, &body.email)
        .await?;

    Ok((StatusCode::CREATED, Json(RecordResponse::from(record))))
}

/// GET /records/{id} - fetch a single record
async fn get_record(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<RecordResponse>, ApiError> {
    let record = RecordRepo::new(&state.pool).get(id).await?;
    Ok(Json(RecordResponse::from(record)))
}

/// PUT /records/{id} - update a record
async fn update_record(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<RecordBody>,
) -> Result<Json<RecordResponse>, ApiError> {
    let record = RecordRepo::new(&state.pool)
        .update(id, &body.name, &body.email)
        .await?;
    Ok(Json(RecordResponse::from(record)))
}

/// DELETE /records/{id} - delete a record, returning the deleted row
async fn delete_record(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<RecordResponse>, ApiError> {
    let record = RecordRepo::new(&state.pool).delete(id).await?;
    Ok(Json(RecordResponse::from(record)))
}

/// Record routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/records", get(list_records).post(create_record))
        .route(
            "/records/{id}",
            get(get_record).put(update_record).delete(delete_record),
        )
}
