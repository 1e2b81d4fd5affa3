//! Handler for the `/stats` endpoint.

use std::sync::Arc;

use axum::{Json, extract::State};
use depistage_core::{stats::Statistics, store::RecordStore};

use crate::error::ApiError;

/// `GET /stats`: dashboard figures over every stored record.
pub async fn handler<S: RecordStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Statistics>, ApiError> {
  let records = store.list().await.map_err(ApiError::from_store)?;
  Ok(Json(Statistics::from_records(&records)))
}
