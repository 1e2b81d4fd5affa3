//! Handlers for `/screenings` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/screenings` | Newest first; optional `?sort=lastName&order=ascending` |
//! | `POST`   | `/screenings` | Body: [`NewScreening`]; returns 201 + number and record |
//! | `GET`    | `/screenings/export` | CSV attachment, same ordering parameters as the list |
//! | `GET`    | `/screenings/:id` | 404 if not found |
//! | `DELETE` | `/screenings/:id` | 204, or 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, PathRejection, QueryRejection},
  },
  http::{StatusCode, header},
  response::IntoResponse,
};
use chrono::Local;
use depistage_core::{
  browse::{Sort, SortKey, SortOrder},
  export,
  record::{NewScreening, ScreeningRecord},
  sequence::create_screening,
  store::RecordStore,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub sort:  Option<SortKey>,
  pub order: Option<SortOrder>,
}

impl ListParams {
  /// `None` keeps the store's newest-first order untouched.
  fn sort(&self) -> Option<Sort> {
    if self.sort.is_none() && self.order.is_none() {
      return None;
    }
    Some(Sort {
      key:   self.sort.unwrap_or_default(),
      order: self.order.unwrap_or_default(),
    })
  }
}

async fn sorted<S: RecordStore>(
  store: &S,
  params: &ListParams,
) -> Result<Vec<ScreeningRecord>, ApiError> {
  let mut records = store.list().await.map_err(ApiError::from_store)?;
  if let Some(sort) = params.sort() {
    sort.apply(&mut records);
  }
  Ok(records)
}

/// `GET /screenings[?sort=<key>][&order=<order>]`
pub async fn list<S: RecordStore>(
  State(store): State<Arc<S>>,
  params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<ScreeningRecord>>, ApiError> {
  let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  Ok(Json(sorted(store.as_ref(), &params).await?))
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Created {
  pub screening_number: String,
  pub screening:        ScreeningRecord,
}

/// `POST /screenings`: body: a [`NewScreening`] in camelCase JSON.
pub async fn create<S: RecordStore>(
  State(store): State<Arc<S>>,
  body: Result<Json<NewScreening>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let Json(input) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

  let record = create_screening(store.as_ref(), input)
    .await
    .map_err(ApiError::from_store)?;
  tracing::info!(
    id = %record.id,
    number = %record.screening_number,
    "screening recorded"
  );

  Ok((
    StatusCode::CREATED,
    Json(Created {
      screening_number: record.screening_number.clone(),
      screening:        record,
    }),
  ))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /screenings/:id`
pub async fn get_one<S: RecordStore>(
  State(store): State<Arc<S>>,
  id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ScreeningRecord>, ApiError> {
  let Path(id) = id.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  let record = store
    .get(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("screening {id} not found")))?;
  Ok(Json(record))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /screenings/:id`
pub async fn delete_one<S: RecordStore>(
  State(store): State<Arc<S>>,
  id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ApiError> {
  let Path(id) = id.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  store.delete(id).await.map_err(ApiError::from_store)?;
  tracing::info!(%id, "screening deleted");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Export ──────────────────────────────────────────────────────────────────

/// `GET /screenings/export`: the full list as a CSV attachment.
pub async fn export<S: RecordStore>(
  State(store): State<Arc<S>>,
  params: Result<Query<ListParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  let records = sorted(store.as_ref(), &params).await?;
  let disposition = format!(
    "attachment; filename=\"{}\"",
    export::file_name(Local::now().date_naive())
  );
  tracing::debug!(count = records.len(), "exporting screenings");

  Ok((
    [
      (header::CONTENT_TYPE, export::CONTENT_TYPE.to_owned()),
      (header::CONTENT_DISPOSITION, disposition),
    ],
    export::to_csv(&records),
  ))
}
