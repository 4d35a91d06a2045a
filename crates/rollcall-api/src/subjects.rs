//! Handler for `GET /subjects`.

use std::sync::Arc;

use axum::{Json, extract::State};
use rollcall_core::{store::AttendanceStore, subject::Subject};

use crate::error::ApiError;

/// `GET /subjects` — alphabetical by name.
pub async fn list<S: AttendanceStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Subject>>, ApiError> {
  let subjects = store.list_subjects().await.map_err(ApiError::store)?;
  Ok(Json(subjects))
}
