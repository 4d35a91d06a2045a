//! Handlers for `/students` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/students` | Optional `?order=roll_number\|name` |
//! | `POST` | `/students` | Body: [`NewStudent`]; 201, 400 on validation, 409 on duplicate |
//! | `GET`  | `/students/:id` | 404 if not found |
//! | `GET`  | `/students/:id/history` | Optional `?subject_id`; stats plus records |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use rollcall_core::{
  aggregate::{HistoryStats, SubjectHistory, history_stats, subject_history},
  attendance::{AttendanceFilter, AttendanceRow},
  store::AttendanceStore,
  student::{NewStudent, Student, StudentOrder},
  workflow,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  #[serde(default)]
  pub order: StudentOrder,
}

/// `GET /students[?order=roll_number|name]`
pub async fn list<S: AttendanceStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Student>>, ApiError> {
  let students = store.list_students(params.order).await.map_err(ApiError::store)?;
  Ok(Json(students))
}

// ─── Register ─────────────────────────────────────────────────────────────────

/// `POST /students` — returns 201 + the stored [`Student`]. Malformed JSON is
/// a 400 like any other validation failure.
pub async fn register<S: AttendanceStore>(
  State(store): State<Arc<S>>,
  body: Result<Json<NewStudent>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let Json(body) = body?;
  let student = workflow::register_student(store.as_ref(), body).await?;
  Ok((StatusCode::CREATED, Json(student)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

async fn fetch<S: AttendanceStore>(store: &S, id: Uuid) -> Result<Student, ApiError> {
  store
    .get_student(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("student {id} not found")))
}

/// `GET /students/:id`
pub async fn get_one<S: AttendanceStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Student>, ApiError> {
  Ok(Json(fetch(store.as_ref(), id).await?))
}

// ─── History ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
  pub subject_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct StudentHistory {
  pub student:  Student,
  /// Stats over `records`.
  pub stats:    HistoryStats,
  /// Stats for every subject, regardless of `subject_id`.
  pub subjects: Vec<SubjectHistory>,
  /// Newest first; narrowed to `subject_id` when given.
  pub records:  Vec<AttendanceRow>,
}

/// `GET /students/:id/history[?subject_id=<id>]`
pub async fn history<S: AttendanceStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Query(params): Query<HistoryParams>,
) -> Result<Json<StudentHistory>, ApiError> {
  let student = fetch(store.as_ref(), id).await?;
  let rows = store
    .list_attendance(&AttendanceFilter::for_student(id))
    .await
    .map_err(ApiError::store)?;
  let subjects = store.list_subjects().await.map_err(ApiError::store)?;

  let stats = history_stats(&rows, params.subject_id);
  let per_subject = subject_history(&rows, &subjects);
  let records = match params.subject_id {
    Some(subject_id) => rows
      .into_iter()
      .filter(|r| r.record.subject_id == subject_id)
      .collect(),
    None => rows,
  };

  Ok(Json(StudentHistory { student, stats, subjects: per_subject, records }))
}
