//! Handlers for `/attendance` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/attendance` | Filter by `subject_id`, `student_id`, `date`, `from`, `to` |
//! | `GET`  | `/attendance/sheet` | `subject_id` and `date` required |
//! | `PUT`  | `/attendance` | Body: [`MarkAttendance`]; 204, 401 without an actor |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State, rejection::JsonRejection},
  http::StatusCode,
};
use chrono::NaiveDate;
use rollcall_core::{
  aggregate::{SheetEntry, marking_sheet},
  attendance::{AttendanceFilter, AttendanceRow, MarkAttendance},
  store::AttendanceStore,
  student::StudentOrder,
  workflow,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{CurrentActor, error::ApiError};

/// `GET /attendance[?subject_id=&student_id=&date=&from=&to=]` — newest first.
pub async fn list<S: AttendanceStore>(
  State(store): State<Arc<S>>,
  Query(filter): Query<AttendanceFilter>,
) -> Result<Json<Vec<AttendanceRow>>, ApiError> {
  let rows = store.list_attendance(&filter).await.map_err(ApiError::store)?;
  Ok(Json(rows))
}

#[derive(Debug, Deserialize)]
pub struct SheetParams {
  pub subject_id: Uuid,
  pub date:       NaiveDate,
}

/// `GET /attendance/sheet?subject_id=<id>&date=<YYYY-MM-DD>`
///
/// Every student in roll-number order, paired with the status already on
/// record for that subject and day.
pub async fn sheet<S: AttendanceStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<SheetParams>,
) -> Result<Json<Vec<SheetEntry>>, ApiError> {
  let students = store
    .list_students(StudentOrder::RollNumber)
    .await
    .map_err(ApiError::store)?;
  let existing = store
    .list_attendance(&AttendanceFilter::for_marking(params.subject_id, params.date))
    .await
    .map_err(ApiError::store)?;

  Ok(Json(marking_sheet(&students, &existing)))
}

/// `PUT /attendance` — replaces the whole marking for `(subject_id, date)`.
pub async fn mark<S: AttendanceStore>(
  State(store): State<Arc<S>>,
  CurrentActor(actor): CurrentActor,
  body: Result<Json<MarkAttendance>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
  let Json(body) = body?;
  workflow::mark_attendance(store.as_ref(), actor.as_ref(), body).await?;
  Ok(StatusCode::NO_CONTENT)
}
