//! Handlers for the reporting endpoints: monthly analytics and the daily
//! dashboard.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use chrono::{Local, NaiveDate, Utc};
use rollcall_core::{
  aggregate::{AnalyticsReport, DashboardSummary, analytics_report, dashboard_summary},
  attendance::AttendanceFilter,
  month::Month,
  store::AttendanceStore,
  student::StudentOrder,
};
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ReportParams {
  /// `YYYY-MM`; defaults to the current month.
  pub month: Option<Month>,
}

/// `GET /analytics[?month=YYYY-MM]`
pub async fn report<S: AttendanceStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<ReportParams>,
) -> Result<Json<AnalyticsReport>, ApiError> {
  let month = params
    .month
    .unwrap_or_else(|| Month::containing(Local::now().date_naive()));

  let rows = store
    .list_attendance(&AttendanceFilter::between(month.first_day(), month.last_day()))
    .await
    .map_err(ApiError::store)?;
  let students = store
    .list_students(StudentOrder::RollNumber)
    .await
    .map_err(ApiError::store)?;
  let subjects = store.list_subjects().await.map_err(ApiError::store)?;

  Ok(Json(analytics_report(month, &rows, &students, &subjects)))
}

#[derive(Debug, Deserialize)]
pub struct DashboardParams {
  /// Defaults to today's UTC date.
  pub date: Option<NaiveDate>,
}

/// `GET /dashboard[?date=YYYY-MM-DD]`
pub async fn dashboard<S: AttendanceStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<DashboardParams>,
) -> Result<Json<DashboardSummary>, ApiError> {
  let date = params.date.unwrap_or_else(|| Utc::now().date_naive());

  let students = store
    .list_students(StudentOrder::RollNumber)
    .await
    .map_err(ApiError::store)?;
  let subjects = store.list_subjects().await.map_err(ApiError::store)?;
  let today = store
    .list_attendance(&AttendanceFilter { date: Some(date), ..Default::default() })
    .await
    .map_err(ApiError::store)?;

  Ok(Json(dashboard_summary(
    count(students.len()),
    count(subjects.len()),
    &today,
  )))
}

fn count(n: usize) -> u32 { u32::try_from(n).unwrap_or(u32::MAX) }
