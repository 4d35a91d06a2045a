//! Attendance records, their joined read form, and the query filter.
//!
//! The logical key of a marking is `(student_id, subject_id, date)`, but each
//! record also carries its own id. Records are only ever written in bulk, one
//! `(subject_id, date)` at a time, by replacing whatever was there before.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{EnumString, IntoStaticStr};
use uuid::Uuid;

// ─── Status ──────────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  EnumString,
  IntoStaticStr,
  strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AttendanceStatus {
  Present,
  Absent,
  Late,
}

// ─── Record ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
  pub attendance_id: Uuid,
  pub student_id:    Uuid,
  pub subject_id:    Uuid,
  pub date:          NaiveDate,
  pub status:        AttendanceStatus,
  /// User id of the actor who recorded the marking.
  pub marked_by:     Uuid,
  pub created_at:    DateTime<Utc>,
}

impl AsRef<AttendanceRecord> for AttendanceRecord {
  fn as_ref(&self) -> &AttendanceRecord { self }
}

// ─── Joined row ──────────────────────────────────────────────────────────────

/// Student display fields attached to an [`AttendanceRow`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRef {
  pub name:        String,
  pub roll_number: String,
  pub department:  String,
}

/// Subject display fields attached to an [`AttendanceRow`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRef {
  pub name: String,
  pub code: String,
}

/// A record joined with the display fields of its student and subject.
///
/// Either side may be missing if the referenced row no longer resolves; that
/// is not an error, the fields are simply absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRow {
  #[serde(flatten)]
  pub record:  AttendanceRecord,
  pub student: Option<StudentRef>,
  pub subject: Option<SubjectRef>,
}

impl AsRef<AttendanceRecord> for AttendanceRow {
  fn as_ref(&self) -> &AttendanceRecord { &self.record }
}

// ─── Filter ──────────────────────────────────────────────────────────────────

/// Parameters for [`crate::store::AttendanceStore::list_attendance`].
/// Every field narrows the result; an empty filter returns everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize)]
pub struct AttendanceFilter {
  pub subject_id: Option<Uuid>,
  pub student_id: Option<Uuid>,
  /// Exact day.
  pub date:       Option<NaiveDate>,
  /// Inclusive lower bound.
  pub from:       Option<NaiveDate>,
  /// Inclusive upper bound.
  pub to:         Option<NaiveDate>,
}

impl AttendanceFilter {
  pub fn for_marking(subject_id: Uuid, date: NaiveDate) -> Self {
    Self { subject_id: Some(subject_id), date: Some(date), ..Self::default() }
  }

  pub fn for_student(student_id: Uuid) -> Self {
    Self { student_id: Some(student_id), ..Self::default() }
  }

  pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
    Self { from: Some(from), to: Some(to), ..Self::default() }
  }
}

// ─── Writes ──────────────────────────────────────────────────────────────────

/// What a caller submits to mark one subject on one day. Only students that
/// were explicitly marked need to appear in `entries`.
#[derive(Debug, Clone, Deserialize)]
pub struct MarkAttendance {
  pub subject_id: Uuid,
  pub date:       NaiveDate,
  pub entries:    BTreeMap<Uuid, AttendanceStatus>,
}

/// Input to [`crate::store::AttendanceStore::replace_attendance`]: a
/// [`MarkAttendance`] stamped with the acting user.
#[derive(Debug, Clone)]
pub struct AttendanceBatch {
  pub subject_id: Uuid,
  pub date:       NaiveDate,
  pub entries:    BTreeMap<Uuid, AttendanceStatus>,
  pub marked_by:  Uuid,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_string_forms_agree() {
    for status in [AttendanceStatus::Present, AttendanceStatus::Absent, AttendanceStatus::Late] {
      let stored: &'static str = status.into();
      assert_eq!(stored, status.to_string());
      assert_eq!(stored.parse::<AttendanceStatus>().unwrap(), status);
      assert_eq!(serde_json::to_value(status).unwrap(), stored);
    }
    let late: &'static str = AttendanceStatus::Late.into();
    assert_eq!(late, "late");
  }
}
