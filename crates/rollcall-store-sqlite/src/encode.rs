//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, calendar dates are `YYYY-MM-DD` (so they
//! sort lexically), UUIDs are hyphenated lowercase strings and statuses are
//! their lowercase names.

use chrono::{DateTime, NaiveDate, Utc};
use rollcall_core::{
  attendance::{AttendanceRecord, AttendanceRow, AttendanceStatus, StudentRef, SubjectRef},
  student::Student,
  subject::Subject,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

pub fn encode_status(s: AttendanceStatus) -> &'static str { s.into() }

pub fn decode_status(s: &str) -> Result<AttendanceStatus> {
  s.parse().map_err(|_| Error::UnknownStatus(s.to_owned()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawStudent::from_row`].
pub const STUDENT_COLUMNS: &str =
  "student_id, roll_number, name, email, phone, department, year, created_at";

/// Raw values read directly from a `students` row.
pub struct RawStudent {
  pub student_id:  String,
  pub roll_number: String,
  pub name:        String,
  pub email:       String,
  pub phone:       Option<String>,
  pub department:  String,
  pub year:        u8,
  pub created_at:  String,
}

impl RawStudent {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      student_id:  row.get(0)?,
      roll_number: row.get(1)?,
      name:        row.get(2)?,
      email:       row.get(3)?,
      phone:       row.get(4)?,
      department:  row.get(5)?,
      year:        row.get(6)?,
      created_at:  row.get(7)?,
    })
  }

  pub fn into_student(self) -> Result<Student> {
    Ok(Student {
      student_id:  decode_uuid(&self.student_id)?,
      roll_number: self.roll_number,
      name:        self.name,
      email:       self.email,
      phone:       self.phone,
      department:  self.department,
      year:        self.year,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `subjects` row.
pub struct RawSubject {
  pub subject_id: String,
  pub name:       String,
  pub code:       String,
}

impl RawSubject {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self { subject_id: row.get(0)?, name: row.get(1)?, code: row.get(2)? })
  }

  pub fn into_subject(self) -> Result<Subject> {
    Ok(Subject {
      subject_id: decode_uuid(&self.subject_id)?,
      name:       self.name,
      code:       self.code,
    })
  }
}

/// Raw values read from an `attendance` row left-joined with `students` and
/// `subjects`. The joined columns are `NULL` when the reference is dangling.
pub struct RawAttendanceRow {
  // attendance columns
  pub attendance_id:       String,
  pub student_id:          String,
  pub subject_id:          String,
  pub date:                String,
  pub status:              String,
  pub marked_by:           String,
  pub created_at:          String,
  // students join
  pub student_name:        Option<String>,
  pub student_roll_number: Option<String>,
  pub student_department:  Option<String>,
  // subjects join
  pub subject_name:        Option<String>,
  pub subject_code:        Option<String>,
}

impl RawAttendanceRow {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      attendance_id:       row.get(0)?,
      student_id:          row.get(1)?,
      subject_id:          row.get(2)?,
      date:                row.get(3)?,
      status:              row.get(4)?,
      marked_by:           row.get(5)?,
      created_at:          row.get(6)?,
      student_name:        row.get(7)?,
      student_roll_number: row.get(8)?,
      student_department:  row.get(9)?,
      subject_name:        row.get(10)?,
      subject_code:        row.get(11)?,
    })
  }

  pub fn into_row(self) -> Result<AttendanceRow> {
    let record = AttendanceRecord {
      attendance_id: decode_uuid(&self.attendance_id)?,
      student_id:    decode_uuid(&self.student_id)?,
      subject_id:    decode_uuid(&self.subject_id)?,
      date:          decode_date(&self.date)?,
      status:        decode_status(&self.status)?,
      marked_by:     decode_uuid(&self.marked_by)?,
      created_at:    decode_dt(&self.created_at)?,
    };

    let student = match (
      self.student_name,
      self.student_roll_number,
      self.student_department,
    ) {
      (Some(name), Some(roll_number), Some(department)) => {
        Some(StudentRef { name, roll_number, department })
      }
      _ => None,
    };

    let subject = match (self.subject_name, self.subject_code) {
      (Some(name), Some(code)) => Some(SubjectRef { name, code }),
      _ => None,
    };

    Ok(AttendanceRow { record, student, subject })
  }
}
