//! [`SqliteStore`] — the SQLite implementation of [`AttendanceStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, ffi};
use tracing::debug;
use uuid::Uuid;

use rollcall_core::{
  attendance::{AttendanceBatch, AttendanceFilter, AttendanceRecord, AttendanceRow},
  store::AttendanceStore,
  student::{Student, StudentOrder, ValidStudent},
  subject::{NewSubject, Subject},
};

use crate::{
  Error, Result,
  encode::{
    RawAttendanceRow, RawStudent, RawSubject, STUDENT_COLUMNS, encode_date, encode_dt,
    encode_status, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Rollcall store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Turn constraint failures into the domain errors callers can act on.
fn classify(
  e: tokio_rusqlite::Error,
  entity: &'static str,
  fields: &'static str,
) -> Error {
  if let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(err, _)) = &e {
    match err.extended_code {
      ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
        return Error::Duplicate { entity, fields };
      }
      ffi::SQLITE_CONSTRAINT_FOREIGNKEY => return Error::UnknownReference,
      _ => {}
    }
  }
  Error::Database(e)
}

// ─── AttendanceStore impl ────────────────────────────────────────────────────

impl AttendanceStore for SqliteStore {
  type Error = Error;

  // ── Students ──────────────────────────────────────────────────────────────

  async fn list_students(&self, order: StudentOrder) -> Result<Vec<Student>> {
    let order_by = match order {
      StudentOrder::RollNumber => "roll_number",
      StudentOrder::Name => "name",
    };
    let sql = format!("SELECT {STUDENT_COLUMNS} FROM students ORDER BY {order_by}");

    let raws: Vec<RawStudent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawStudent::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawStudent::into_student).collect()
  }

  async fn get_student(&self, id: Uuid) -> Result<Option<Student>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawStudent> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {STUDENT_COLUMNS} FROM students WHERE student_id = ?1"),
              rusqlite::params![id_str],
              RawStudent::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawStudent::into_student).transpose()
  }

  async fn register_student(&self, input: ValidStudent) -> Result<Student> {
    let student = Student {
      student_id:  Uuid::new_v4(),
      roll_number: input.roll_number,
      name:        input.name,
      email:       input.email,
      phone:       input.phone,
      department:  input.department,
      year:        input.year,
      created_at:  Utc::now(),
    };

    let id_str      = encode_uuid(student.student_id);
    let roll_number = student.roll_number.clone();
    let name        = student.name.clone();
    let email       = student.email.clone();
    let phone       = student.phone.clone();
    let department  = student.department.clone();
    let year        = student.year;
    let at_str      = encode_dt(student.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO students (
             student_id, roll_number, name, email, phone, department, year, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            id_str,
            roll_number,
            name,
            email,
            phone,
            department,
            year,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| classify(e, "student", "roll number or email"))?;

    debug!(student_id = %student.student_id, "inserted student");
    Ok(student)
  }

  // ── Subjects ──────────────────────────────────────────────────────────────

  async fn list_subjects(&self) -> Result<Vec<Subject>> {
    let raws: Vec<RawSubject> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT subject_id, name, code FROM subjects ORDER BY name")?;
        let rows = stmt
          .query_map([], RawSubject::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSubject::into_subject).collect()
  }

  async fn add_subject(&self, input: NewSubject) -> Result<Subject> {
    let subject = Subject {
      subject_id: Uuid::new_v4(),
      name:       input.name,
      code:       input.code,
    };

    let id_str = encode_uuid(subject.subject_id);
    let name   = subject.name.clone();
    let code   = subject.code.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO subjects (subject_id, name, code) VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, name, code],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| classify(e, "subject", "code"))?;

    Ok(subject)
  }

  // ── Attendance ────────────────────────────────────────────────────────────

  async fn list_attendance(&self, filter: &AttendanceFilter) -> Result<Vec<AttendanceRow>> {
    let subject_id = filter.subject_id.map(encode_uuid);
    let student_id = filter.student_id.map(encode_uuid);
    let date       = filter.date.map(encode_date);
    let from       = filter.from.map(encode_date);
    let to         = filter.to.map(encode_date);

    let raws: Vec<RawAttendanceRow> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT
             a.attendance_id, a.student_id, a.subject_id, a.date,
             a.status, a.marked_by, a.created_at,
             st.name, st.roll_number, st.department,
             su.name, su.code
           FROM attendance a
           LEFT JOIN students st ON st.student_id = a.student_id
           LEFT JOIN subjects su ON su.subject_id = a.subject_id
           WHERE (?1 IS NULL OR a.subject_id = ?1)
             AND (?2 IS NULL OR a.student_id = ?2)
             AND (?3 IS NULL OR a.date = ?3)
             AND (?4 IS NULL OR a.date >= ?4)
             AND (?5 IS NULL OR a.date <= ?5)
           ORDER BY a.date DESC, a.created_at DESC",
        )?;

        let rows = stmt
          .query_map(
            rusqlite::params![subject_id, student_id, date, from, to],
            RawAttendanceRow::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAttendanceRow::into_row).collect()
  }

  async fn replace_attendance(&self, batch: AttendanceBatch) -> Result<Vec<AttendanceRecord>> {
    let created_at = Utc::now();
    let records: Vec<AttendanceRecord> = batch
      .entries
      .iter()
      .map(|(&student_id, &status)| AttendanceRecord {
        attendance_id: Uuid::new_v4(),
        student_id,
        subject_id: batch.subject_id,
        date: batch.date,
        status,
        marked_by: batch.marked_by,
        created_at,
      })
      .collect();

    let subject_str = encode_uuid(batch.subject_id);
    let date_str    = encode_date(batch.date);
    let marked_by   = encode_uuid(batch.marked_by);
    let at_str      = encode_dt(created_at);
    let rows: Vec<(String, String, &'static str)> = records
      .iter()
      .map(|r| (encode_uuid(r.attendance_id), encode_uuid(r.student_id), encode_status(r.status)))
      .collect();

    // Delete and insert commit together; a failure leaves the old marking.
    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let deleted = tx.execute(
          "DELETE FROM attendance WHERE subject_id = ?1 AND date = ?2",
          rusqlite::params![subject_str, date_str],
        )?;
        {
          let mut insert = tx.prepare(
            "INSERT INTO attendance (
               attendance_id, student_id, subject_id, date, status, marked_by, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          )?;
          for (attendance_id, student_id, status) in &rows {
            insert.execute(rusqlite::params![
              attendance_id,
              student_id,
              subject_str,
              date_str,
              status,
              marked_by,
              at_str,
            ])?;
          }
        }
        tx.commit()?;
        Ok(deleted)
      })
      .await
      .map_err(|e| classify(e, "attendance record", "id"))?;

    debug!(
      subject_id = %batch.subject_id,
      date = %batch.date,
      deleted,
      inserted = records.len(),
      "replaced attendance"
    );
    Ok(records)
  }
}
