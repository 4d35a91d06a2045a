//! The `AttendanceStore` trait — the data access layer the workflows and the
//! API are written against.
//!
//! The trait is implemented by storage backends (e.g. `rollcall-store-sqlite`)
//! and by the [`CachedStore`](crate::cache::CachedStore) decorator. Higher
//! layers depend on this abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  attendance::{AttendanceBatch, AttendanceFilter, AttendanceRecord, AttendanceRow},
  student::{Student, StudentOrder, ValidStudent},
  subject::{NewSubject, Subject},
};

/// Abstraction over a Rollcall storage backend.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
///
/// Backend errors must convert into [`crate::Error`]: uniqueness violations
/// into [`crate::Error::Conflict`], everything the caller cannot fix into
/// [`crate::Error::TransientIo`].
pub trait AttendanceStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static + Into<crate::Error>;

  // ── Students ──────────────────────────────────────────────────────────

  fn list_students(
    &self,
    order: StudentOrder,
  ) -> impl Future<Output = Result<Vec<Student>, Self::Error>> + Send + '_;

  /// Retrieve a student by UUID. Returns `None` if not found.
  fn get_student(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Student>, Self::Error>> + Send + '_;

  /// Persist an already-validated student. Fails with a conflict if the roll
  /// number or email is taken; no row is created in that case.
  fn register_student(
    &self,
    input: ValidStudent,
  ) -> impl Future<Output = Result<Student, Self::Error>> + Send + '_;

  // ── Subjects ──────────────────────────────────────────────────────────

  /// All subjects, alphabetically by name.
  fn list_subjects(
    &self,
  ) -> impl Future<Output = Result<Vec<Subject>, Self::Error>> + Send + '_;

  /// Add a subject. Only used for seeding reference data.
  fn add_subject(
    &self,
    input: NewSubject,
  ) -> impl Future<Output = Result<Subject, Self::Error>> + Send + '_;

  // ── Attendance ────────────────────────────────────────────────────────

  /// Records matching `filter`, joined with student and subject display
  /// fields, newest date first and then newest `created_at` first.
  fn list_attendance<'a>(
    &'a self,
    filter: &'a AttendanceFilter,
  ) -> impl Future<Output = Result<Vec<AttendanceRow>, Self::Error>> + Send + 'a;

  /// Replace every record for `(batch.subject_id, batch.date)` with one new
  /// record per entry, all stamped with `batch.marked_by` and the same
  /// `created_at`.
  ///
  /// Backends with transactions must apply the delete and the inserts
  /// atomically. A backend without them must document that a failure between
  /// the two steps leaves the pair with no records.
  fn replace_attendance(
    &self,
    batch: AttendanceBatch,
  ) -> impl Future<Output = Result<Vec<AttendanceRecord>, Self::Error>> + Send + '_;
}
