//! Write workflows: marking attendance and registering students.
//!
//! Both check their preconditions before touching the store, so a rejected
//! call performs no writes at all.

use tracing::{info, instrument, warn};

use crate::{
  Error, Result,
  attendance::{AttendanceBatch, MarkAttendance},
  identity::Actor,
  store::AttendanceStore,
  student::{NewStudent, Student},
};

/// Replace the marking for `(mark.subject_id, mark.date)` with `mark.entries`.
///
/// Fails with [`Error::AuthenticationRequired`] when there is no actor and
/// with [`Error::Validation`] when `entries` is empty. When `store` is a
/// [`CachedStore`](crate::cache::CachedStore), cached attendance queries are
/// invalidated once the write succeeds.
#[instrument(
  name = "rollcall.workflow.mark_attendance",
  skip_all,
  fields(subject_id = %mark.subject_id, date = %mark.date, entries = mark.entries.len())
)]
pub async fn mark_attendance<S: AttendanceStore>(
  store: &S,
  actor: Option<&Actor>,
  mark: MarkAttendance,
) -> Result<()> {
  let actor = Actor::require(actor)?;

  if mark.entries.is_empty() {
    return Err(Error::validation("no attendance selections to save"));
  }

  let batch = AttendanceBatch {
    subject_id: mark.subject_id,
    date:       mark.date,
    entries:    mark.entries,
    marked_by:  actor.user_id,
  };

  let written = store.replace_attendance(batch).await.map_err(|e| {
    let err: Error = e.into();
    warn!(error = %err, "failed to mark attendance");
    err
  })?;

  info!(records = written.len(), marked_by = %actor.username, "attendance marked");
  Ok(())
}

/// Validate and persist a new student. Validation runs before any write and
/// reports only the first violated rule.
#[instrument(
  name = "rollcall.workflow.register_student",
  skip_all,
  fields(roll_number = %input.roll_number)
)]
pub async fn register_student<S: AttendanceStore>(
  store: &S,
  input: NewStudent,
) -> Result<Student> {
  let valid = input.validate()?;

  let student = store
    .register_student(valid)
    .await
    .map_err(Into::<Error>::into)?;

  info!(student_id = %student.student_id, "student registered");
  Ok(student)
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;
  use uuid::Uuid;

  use super::*;
  use crate::{
    attendance::{AttendanceFilter, AttendanceStatus},
    testing::MemoryStore,
  };

  fn actor() -> Actor {
    Actor { user_id: Uuid::new_v4(), username: "teacher".into() }
  }

  fn mark(entries: &[(Uuid, AttendanceStatus)]) -> MarkAttendance {
    MarkAttendance {
      subject_id: Uuid::nil(),
      date:       NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
      entries:    entries.iter().copied().collect(),
    }
  }

  #[tokio::test]
  async fn marking_without_actor_writes_nothing() {
    let store = MemoryStore::default();
    let err = mark_attendance(&store, None, mark(&[(Uuid::new_v4(), AttendanceStatus::Present)]))
      .await
      .unwrap_err();
    assert!(matches!(err, Error::AuthenticationRequired));
    assert_eq!(store.writes(), 0);
  }

  #[tokio::test]
  async fn empty_marking_is_rejected_before_writing() {
    let store = MemoryStore::default();
    let err = mark_attendance(&store, Some(&actor()), mark(&[])).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(store.writes(), 0);
  }

  #[tokio::test]
  async fn marking_stamps_the_actor() {
    let store = MemoryStore::default();
    let who = actor();
    let student = Uuid::new_v4();

    mark_attendance(&store, Some(&who), mark(&[(student, AttendanceStatus::Late)]))
      .await
      .unwrap();

    let rows = store.list_attendance(&AttendanceFilter::default()).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].record.marked_by, who.user_id);
    assert_eq!(rows[0].record.status, AttendanceStatus::Late);
  }

  #[tokio::test]
  async fn store_failures_surface_as_io_errors() {
    let store = MemoryStore::failing_writes();
    let err = mark_attendance(
      &store,
      Some(&actor()),
      mark(&[(Uuid::new_v4(), AttendanceStatus::Absent)]),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::TransientIo(_)));
  }

  #[tokio::test]
  async fn invalid_registration_never_reaches_the_store() {
    let store = MemoryStore::default();
    let input = NewStudent {
      roll_number: "42".into(),
      name:        "Grace Hopper".into(),
      email:       "grace@navy.mil".into(),
      phone:       Some("abc".into()),
      department:  "Computing".into(),
      year:        3,
    };
    let err = register_student(&store, input).await.unwrap_err();
    assert!(matches!(err, Error::Validation(ref m) if m == "Invalid phone number"));
    assert_eq!(store.writes(), 0);
  }
}
