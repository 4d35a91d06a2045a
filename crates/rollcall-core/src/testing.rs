//! In-memory store used by the unit tests of this crate.

use std::sync::{
  Mutex,
  atomic::{AtomicUsize, Ordering},
};

use chrono::Utc;
use uuid::Uuid;

use crate::{
  Error,
  attendance::{AttendanceBatch, AttendanceFilter, AttendanceRecord, AttendanceRow},
  store::AttendanceStore,
  student::{Student, StudentOrder, ValidStudent},
  subject::{NewSubject, Subject},
};

#[derive(Default)]
pub struct MemoryStore {
  students:      Mutex<Vec<Student>>,
  subjects:      Mutex<Vec<Subject>>,
  records:       Mutex<Vec<AttendanceRecord>>,
  reads:         AtomicUsize,
  writes:        AtomicUsize,
  fail_writes:   bool,
}

impl MemoryStore {
  pub fn failing_writes() -> Self { Self { fail_writes: true, ..Self::default() } }

  pub fn reads(&self) -> usize { self.reads.load(Ordering::SeqCst) }

  pub fn writes(&self) -> usize { self.writes.load(Ordering::SeqCst) }

  fn write(&self) -> Result<(), Error> {
    if self.fail_writes {
      return Err(Error::io(std::io::Error::other("store offline")));
    }
    self.writes.fetch_add(1, Ordering::SeqCst);
    Ok(())
  }
}

pub fn valid_student(roll: &str) -> ValidStudent {
  ValidStudent {
    roll_number: roll.into(),
    name:        format!("Student {roll}"),
    email:       format!("{roll}@school.edu"),
    phone:       None,
    department:  "Mathematics".into(),
    year:        1,
  }
}

impl AttendanceStore for MemoryStore {
  type Error = Error;

  async fn list_students(&self, order: StudentOrder) -> Result<Vec<Student>, Error> {
    self.reads.fetch_add(1, Ordering::SeqCst);
    let mut students = self.students.lock().unwrap().clone();
    match order {
      StudentOrder::RollNumber => students.sort_by(|a, b| a.roll_number.cmp(&b.roll_number)),
      StudentOrder::Name => students.sort_by(|a, b| a.name.cmp(&b.name)),
    }
    Ok(students)
  }

  async fn get_student(&self, id: Uuid) -> Result<Option<Student>, Error> {
    self.reads.fetch_add(1, Ordering::SeqCst);
    Ok(self.students.lock().unwrap().iter().find(|s| s.student_id == id).cloned())
  }

  async fn register_student(&self, input: ValidStudent) -> Result<Student, Error> {
    self.write()?;
    let mut students = self.students.lock().unwrap();
    if students
      .iter()
      .any(|s| s.roll_number == input.roll_number || s.email == input.email)
    {
      return Err(Error::Conflict("duplicate".into()));
    }
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
    students.push(student.clone());
    Ok(student)
  }

  async fn list_subjects(&self) -> Result<Vec<Subject>, Error> {
    self.reads.fetch_add(1, Ordering::SeqCst);
    Ok(self.subjects.lock().unwrap().clone())
  }

  async fn add_subject(&self, input: NewSubject) -> Result<Subject, Error> {
    self.write()?;
    let subject = Subject { subject_id: Uuid::new_v4(), name: input.name, code: input.code };
    self.subjects.lock().unwrap().push(subject.clone());
    Ok(subject)
  }

  async fn list_attendance(
    &self,
    filter: &AttendanceFilter,
  ) -> Result<Vec<AttendanceRow>, Error> {
    self.reads.fetch_add(1, Ordering::SeqCst);
    Ok(
      self
        .records
        .lock()
        .unwrap()
        .iter()
        .filter(|r| filter.subject_id.is_none_or(|id| r.subject_id == id))
        .filter(|r| filter.student_id.is_none_or(|id| r.student_id == id))
        .filter(|r| filter.date.is_none_or(|d| r.date == d))
        .filter(|r| filter.from.is_none_or(|d| r.date >= d))
        .filter(|r| filter.to.is_none_or(|d| r.date <= d))
        .map(|r| AttendanceRow { record: r.clone(), student: None, subject: None })
        .collect(),
    )
  }

  async fn replace_attendance(
    &self,
    batch: AttendanceBatch,
  ) -> Result<Vec<AttendanceRecord>, Error> {
    self.write()?;
    let now = Utc::now();
    let mut records = self.records.lock().unwrap();
    records.retain(|r| !(r.subject_id == batch.subject_id && r.date == batch.date));
    let written: Vec<AttendanceRecord> = batch
      .entries
      .into_iter()
      .map(|(student_id, status)| AttendanceRecord {
        attendance_id: Uuid::new_v4(),
        student_id,
        subject_id: batch.subject_id,
        date: batch.date,
        status,
        marked_by: batch.marked_by,
        created_at: now,
      })
      .collect();
    records.extend(written.iter().cloned());
    Ok(written)
  }
}
