//! Subjects — static reference data attendance is recorded against.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
  pub subject_id: Uuid,
  pub name:       String,
  /// Short identifier used in compact displays, e.g. `"MATH101"`.
  pub code:       String,
}

/// Input to [`crate::store::AttendanceStore::add_subject`]; used for seeding.
#[derive(Debug, Clone, Deserialize)]
pub struct NewSubject {
  pub name: String,
  pub code: String,
}
