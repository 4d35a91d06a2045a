//! Students and the registration rules applied before they are stored.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^\+?[\d\s\-()]+$").expect("phone pattern compiles")
});

// ─── Student ─────────────────────────────────────────────────────────────────

/// A registered student. Never mutated once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
  pub student_id:  Uuid,
  pub roll_number: String,
  pub name:        String,
  pub email:       String,
  pub phone:       Option<String>,
  pub department:  String,
  /// Year of study, 1 through 4.
  pub year:        u8,
  pub created_at:  DateTime<Utc>,
}

/// Sort order for [`crate::store::AttendanceStore::list_students`].
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum StudentOrder {
  /// Roster order, used by the student list and the marking sheet.
  #[default]
  RollNumber,
  /// Alphabetical, used by history pickers.
  Name,
}

// ─── NewStudent ──────────────────────────────────────────────────────────────

/// Registration input. `student_id` and `created_at` are set by the store.
///
/// Omitted fields deserialise as empty so that [`NewStudent::validate`]
/// reports them with its own messages.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewStudent {
  pub roll_number: String,
  pub name:        String,
  pub email:       String,
  pub phone:       Option<String>,
  pub department:  String,
  pub year:        i64,
}

/// A [`NewStudent`] that passed [`NewStudent::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidStudent {
  pub roll_number: String,
  pub name:        String,
  pub email:       String,
  pub phone:       Option<String>,
  pub department:  String,
  pub year:        u8,
}

impl NewStudent {
  /// Check every field in form order and report only the first violation.
  ///
  /// An empty phone string is treated the same as an omitted one.
  pub fn validate(self) -> Result<ValidStudent> {
    check_len(&self.roll_number, 1, 20, "Roll number is required", "Roll number")?;
    check_len(&self.name, 2, 100, "Name must be at least 2 characters", "Name")?;

    if !EMAIL_RE.is_match(&self.email) {
      return Err(Error::validation("Invalid email address"));
    }
    check_len(&self.email, 0, 255, "", "Email")?;

    let phone = self.phone.filter(|p| !p.is_empty());
    if let Some(p) = &phone {
      if !PHONE_RE.is_match(p) {
        return Err(Error::validation("Invalid phone number"));
      }
      check_len(p, 0, 20, "", "Phone number")?;
    }

    check_len(&self.department, 2, 100, "Department is required", "Department")?;

    let year = u8::try_from(self.year)
      .ok()
      .filter(|y| (1..=4).contains(y))
      .ok_or_else(|| Error::validation("Year must be between 1 and 4"))?;

    Ok(ValidStudent {
      roll_number: self.roll_number,
      name: self.name,
      email: self.email,
      phone,
      department: self.department,
      year,
    })
  }
}

fn check_len(
  value: &str,
  min: usize,
  max: usize,
  too_short: &str,
  field: &str,
) -> Result<()> {
  let len = value.chars().count();
  if len < min {
    return Err(Error::validation(too_short));
  }
  if len > max {
    return Err(Error::validation(format!(
      "{field} must be at most {max} characters"
    )));
  }
  Ok(())
}
