//! Calendar months, the reporting period of the analytics view.

use std::{fmt, str::FromStr};

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A calendar month, written `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Month {
  first: NaiveDate,
}

impl Month {
  pub fn new(year: i32, month: u32) -> Result<Self> {
    NaiveDate::from_ymd_opt(year, month, 1)
      .map(|first| Self { first })
      .ok_or_else(|| Error::validation(format!("invalid month: {year:04}-{month:02}")))
  }

  /// The month containing `date`.
  pub fn containing(date: NaiveDate) -> Self {
    Self { first: date.with_day(1).unwrap_or(date) }
  }

  pub fn year(&self) -> i32 { self.first.year() }

  pub fn month(&self) -> u32 { self.first.month() }

  pub fn first_day(&self) -> NaiveDate { self.first }

  pub fn last_day(&self) -> NaiveDate {
    self
      .first
      .checked_add_months(Months::new(1))
      .and_then(|next| next.pred_opt())
      .unwrap_or(NaiveDate::MAX)
  }

  pub fn contains(&self, date: NaiveDate) -> bool {
    date >= self.first_day() && date <= self.last_day()
  }

  /// Every day of the month, first to last.
  pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
    let last = self.last_day();
    self.first.iter_days().take_while(move |d| *d <= last)
  }
}

impl fmt::Display for Month {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:04}-{:02}", self.year(), self.month())
  }
}

impl FromStr for Month {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let invalid = || Error::validation(format!("invalid month {s:?}, expected YYYY-MM"));
    let (y, m) = s.split_once('-').ok_or_else(invalid)?;
    let year = y.parse().map_err(|_| invalid())?;
    let month = m.parse().map_err(|_| invalid())?;
    Self::new(year, month)
  }
}

impl TryFrom<String> for Month {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { s.parse() }
}

impl From<Month> for String {
  fn from(m: Month) -> Self { m.to_string() }
}
