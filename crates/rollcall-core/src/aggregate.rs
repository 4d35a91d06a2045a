//! Aggregation of attendance rows into the figures shown by the read views.
//!
//! Everything here is pure and total: empty input yields empty output or zero
//! figures, and no function divides by zero. Functions accept any slice of
//! items that can be viewed as an [`AttendanceRecord`], so plain records,
//! joined [`AttendanceRow`](crate::attendance::AttendanceRow)s and borrowed
//! references all work.
//!
//! Two rate definitions coexist and are kept apart on purpose:
//!
//! - [`attendance_rate`] counts `present + late` as attended. Used by daily
//!   trends, overall statistics, the low-attendance roster and history views.
//! - [`presence_rate`] counts only `present`. Used by the subject breakdown.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::{
  attendance::{AttendanceRecord, AttendanceStatus},
  month::Month,
  student::Student,
  subject::Subject,
};

/// Students strictly below this attendance rate are flagged.
pub const LOW_ATTENDANCE_THRESHOLD: u32 = 75;

// ─── Counting ────────────────────────────────────────────────────────────────

/// Per-status record counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
  pub present: u32,
  pub absent:  u32,
  pub late:    u32,
}

impl StatusCounts {
  pub fn tally<R: AsRef<AttendanceRecord>>(
    rows: impl IntoIterator<Item = R>,
  ) -> Self {
    let mut counts = Self::default();
    for row in rows {
      counts.add(row.as_ref().status);
    }
    counts
  }

  pub fn add(&mut self, status: AttendanceStatus) {
    match status {
      AttendanceStatus::Present => self.present += 1,
      AttendanceStatus::Absent => self.absent += 1,
      AttendanceStatus::Late => self.late += 1,
    }
  }

  pub fn total(&self) -> u32 { self.present + self.absent + self.late }
}

/// `part / whole` as a whole percentage, rounding halves up. Zero when
/// `whole` is zero.
pub fn percent(part: u32, whole: u32) -> u32 {
  if whole == 0 {
    return 0;
  }
  let (part, whole) = (u64::from(part), u64::from(whole));
  ((200 * part + whole) / (2 * whole)) as u32
}

/// `round(100 * (present + late) / total)`.
pub fn attendance_rate(counts: &StatusCounts) -> u32 {
  percent(counts.present + counts.late, counts.total())
}

/// `round(100 * present / total)`; late arrivals do not count.
pub fn presence_rate(counts: &StatusCounts) -> u32 {
  percent(counts.present, counts.total())
}

fn group_by<R, K>(
  rows: &[R],
  key: impl Fn(&AttendanceRecord) -> K,
) -> HashMap<K, StatusCounts>
where
  R: AsRef<AttendanceRecord>,
  K: std::hash::Hash + Eq,
{
  let mut groups: HashMap<K, StatusCounts> = HashMap::new();
  for record in rows.iter().map(AsRef::as_ref) {
    groups.entry(key(record)).or_default().add(record.status);
  }
  groups
}

// ─── Daily trend ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyTrend {
  pub date:    NaiveDate,
  pub present: u32,
  pub absent:  u32,
  pub late:    u32,
  pub rate:    u32,
}

/// One point per day of `month` that has at least one record, ascending by
/// date. Records outside the month are ignored.
pub fn daily_trends<R: AsRef<AttendanceRecord>>(
  rows: &[R],
  month: Month,
) -> Vec<DailyTrend> {
  let mut by_day: BTreeMap<NaiveDate, StatusCounts> = BTreeMap::new();
  for record in rows.iter().map(AsRef::as_ref) {
    if month.contains(record.date) {
      by_day.entry(record.date).or_default().add(record.status);
    }
  }

  by_day
    .into_iter()
    .map(|(date, counts)| DailyTrend {
      date,
      present: counts.present,
      absent: counts.absent,
      late: counts.late,
      rate: attendance_rate(&counts),
    })
    .collect()
}

// ─── Subject breakdown ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectBreakdown {
  pub subject_id: Uuid,
  pub code:       String,
  pub name:       String,
  pub present:    u32,
  pub total:      u32,
  /// [`presence_rate`], not [`attendance_rate`].
  pub rate:       u32,
}

/// Per-subject presence, in the order `subjects` is given. Subjects without
/// records are left out.
pub fn subject_breakdown<R: AsRef<AttendanceRecord>>(
  rows: &[R],
  subjects: &[Subject],
) -> Vec<SubjectBreakdown> {
  let groups = group_by(rows, |r| r.subject_id);

  subjects
    .iter()
    .filter_map(|subject| {
      let counts = groups.get(&subject.subject_id)?;
      Some(SubjectBreakdown {
        subject_id: subject.subject_id,
        code:       subject.code.clone(),
        name:       subject.name.clone(),
        present:    counts.present,
        total:      counts.total(),
        rate:       presence_rate(counts),
      })
    })
    .collect()
}

// ─── Low-attendance roster ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LowAttendance {
  pub student_id:  Uuid,
  pub name:        String,
  pub roll_number: String,
  pub department:  String,
  pub present:     u32,
  pub late:        u32,
  pub total:       u32,
  pub rate:        u32,
}

/// Students with at least one record and an attendance rate below
/// [`LOW_ATTENDANCE_THRESHOLD`], worst first. Ties keep the order of
/// `students`.
pub fn low_attendance<R: AsRef<AttendanceRecord>>(
  rows: &[R],
  students: &[Student],
) -> Vec<LowAttendance> {
  let groups = group_by(rows, |r| r.student_id);

  let mut roster: Vec<LowAttendance> = students
    .iter()
    .filter_map(|student| {
      let counts = groups.get(&student.student_id)?;
      let rate = attendance_rate(counts);
      (counts.total() > 0 && rate < LOW_ATTENDANCE_THRESHOLD).then(|| {
        LowAttendance {
          student_id: student.student_id,
          name: student.name.clone(),
          roll_number: student.roll_number.clone(),
          department: student.department.clone(),
          present: counts.present,
          late: counts.late,
          total: counts.total(),
          rate,
        }
      })
    })
    .collect();

  roster.sort_by_key(|entry| entry.rate);
  roster
}

// ─── Overall ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OverallStats {
  pub total_classes: u32,
  pub avg_rate:      u32,
}

pub fn overall_stats<R: AsRef<AttendanceRecord>>(rows: &[R]) -> OverallStats {
  let counts = StatusCounts::tally(rows);
  OverallStats {
    total_classes: counts.total(),
    avg_rate:      attendance_rate(&counts),
  }
}

// ─── History ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HistoryStats {
  pub total:      u32,
  pub present:    u32,
  pub absent:     u32,
  pub late:       u32,
  pub percentage: u32,
}

impl From<StatusCounts> for HistoryStats {
  fn from(counts: StatusCounts) -> Self {
    Self {
      total:      counts.total(),
      present:    counts.present,
      absent:     counts.absent,
      late:       counts.late,
      percentage: attendance_rate(&counts),
    }
  }
}

/// Stats over one student's rows, optionally narrowed to a single subject.
pub fn history_stats<R: AsRef<AttendanceRecord>>(
  rows: &[R],
  subject_id: Option<Uuid>,
) -> HistoryStats {
  StatusCounts::tally(
    rows
      .iter()
      .filter(|r| subject_id.is_none_or(|id| r.as_ref().subject_id == id)),
  )
  .into()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectHistory {
  pub subject: Subject,
  pub stats:   HistoryStats,
}

/// [`history_stats`] for every subject, including ones without records.
pub fn subject_history<R: AsRef<AttendanceRecord>>(
  rows: &[R],
  subjects: &[Subject],
) -> Vec<SubjectHistory> {
  let groups = group_by(rows, |r| r.subject_id);
  subjects
    .iter()
    .map(|subject| SubjectHistory {
      subject: subject.clone(),
      stats:   groups
        .get(&subject.subject_id)
        .copied()
        .unwrap_or_default()
        .into(),
    })
    .collect()
}

// ─── Analytics report ────────────────────────────────────────────────────────

/// Everything the monthly analytics view shows, computed over the rows that
/// fall inside `month`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyticsReport {
  pub month:             Month,
  pub overall:           OverallStats,
  pub daily_trends:      Vec<DailyTrend>,
  pub subject_breakdown: Vec<SubjectBreakdown>,
  pub low_attendance:    Vec<LowAttendance>,
}

pub fn analytics_report<R: AsRef<AttendanceRecord>>(
  month: Month,
  rows: &[R],
  students: &[Student],
  subjects: &[Subject],
) -> AnalyticsReport {
  let in_month: Vec<&AttendanceRecord> = rows
    .iter()
    .map(AsRef::as_ref)
    .filter(|r| month.contains(r.date))
    .collect();

  AnalyticsReport {
    month,
    overall: overall_stats(&in_month),
    daily_trends: daily_trends(&in_month, month),
    subject_breakdown: subject_breakdown(&in_month, subjects),
    low_attendance: low_attendance(&in_month, students),
  }
}

// ─── Dashboard ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DashboardSummary {
  pub total_students:  u32,
  pub total_subjects:  u32,
  pub present_today:   u32,
  /// Present marks as a share of every possible (student, subject) slot for
  /// the day, to one decimal place.
  pub attendance_rate: f64,
}

/// Headline numbers for one day. Only `present` counts toward the rate, and
/// the denominator assumes every student takes every subject.
pub fn dashboard_summary<R: AsRef<AttendanceRecord>>(
  total_students: u32,
  total_subjects: u32,
  today: &[R],
) -> DashboardSummary {
  let present_today = StatusCounts::tally(today).present;
  let slots = f64::from(total_students) * f64::from(total_subjects.max(1));
  let attendance_rate = if total_students == 0 {
    0.0
  } else {
    (f64::from(present_today) / slots * 1000.0).round() / 10.0
  };

  DashboardSummary {
    total_students,
    total_subjects,
    present_today,
    attendance_rate,
  }
}

// ─── Marking sheet ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetEntry {
  pub student: Student,
  /// Status already on record for this subject and day, if any.
  pub status:  Option<AttendanceStatus>,
}

/// Pair every student with the status currently recorded in `existing`,
/// which should hold the rows of a single `(subject, date)`.
pub fn marking_sheet<R: AsRef<AttendanceRecord>>(
  students: &[Student],
  existing: &[R],
) -> Vec<SheetEntry> {
  let current: HashMap<Uuid, AttendanceStatus> = existing
    .iter()
    .map(AsRef::as_ref)
    .map(|r| (r.student_id, r.status))
    .collect();

  students
    .iter()
    .map(|student| SheetEntry {
      student: student.clone(),
      status:  current.get(&student.student_id).copied(),
    })
    .collect()
}
