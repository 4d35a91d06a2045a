//! SQL schema for the Rollcall SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Students are created by registration and never updated or deleted.
CREATE TABLE IF NOT EXISTS students (
    student_id   TEXT PRIMARY KEY,
    roll_number  TEXT NOT NULL UNIQUE,
    name         TEXT NOT NULL,
    email        TEXT NOT NULL UNIQUE,
    phone        TEXT,
    department   TEXT NOT NULL,
    year         INTEGER NOT NULL CHECK (year BETWEEN 1 AND 4),
    created_at   TEXT NOT NULL    -- RFC 3339 UTC
);

CREATE TABLE IF NOT EXISTS subjects (
    subject_id  TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    code        TEXT NOT NULL UNIQUE
);

-- Rows for one (subject_id, date) are always replaced together.
CREATE TABLE IF NOT EXISTS attendance (
    attendance_id TEXT PRIMARY KEY,
    student_id    TEXT NOT NULL REFERENCES students(student_id),
    subject_id    TEXT NOT NULL REFERENCES subjects(subject_id),
    date          TEXT NOT NULL,   -- YYYY-MM-DD
    status        TEXT NOT NULL CHECK (status IN ('present', 'absent', 'late')),
    marked_by     TEXT NOT NULL,
    created_at    TEXT NOT NULL    -- RFC 3339 UTC
);

CREATE INDEX IF NOT EXISTS attendance_marking_idx ON attendance(subject_id, date);
CREATE INDEX IF NOT EXISTS attendance_student_idx ON attendance(student_id);
CREATE INDEX IF NOT EXISTS attendance_date_idx    ON attendance(date);

PRAGMA user_version = 1;
";
