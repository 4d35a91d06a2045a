//! Error type for `rollcall-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown attendance status: {0:?}")]
  UnknownStatus(String),

  /// A UNIQUE constraint rejected the write.
  #[error("a {entity} with this {fields} already exists")]
  Duplicate {
    entity: &'static str,
    fields: &'static str,
  },

  /// A FOREIGN KEY constraint rejected the write.
  #[error("attendance references an unknown student or subject")]
  UnknownReference,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<Error> for rollcall_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Duplicate { .. } => Self::Conflict(e.to_string()),
      Error::UnknownReference => Self::Validation(e.to_string()),
      other => Self::TransientIo(Box::new(other)),
    }
  }
}
