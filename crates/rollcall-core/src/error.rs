//! Error kinds shared by every Rollcall crate.
//!
//! Storage backends keep their own error types and convert into [`Error`] so
//! that callers can tell a conflict apart from a generic I/O failure.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A write was attempted without a resolvable actor identity.
  #[error("authentication required")]
  AuthenticationRequired,

  /// Input rejected before any write; carries the first violated rule.
  #[error("{0}")]
  Validation(String),

  /// The store rejected a write because of a uniqueness violation.
  #[error("{0}")]
  Conflict(String),

  #[error("{0}")]
  NotFound(String),

  /// The store could not be reached or failed to execute a query.
  #[error("storage error: {0}")]
  TransientIo(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn validation(message: impl Into<String>) -> Self {
    Self::Validation(message.into())
  }

  pub fn io(source: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::TransientIo(Box::new(source))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
