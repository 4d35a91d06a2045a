//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("authentication required")]
  Unauthorized,

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Convert any store error via its mapping into the core error kinds.
  pub fn store<E: Into<rollcall_core::Error>>(e: E) -> Self {
    let core: rollcall_core::Error = e.into();
    core.into()
  }
}

impl From<rollcall_core::Error> for ApiError {
  fn from(e: rollcall_core::Error) -> Self {
    use rollcall_core::Error as E;
    match e {
      E::AuthenticationRequired => Self::Unauthorized,
      E::Validation(m) => Self::BadRequest(m),
      E::Conflict(m) => Self::Conflict(m),
      E::NotFound(m) => Self::NotFound(m),
      E::TransientIo(source) => Self::Store(source),
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Store(e) => (StatusCode::SERVICE_UNAVAILABLE, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
