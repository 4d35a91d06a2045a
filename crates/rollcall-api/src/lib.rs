//! JSON REST API for Rollcall.
//!
//! Exposes an axum [`Router`] backed by any
//! [`rollcall_core::store::AttendanceStore`]. Authentication, TLS and
//! transport concerns are the caller's responsibility: whoever mounts the
//! router inserts the authenticated [`Actor`] into request extensions.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", rollcall_api::api_router(store.clone()))
//! ```

pub mod analytics;
pub mod attendance;
pub mod error;
pub mod students;
pub mod subjects;

use std::{convert::Infallible, sync::Arc};

use axum::{
  Router,
  extract::FromRequestParts,
  http::request::Parts,
  routing::get,
};
use rollcall_core::{identity::Actor, store::AttendanceStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: AttendanceStore + Clone + Send + Sync + 'static,
{
  Router::new()
    // Students
    .route("/students", get(students::list::<S>).post(students::register::<S>))
    .route("/students/{id}", get(students::get_one::<S>))
    .route("/students/{id}/history", get(students::history::<S>))
    // Subjects
    .route("/subjects", get(subjects::list::<S>))
    // Attendance
    .route("/attendance", get(attendance::list::<S>).put(attendance::mark::<S>))
    .route("/attendance/sheet", get(attendance::sheet::<S>))
    // Reports
    .route("/analytics", get(analytics::report::<S>))
    .route("/dashboard", get(analytics::dashboard::<S>))
    .with_state(store)
}

/// The actor placed in request extensions by the authentication layer, if
/// any. Never rejects; workflows decide whether an actor is required.
pub struct CurrentActor(pub Option<Actor>);

impl<St: Send + Sync> FromRequestParts<St> for CurrentActor {
  type Rejection = Infallible;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &St,
  ) -> Result<Self, Self::Rejection> {
    Ok(Self(parts.extensions.get::<Actor>().cloned()))
  }
}

#[cfg(test)]
mod tests;
