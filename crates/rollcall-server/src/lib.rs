//! HTTP server for Rollcall.
//!
//! Mounts the JSON API under `/api` behind HTTP Basic authentication and
//! request tracing, and seeds the configured subjects on startup.

pub mod auth;
pub mod error;

pub use error::Error;

use std::{collections::HashSet, path::PathBuf, sync::Arc};

use axum::{Router, middleware};
use rollcall_core::{cache::CacheConfig, store::AttendanceStore, subject::NewSubject};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use auth::{AuthConfig, require_auth};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  #[serde(default)]
  pub users:      Vec<UserConfig>,
  /// Subjects created at startup when their code is not yet present.
  #[serde(default)]
  pub subjects:   Vec<NewSubject>,
  /// Query cache bounds; `[cache]` in the TOML file.
  #[serde(default)]
  pub cache:      CacheConfig,
}

/// One account allowed to use the API.
#[derive(Deserialize, Clone)]
pub struct UserConfig {
  pub username:      String,
  /// Stamped on every attendance record this user marks.
  pub user_id:       Uuid,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

// ─── Application state ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct AppState<S: AttendanceStore> {
  pub store: Arc<S>,
  pub auth:  Arc<AuthConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the top-level axum [`Router`].
pub fn router<S>(state: AppState<S>) -> Router
where
  S: AttendanceStore + Clone + Send + Sync + 'static,
{
  let api = rollcall_api::api_router(state.store)
    .layer(middleware::from_fn_with_state(state.auth, require_auth));

  Router::new()
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
}

// ─── Seeding ─────────────────────────────────────────────────────────────────

/// Add each subject in `seed` whose code is not already stored. Returns the
/// number added; running it twice adds nothing the second time.
pub async fn seed_subjects<S: AttendanceStore>(
  store: &S,
  seed: &[NewSubject],
) -> Result<usize, S::Error> {
  let existing: HashSet<String> = store
    .list_subjects()
    .await?
    .into_iter()
    .map(|s| s.code)
    .collect();

  let mut added = 0;
  for subject in seed.iter().filter(|s| !existing.contains(&s.code)) {
    store.add_subject(subject.clone()).await?;
    info!(code = %subject.code, "seeded subject");
    added += 1;
  }
  Ok(added)
}

// ─── Integration tests ────────────────────────────────────────────────────────
