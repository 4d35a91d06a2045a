//! HTTP Basic authentication resolving the acting [`Actor`].

use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::{Request, State},
  http::{HeaderMap, header},
  middleware::Next,
  response::Response,
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use rollcall_core::identity::Actor;
use tracing::debug;

use crate::{UserConfig, error::Error};

/// Accounts accepted by this server instance.
#[derive(Clone, Default)]
pub struct AuthConfig {
  pub users: Vec<UserConfig>,
}

impl AuthConfig {
  fn find(&self, username: &str) -> Option<&UserConfig> {
    self.users.iter().find(|u| u.username == username)
  }
}

/// Verify Basic credentials from `headers` and resolve the matching user.
pub fn verify_auth(headers: &HeaderMap, config: &AuthConfig) -> Result<Actor, Error> {
  let header_val = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(Error::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(Error::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| Error::Unauthorized)?;
  let creds   = std::str::from_utf8(&decoded).map_err(|_| Error::Unauthorized)?;

  let (username, password) = creds.split_once(':').ok_or(Error::Unauthorized)?;
  let user = config.find(username).ok_or(Error::Unauthorized)?;

  let parsed_hash = PasswordHash::new(&user.password_hash)
    .map_err(|_| Error::Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| Error::Unauthorized)?;

  Ok(Actor { user_id: user.user_id, username: user.username.clone() })
}

/// Middleware: reject unauthenticated requests, otherwise attach the
/// [`Actor`] to the request for the API handlers.
pub async fn require_auth(
  State(config): State<Arc<AuthConfig>>,
  mut req: Request,
  next: Next,
) -> Result<Response, Error> {
  let actor = verify_auth(req.headers(), &config)?;
  debug!(username = %actor.username, "authenticated");
  req.extensions_mut().insert(actor);
  Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
  use argon2::{PasswordHasher, password_hash::SaltString};
  use axum::http::HeaderValue;
  use rand_core::OsRng;
  use uuid::Uuid;

  use super::*;

  fn make_config(password: &str) -> AuthConfig {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string();

    AuthConfig {
      users: vec![UserConfig {
        username:      "teacher".to_string(),
        user_id:       Uuid::from_u128(7),
        password_hash: hash,
      }],
    }
  }

  fn headers(value: &str) -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    h
  }

  fn basic(user: &str, pass: &str) -> String {
    let encoded = B64.encode(format!("{user}:{pass}"));
    format!("Basic {encoded}")
  }

  #[test]
  fn correct_credentials_resolve_the_actor() {
    let config = make_config("secret");
    let actor = verify_auth(&headers(&basic("teacher", "secret")), &config).unwrap();
    assert_eq!(actor.user_id, Uuid::from_u128(7));
    assert_eq!(actor.username, "teacher");
  }

  #[test]
  fn wrong_password() {
    let config = make_config("secret");
    let res = verify_auth(&headers(&basic("teacher", "wrong")), &config);
    assert!(matches!(res, Err(Error::Unauthorized)));
  }

  #[test]
  fn unknown_user() {
    let config = make_config("secret");
    let res = verify_auth(&headers(&basic("principal", "secret")), &config);
    assert!(matches!(res, Err(Error::Unauthorized)));
  }

  #[test]
  fn missing_header() {
    let config = make_config("secret");
    assert!(matches!(verify_auth(&HeaderMap::new(), &config), Err(Error::Unauthorized)));
  }

  #[test]
  fn invalid_base64() {
    let config = make_config("secret");
    let res = verify_auth(&headers("Basic !!!not-base64!!!"), &config);
    assert!(matches!(res, Err(Error::Unauthorized)));
  }
}
