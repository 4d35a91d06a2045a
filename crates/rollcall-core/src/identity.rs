//! The authenticated actor on whose behalf writes are made.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Resolved by the transport layer (HTTP Basic auth in `rollcall-server`)
/// and handed to the workflows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
  pub user_id:  Uuid,
  pub username: String,
}

impl Actor {
  /// Turn an optional identity into the actor, or fail with
  /// [`Error::AuthenticationRequired`].
  pub fn require(actor: Option<&Actor>) -> Result<&Actor> {
    actor.ok_or(Error::AuthenticationRequired)
  }
}
