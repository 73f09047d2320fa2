//! Authenticated session
//!
//! Created from a successful OAuth redirect or a re-validated persisted session.
//! Serialized with camelCase keys, which is the shape stored under the `user` key.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Credentials and identity of the signed-in user
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub username: String,
    pub token: String,
    pub installation_id: String,
    pub email: String,
}

impl Session {
    pub fn new(
        username: impl Into<String>,
        token: impl Into<String>,
        installation_id: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            token: token.into(),
            installation_id: installation_id.into(),
            email: email.into(),
        }
    }
}

// Tokens must never end up in logs
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .field("installation_id", &self.installation_id)
            .field("email", &self.email)
            .finish()
    }
}
