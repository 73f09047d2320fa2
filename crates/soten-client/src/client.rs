//! Remote API trait
//!
//! Defines the interface the session controller uses to talk to the
//! hosting platform. Implementations can hit the API directly or be
//! replaced by fakes in tests.

use crate::types::CurrentUser;
use async_trait::async_trait;

/// Hosting platform API consumed by the session controller
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow sharing across
/// async tasks.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Look up the user a token belongs to
    ///
    /// # Returns
    ///
    /// - `Ok(Some(user))` when the token is valid
    /// - `Ok(None)` when the platform rejects the token (401/403)
    /// - `Err` for any other failure
    async fn current_user(&self, token: &str) -> anyhow::Result<Option<CurrentUser>>;

    /// List the repositories an app installation grants the user access to
    ///
    /// # Arguments
    ///
    /// * `installation_id` - App installation identifier
    /// * `token` - User access token
    ///
    /// # Returns
    ///
    /// `owner/repo` names in platform order, or `Ok(None)` when the
    /// platform answers with a non-success status.
    async fn installation_repositories(
        &self,
        installation_id: &str,
        token: &str,
    ) -> anyhow::Result<Option<Vec<String>>>;
}
