//! Octocrab-based remote API client
//!
//! Direct implementation of the `RemoteApi` trait using the octocrab library.
//! Every call authenticates with the token it is given, so one client serves
//! any number of sessions.

use crate::client::RemoteApi;
use crate::types::{CurrentUser, InstallationRepositories};
use async_trait::async_trait;
use log::{debug, error, warn};
use octocrab::Octocrab;

const PER_PAGE: u32 = 100;
const MAX_PAGES: u32 = 50;

/// Direct remote API client using octocrab
#[derive(Debug, Clone)]
pub struct OctocrabClient {
    api_base_url: String,
}

impl OctocrabClient {
    /// Create a client for the given API base URL (e.g. `https://api.github.com`)
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
        }
    }

    fn octocrab(&self, token: &str) -> anyhow::Result<Octocrab> {
        let octocrab = Octocrab::builder()
            .base_uri(self.api_base_url.as_str())?
            .personal_token(token.to_string())
            .build()?;
        Ok(octocrab)
    }
}

/// Status code of a platform error response, if the error is one
fn status_code(err: &octocrab::Error) -> Option<u16> {
    match err {
        octocrab::Error::GitHub { source, .. } => Some(source.status_code.as_u16()),
        _ => None,
    }
}

/// Whether a status means the platform rejected the credentials
pub(crate) fn is_token_rejection(status: u16) -> bool {
    matches!(status, 401 | 403)
}

#[async_trait]
impl RemoteApi for OctocrabClient {
    async fn current_user(&self, token: &str) -> anyhow::Result<Option<CurrentUser>> {
        debug!("Fetching current user");

        let octocrab = self.octocrab(token)?;
        match octocrab.get::<CurrentUser, _, ()>("/user", None).await {
            Ok(user) => Ok(Some(user)),
            Err(err) => match status_code(&err) {
                Some(status) if is_token_rejection(status) => {
                    debug!("Token rejected by user endpoint ({})", status);
                    Ok(None)
                }
                Some(status) => Err(anyhow::anyhow!(
                    "Unexpected status code returned from user endpoint: {}",
                    status
                )),
                None => Err(err.into()),
            },
        }
    }

    async fn installation_repositories(
        &self,
        installation_id: &str,
        token: &str,
    ) -> anyhow::Result<Option<Vec<String>>> {
        debug!("Fetching repositories for installation {}", installation_id);

        let octocrab = self.octocrab(token)?;
        let route = format!("/user/installations/{}/repositories", installation_id);
        let mut names = Vec::new();
        let mut page_num = 1u32;

        loop {
            let params = [("per_page", PER_PAGE), ("page", page_num)];
            let page: InstallationRepositories = match octocrab.get(&route, Some(&params)).await
            {
                Ok(page) => page,
                Err(err) => {
                    error!(
                        "Failed to fetch repositories for installation {}: {}",
                        installation_id, err
                    );
                    return Ok(None);
                }
            };

            let page_is_empty = page.repositories.is_empty();
            names.extend(page.full_names());

            if page_is_empty || names.len() as u64 >= page.total_count {
                break;
            }
            if page_num >= MAX_PAGES {
                warn!(
                    "Stopping repository listing after {} pages ({} of {} repositories)",
                    MAX_PAGES,
                    names.len(),
                    page.total_count
                );
                break;
            }

            page_num += 1;
        }

        if names.is_empty() {
            warn!("No repositories found for the installation");
        }

        debug!(
            "Fetched {} repositories for installation {}",
            names.len(),
            installation_id
        );
        Ok(Some(names))
    }
}
