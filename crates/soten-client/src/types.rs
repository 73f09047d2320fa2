//! Remote API data transfer objects
//!
//! Only the fields the controller reads are modelled; everything else in the
//! platform's payloads is ignored during deserialization.

use serde::{Deserialize, Serialize};

/// The authenticated user (`GET /user`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Login name
    pub login: String,
}

/// A repository entry of an installation listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// `owner/repo`
    pub full_name: String,
}

/// One page of `GET /user/installations/{id}/repositories`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallationRepositories {
    /// Total number of repositories across all pages
    #[serde(default)]
    pub total_count: u64,
    pub repositories: Vec<Repository>,
}

impl InstallationRepositories {
    pub fn full_names(&self) -> impl Iterator<Item = String> + '_ {
        self.repositories.iter().map(|repo| repo.full_name.clone())
    }
}
