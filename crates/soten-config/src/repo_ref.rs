//! Repository reference
//!
//! A repository is identified by owner and name. The remote API lists
//! repositories in their `owner/repo` form, so both conversions live here.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Repository selected for synchronization
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    /// User or organization owning the repository
    pub owner: String,
    /// Repository name
    pub repo: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// The `owner/repo` form used by the repository listing
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// Whether this repository is a member of a `owner/repo` listing
    pub fn is_listed_in(&self, repos: &[String]) -> bool {
        let full_name = self.full_name();
        repos.iter().any(|name| *name == full_name)
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl FromStr for RepoRef {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
                Ok(Self::new(owner, repo))
            }
            _ => Err(anyhow::anyhow!(
                "Invalid repository '{}', expected owner/repo",
                s
            )),
        }
    }
}
