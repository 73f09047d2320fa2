//! Application configuration
//!
//! Configuration loaded from .soten.toml (working directory, then home) or
//! from config.toml in the platform config directory.

use crate::{paths, RepoRef, DEFAULT_HOST};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const CLIENT_ID_ENV: &str = "SOTEN_CLIENT_ID";

/// Application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Git host repositories are cloned from
    #[serde(default = "default_host")]
    pub host: String,

    /// Base URL of the hosting platform's REST API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Virtual directory the mirror is checked out into; file paths are reported below it
    #[serde(default = "default_repo_dir")]
    pub repo_dir: String,

    /// On-disk root of the mirror store (platform data dir when unset)
    #[serde(default)]
    pub mirror_root: Option<String>,

    /// OAuth application client id
    #[serde(default)]
    pub client_id: Option<String>,

    /// Path prefix accepted by the git relay
    #[serde(default = "default_relay_prefix")]
    pub relay_prefix: String,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_api_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_repo_dir() -> String {
    "/soten".to_string()
}

fn default_relay_prefix() -> String {
    "/api/cors-proxy/".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            api_base_url: default_api_base_url(),
            repo_dir: default_repo_dir(),
            mirror_root: None,
            client_id: None,
            relay_prefix: default_relay_prefix(),
        }
    }
}

impl AppConfig {
    /// Load the first config file found, or use defaults
    ///
    /// `SOTEN_CLIENT_ID` overrides the configured client id.
    pub fn load() -> Self {
        let mut config = Self::load_file().unwrap_or_else(|| {
            log::debug!("Using default app config");
            Self::default()
        });

        if let Ok(client_id) = std::env::var(CLIENT_ID_ENV) {
            if !client_id.is_empty() {
                config.client_id = Some(client_id);
            }
        }

        config
    }

    fn load_file() -> Option<Self> {
        let (path, content) = crate::load_config_file()?;

        match toml::from_str(&content) {
            Ok(config) => {
                log::info!("Loaded app config from {}", path.display());
                Some(config)
            }
            Err(e) => {
                log::warn!("Failed to parse config file {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Remote URL a repository is cloned from
    pub fn clone_url(&self, repo: &RepoRef) -> String {
        format!("https://{}/{}/{}.git", self.host, repo.owner, repo.repo)
    }

    /// Resolve the on-disk mirror root
    pub fn mirror_root(&self) -> anyhow::Result<PathBuf> {
        match &self.mirror_root {
            Some(root) => Ok(PathBuf::from(root)),
            None => paths::default_mirror_root(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.host, "github.com");
        assert_eq!(config.api_base_url, "https://api.github.com");
        assert_eq!(config.repo_dir, "/soten");
        assert!(config.client_id.is_none());
        assert!(config.mirror_root.is_none());
    }

    #[test]
    fn test_config_deserialize_partial() {
        let toml = r#"
            host = "ghe.example.com"
            client_id = "Iv1.abc"
        "#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.host, "ghe.example.com");
        assert_eq!(config.client_id.as_deref(), Some("Iv1.abc"));
        // Other fields should use defaults
        assert_eq!(config.repo_dir, "/soten");
        assert_eq!(config.relay_prefix, "/api/cors-proxy/");
    }

    #[test]
    fn test_clone_url() {
        let config = AppConfig::default();
        let url = config.clone_url(&RepoRef::new("acme", "notes"));
        assert_eq!(url, "https://github.com/acme/notes.git");
    }

    #[test]
    fn test_explicit_mirror_root() {
        let config = AppConfig {
            mirror_root: Some("/tmp/soten-mirror".to_string()),
            ..AppConfig::default()
        };
        assert_eq!(
            config.mirror_root().unwrap(),
            PathBuf::from("/tmp/soten-mirror")
        );
    }
}
