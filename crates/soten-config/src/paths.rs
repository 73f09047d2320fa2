//! Configuration and data directory paths
//!
//! Uses XDG directories via `dirs` crate with fallbacks.
//!
//! Platform-specific locations:
//! - Linux: `~/.config/soten/`, `~/.local/share/soten/`
//! - macOS: `~/Library/Application Support/soten/`
//! - Windows: `%APPDATA%\soten\`

use anyhow::{Context, Result};
use std::path::PathBuf;

const APP_NAME: &str = "soten";

/// Get the application config directory
pub fn config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Could not determine config directory")?;
    let dir = base.join(APP_NAME);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Get the application data directory
pub fn data_dir() -> Result<PathBuf> {
    let base = dirs::data_dir().context("Could not determine data directory")?;
    let dir = base.join(APP_NAME);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Directory holding the persisted key-value records (session, selected repo)
pub fn state_dir() -> Result<PathBuf> {
    let dir = data_dir()?.join("state");
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Default on-disk root of the local mirror store
pub fn default_mirror_root() -> Result<PathBuf> {
    Ok(data_dir()?.join("mirror"))
}

/// Get path to app config file
pub fn app_config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_dir_is_below_data_dir() {
        let data = data_dir().unwrap();
        let state = state_dir().unwrap();
        assert!(state.exists());
        assert!(state.starts_with(&data));
        assert!(data.ends_with(APP_NAME));
    }

    #[test]
    fn test_mirror_root_path() {
        let root = default_mirror_root().unwrap();
        assert!(root.ends_with("mirror"));
    }
}
