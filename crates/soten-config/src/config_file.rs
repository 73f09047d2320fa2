//! Config file discovery
//!
//! `.soten.toml` in the working directory wins over `~/.soten.toml`, which
//! wins over `config.toml` in the platform config directory. The first
//! readable candidate is used; unreadable ones are skipped.

use crate::paths;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = ".soten.toml";

/// Candidate config files, most specific first
pub fn config_file_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from(CONFIG_FILE)];
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(CONFIG_FILE));
    }
    if let Ok(path) = paths::app_config_path() {
        candidates.push(path);
    }
    candidates
}

/// Content of the first readable config file, with its path
pub fn load_config_file() -> Option<(PathBuf, String)> {
    read_first(&config_file_candidates())
}

fn read_first(candidates: &[PathBuf]) -> Option<(PathBuf, String)> {
    candidates.iter().find_map(|path| read(path))
}

fn read(path: &Path) -> Option<(PathBuf, String)> {
    match std::fs::read_to_string(path) {
        Ok(content) => Some((path.to_path_buf(), content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            log::warn!("Skipping config file {}: {}", path.display(), e);
            None
        }
    }
}
