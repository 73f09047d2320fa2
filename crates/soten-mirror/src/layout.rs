//! Mapping between virtual mirror paths and the filesystem
//!
//! Files are addressed by absolute virtual paths below the repository
//! directory (`/soten/notes/today.md`). On disk the repository directory
//! lives below the mirror root.

use crate::error::StoreError;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorLayout {
    root: PathBuf,
    repo_dir: String,
}

impl MirrorLayout {
    /// `repo_dir` is normalized to a single leading slash and no trailing slash
    pub fn new(root: impl Into<PathBuf>, repo_dir: &str) -> Self {
        let trimmed = repo_dir.trim_matches('/');
        Self {
            root: root.into(),
            repo_dir: format!("/{}", trimmed),
        }
    }

    /// Virtual repository directory, e.g. `/soten`
    pub fn repo_dir(&self) -> &str {
        &self.repo_dir
    }

    /// On-disk repository directory
    pub fn repo_path(&self) -> PathBuf {
        self.root.join(self.repo_dir.trim_start_matches('/'))
    }

    /// Resolve a virtual path to its on-disk location
    pub fn to_disk(&self, virtual_path: &str) -> Result<PathBuf, StoreError> {
        let relative = virtual_path
            .strip_prefix(&self.repo_dir)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|rest| !rest.is_empty())
            .ok_or_else(|| StoreError::InvalidPath(virtual_path.to_string()))?;

        let relative = Path::new(relative);
        if !relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
        {
            return Err(StoreError::InvalidPath(virtual_path.to_string()));
        }

        Ok(self.repo_path().join(relative))
    }

    /// Virtual path of a file given its path relative to the repository directory
    pub fn to_virtual(&self, relative: &Path) -> String {
        let parts: Vec<_> = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect();
        format!("{}/{}", self.repo_dir, parts.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> MirrorLayout {
        MirrorLayout::new("/data/mirror", "/soten/")
    }

    #[test]
    fn test_repo_dir_is_normalized() {
        assert_eq!(layout().repo_dir(), "/soten");
        assert_eq!(layout().repo_path(), PathBuf::from("/data/mirror/soten"));
    }

    #[test]
    fn test_to_disk() {
        assert_eq!(
            layout().to_disk("/soten/notes/today.md").unwrap(),
            PathBuf::from("/data/mirror/soten/notes/today.md")
        );
    }

    #[test]
    fn test_to_disk_rejects_escapes() {
        assert!(layout().to_disk("/soten/../etc/passwd").is_err());
        assert!(layout().to_disk("/other/readme.md").is_err());
        assert!(layout().to_disk("/sotenx/readme.md").is_err());
        assert!(layout().to_disk("/soten/").is_err());
    }

    #[test]
    fn test_to_virtual() {
        assert_eq!(
            layout().to_virtual(Path::new("notes/today.md")),
            "/soten/notes/today.md"
        );
    }
}
