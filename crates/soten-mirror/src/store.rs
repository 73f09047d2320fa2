//! Local mirror store
//!
//! Filesystem-like access to the mirrored repository: recursive
//! enumeration, reads by virtual path, and wiping the whole tree.

use crate::content::FileContent;
use crate::error::StoreError;
use crate::layout::MirrorLayout;
use async_trait::async_trait;
use log::debug;
use std::path::PathBuf;

/// Files of the mirrored repository
#[async_trait]
pub trait MirrorStore: Send + Sync {
    /// All file paths of the mirror, recursively, excluding dot-entries
    async fn list_files(&self) -> Result<Vec<String>, StoreError>;

    /// Read and classify one file
    async fn read_file(&self, path: &str) -> Result<FileContent, StoreError>;

    /// Remove every mirrored file
    async fn wipe(&self) -> Result<(), StoreError>;
}

/// Mirror store on the local filesystem
#[derive(Debug, Clone)]
pub struct FsMirrorStore {
    layout: MirrorLayout,
}

impl FsMirrorStore {
    pub fn new(layout: MirrorLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &MirrorLayout {
        &self.layout
    }
}

#[async_trait]
impl MirrorStore for FsMirrorStore {
    async fn list_files(&self) -> Result<Vec<String>, StoreError> {
        let repo_path = self.layout.repo_path();
        if !tokio::fs::try_exists(&repo_path)
            .await
            .map_err(|e| StoreError::io(repo_path.display().to_string(), e))?
        {
            debug!("Mirror directory {:?} does not exist yet", repo_path);
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        let mut pending: Vec<PathBuf> = vec![PathBuf::new()];

        while let Some(relative_dir) = pending.pop() {
            let dir = repo_path.join(&relative_dir);
            let mut entries = tokio::fs::read_dir(&dir)
                .await
                .map_err(|e| StoreError::io(dir.display().to_string(), e))?;

            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| StoreError::io(dir.display().to_string(), e))?
            {
                let name = entry.file_name();
                if name.to_string_lossy().starts_with('.') {
                    continue;
                }

                let relative = relative_dir.join(&name);
                let file_type = entry
                    .file_type()
                    .await
                    .map_err(|e| StoreError::io(relative.display().to_string(), e))?;

                // Symlinked directories are listed, not followed
                if file_type.is_dir() {
                    pending.push(relative);
                } else {
                    files.push(self.layout.to_virtual(&relative));
                }
            }
        }

        files.sort();
        debug!("Mirror contains {} files", files.len());
        Ok(files)
    }

    async fn read_file(&self, path: &str) -> Result<FileContent, StoreError> {
        let disk_path = self.layout.to_disk(path)?;
        let bytes = tokio::fs::read(&disk_path)
            .await
            .map_err(|e| StoreError::io(path, e))?;
        FileContent::decode(path, bytes)
    }

    async fn wipe(&self) -> Result<(), StoreError> {
        let repo_path = self.layout.repo_path();
        match tokio::fs::remove_dir_all(&repo_path).await {
            Ok(()) => debug!("Wiped mirror at {:?}", repo_path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(StoreError::io(repo_path.display().to_string(), e)),
        }
        Ok(())
    }
}
