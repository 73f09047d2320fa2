//! Mirror error types

use thiserror::Error;

/// Failure to bring the mirror in line with the remote
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("authentication rejected by remote: {0}")]
    AuthRejected(String),
    #[error("network failure: {0}")]
    Network(String),
    #[error("pull is not a fast-forward: {0}")]
    NonFastForward(String),
    #[error("git command failed: git {command} (exit {status}) {stderr}")]
    CommandFailed {
        command: String,
        status: i32,
        stderr: String,
    },
    #[error("mirror i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure to read or manage files of the mirror
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("path is outside the mirror: {0}")]
    InvalidPath(String),
    #[error("file is not valid UTF-8: {0}")]
    InvalidUtf8(String),
    #[error("i/o error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            StoreError::NotFound(path)
        } else {
            StoreError::Io { path, source }
        }
    }
}
