//! Controller errors
//!
//! Handlers never return errors to the dispatcher. Each failure is turned
//! into an `Event::Error` whose message is the `Display` form of the error.

use crate::events::{Event, EventKind};
use soten_mirror::{StoreError, SyncError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("Invalid installationId or token")]
    MissingSession,
    #[error("Failed to fetch repos")]
    FetchFailed,
    #[error("No repos found")]
    NoRepos,
    #[error("Failed to sync repository: {0}")]
    Sync(#[from] SyncError),
    #[error("Failed to list repository files: {0}")]
    Enumerate(#[source] StoreError),
    #[error("Failed to clear local mirror: {0}")]
    Wipe(#[source] StoreError),
    #[error("Invalid state when fetching files")]
    InvalidSyncState,
    #[error("Repository {0} is not accessible")]
    RepoNotAccessible(String),
}

/// Error family, as surfaced to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or invalid credentials
    Session,
    /// Repository listing failed or was empty
    Fetch,
    /// Clone, pull or mirror maintenance failed
    Sync,
    /// Required upstream state is missing
    State,
}

impl ControllerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ControllerError::MissingSession => ErrorKind::Session,
            ControllerError::FetchFailed | ControllerError::NoRepos => ErrorKind::Fetch,
            ControllerError::Sync(_) | ControllerError::Enumerate(_) | ControllerError::Wipe(_) => {
                ErrorKind::Sync
            }
            ControllerError::InvalidSyncState | ControllerError::RepoNotAccessible(_) => {
                ErrorKind::State
            }
        }
    }

    /// Error event reported on behalf of the handler of `origin`
    pub fn into_event(self, origin: EventKind) -> Event {
        Event::Error {
            event: Some(origin),
            message: self.to_string(),
        }
    }
}
