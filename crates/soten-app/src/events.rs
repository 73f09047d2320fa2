//! Event taxonomy
//!
//! Every state change of the controller starts with an `Event`. The wire
//! form is adjacently tagged: `{ "event": "<tag>", "payload": { ... } }`.
//!
//! `EventKind` is the field-less tag of an event. Its `successors` table is
//! the transition table of the controller: a handler may only emit events
//! listed for the kind it handles.

use serde::{Deserialize, Serialize};
use soten_config::{RepoRef, Session};
use std::str::FromStr;
use strum::{Display, EnumDiscriminants, EnumIter, EnumString};
use thiserror::Error;

/// Controller events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, EnumDiscriminants)]
#[strum_discriminants(name(EventKind))]
#[strum_discriminants(derive(Hash, Display, EnumString, EnumIter, Serialize, Deserialize))]
#[serde(tag = "event", content = "payload")]
pub enum Event {
    /// A session was established or re-validated
    Authenticated(Session),
    /// Drop the session and everything derived from it
    Logout,
    /// List the repositories of the session's installation
    FetchAndSelectRepos,
    /// Switch to a repository
    SelectRepo(RepoRef),
    /// Clone or pull the selected repository and enumerate its files
    FetchRepoFiles,
    /// Read every enumerated file into the file map
    ReadRepoFilesContent,
    /// The file map is complete
    RepoReady,
    /// Show one note
    ShowNote { path: String },
    /// Show the front page
    ShowFront,
    /// A handler failed; `event` names the handler's event
    Error {
        event: Option<EventKind>,
        message: String,
    },
}

impl Event {
    pub fn kind(&self) -> EventKind {
        EventKind::from(self)
    }

    /// Decode an event from its tag and JSON payload
    pub fn from_wire(tag: &str, payload: serde_json::Value) -> Result<Self, WireError> {
        let kind =
            EventKind::from_str(tag).map_err(|_| WireError::UnknownEvent(tag.to_string()))?;
        let invalid = |source| WireError::InvalidPayload { event: kind, source };

        let event = match kind {
            EventKind::Authenticated => {
                Event::Authenticated(serde_json::from_value(payload).map_err(invalid)?)
            }
            EventKind::SelectRepo => {
                Event::SelectRepo(serde_json::from_value(payload).map_err(invalid)?)
            }
            EventKind::ShowNote => {
                let NotePayload { path } = serde_json::from_value(payload).map_err(invalid)?;
                Event::ShowNote { path }
            }
            EventKind::Error => {
                let ErrorPayload { event, message } =
                    serde_json::from_value(payload).map_err(invalid)?;
                Event::Error { event, message }
            }
            EventKind::Logout => unit_event(kind, payload, Event::Logout)?,
            EventKind::FetchAndSelectRepos => {
                unit_event(kind, payload, Event::FetchAndSelectRepos)?
            }
            EventKind::FetchRepoFiles => unit_event(kind, payload, Event::FetchRepoFiles)?,
            EventKind::ReadRepoFilesContent => {
                unit_event(kind, payload, Event::ReadRepoFilesContent)?
            }
            EventKind::RepoReady => unit_event(kind, payload, Event::RepoReady)?,
            EventKind::ShowFront => unit_event(kind, payload, Event::ShowFront)?,
        };

        Ok(event)
    }
}

impl EventKind {
    /// Events a handler of this kind may emit
    pub fn successors(self) -> &'static [EventKind] {
        use EventKind::*;
        match self {
            Authenticated => &[FetchAndSelectRepos],
            FetchAndSelectRepos => &[SelectRepo, FetchRepoFiles, Error],
            SelectRepo => &[FetchRepoFiles, Error],
            FetchRepoFiles => &[ReadRepoFilesContent, Error],
            ReadRepoFilesContent => &[RepoReady],
            Logout | RepoReady | ShowNote | ShowFront | Error => &[],
        }
    }

    pub fn may_emit(self, next: EventKind) -> bool {
        self.successors().contains(&next)
    }
}

/// Events without fields accept a missing (`null`) or object payload
fn unit_event(
    kind: EventKind,
    payload: serde_json::Value,
    event: Event,
) -> Result<Event, WireError> {
    if !payload.is_null() {
        serde_json::from_value::<EmptyPayload>(payload)
            .map_err(|source| WireError::InvalidPayload { event: kind, source })?;
    }
    Ok(event)
}

#[derive(Deserialize)]
struct NotePayload {
    path: String,
}

#[derive(Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    event: Option<EventKind>,
    message: String,
}

#[derive(Deserialize)]
struct EmptyPayload {}

/// Failure to decode a wire event
#[derive(Debug, Error)]
pub enum WireError {
    #[error("Unimplemented event received: {0}")]
    UnknownEvent(String),
    #[error("Invalid payload for event {event}: {source}")]
    InvalidPayload {
        event: EventKind,
        #[source]
        source: serde_json::Error,
    },
}
