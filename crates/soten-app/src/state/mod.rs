//! State of the controller
//!
//! The state is a set of cells rather than one struct: consumers subscribe to
//! the cells they render, and handlers replace cell values one at a time.
//! Cells are read-only outside this crate.

mod cell;

pub use cell::{PersistedCell, StateCell};

use soten_mirror::FileContent;
use std::collections::BTreeMap;

/// Materialized content of the selected repository, keyed by virtual path
pub type FileMap = BTreeMap<String, FileContent>;

/// Bootstrap progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppPhase {
    #[default]
    Initializing,
    Initialized,
}

/// Whether a session is held
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthStatus {
    #[default]
    Unauthenticated,
    Authenticated,
}

/// What the view layer shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Front,
    Note,
}
