//! Local repository mirror for soten
//!
//! A mirror is the on-device copy of one remote repository's working tree.
//! This crate provides:
//! - `MirrorSync`: clone/pull of the remote into the mirror (git CLI backed)
//! - `MirrorStore`: enumeration, reads and wipes of the mirrored files
//! - File classification into text and binary content
//! - The allow-list policy of the relay that forwards git wire requests

pub mod content;
pub mod error;
pub mod layout;
pub mod relay;
pub mod store;
pub mod sync;

pub use content::{classify, mime_type, Blob, ContentKind, FileContent};
pub use error::{StoreError, SyncError};
pub use layout::MirrorLayout;
pub use relay::{RelayDecision, RelayPolicy};
pub use store::{FsMirrorStore, MirrorStore};
pub use sync::{GitCliMirror, MirrorSync};
