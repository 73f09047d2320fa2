//! Session and sync controller of the soten note viewer
//!
//! An event-driven state machine that establishes a session, selects a
//! repository, keeps a local mirror of it in sync and materializes its
//! files into observable state cells.
//!
//! ## Design
//!
//! ```text
//! Bootstrap → Dispatcher → Handler → Store
//!                 ↑            │
//!                 └─ follow-on event (checked against the transition table)
//! ```
//!
//! - `Store`: the state cells, subscribable through `tokio::sync::watch`
//! - `Dispatcher`: one handler per event kind, runs chains to completion
//! - `handlers`: the effects of each event, talking to the collaborators
//!   in `Services` (remote API, mirror sync, mirror store)
//! - `Bootstrap`: picks the first event from the URL fragment and the
//!   persisted session
//!
//! ## Example
//!
//! ```rust,no_run
//! use soten::{Bootstrap, Dispatcher, MemoryLocation, Services, Store};
//! use soten_config::{AppConfig, FileKeyValueStore};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = AppConfig::load();
//! let services = Services::from_config(&config)?;
//! let store = Arc::new(Store::new(Arc::new(FileKeyValueStore::open_default()?)));
//! let dispatcher = Arc::new(Dispatcher::with_services(store.clone(), &services));
//! let location = Arc::new(MemoryLocation::new("#/"));
//!
//! Bootstrap::new(dispatcher, services.remote.clone(), location)
//!     .init()
//!     .await;
//! println!("{} files ready", store.file_map.get().len());
//! # Ok(())
//! # }
//! ```

pub mod bootstrap;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod fragment;
pub mod handlers;
pub mod location;
pub mod logger;
pub mod state;
pub mod store;

#[cfg(test)]
mod test_support;

pub use bootstrap::{Bootstrap, InitOutcome};
pub use dispatcher::{Chain, Dispatcher};
pub use error::{ControllerError, ErrorKind};
pub use events::{Event, EventKind, WireError};
pub use handlers::Services;
pub use location::{Location, MemoryLocation};
pub use state::{AppPhase, AuthStatus, FileMap, View};
pub use store::Store;
