//! Event handlers
//!
//! One handler owns each event kind. A handler reads and writes the store,
//! calls its collaborators, and returns the follow-on event (if any) instead
//! of dispatching it. The dispatcher runs the chain.
//!
//! ## Example
//!
//! ```rust,ignore
//! struct PingHandler;
//!
//! impl Handler for PingHandler {
//!     fn handle<'a>(
//!         &'a self,
//!         _event: &'a Event,
//!         store: &'a Store,
//!         _chain: &'a Chain,
//!     ) -> BoxFuture<'a, Option<Event>> {
//!         Box::pin(async move {
//!             store.ready.set(true);
//!             None // end of chain
//!         })
//!     }
//! }
//! ```

use crate::dispatcher::Chain;
use crate::error::ControllerError;
use crate::events::{Event, EventKind};
use crate::store::Store;
use soten_client::{OctocrabClient, RemoteApi};
use soten_config::AppConfig;
use soten_mirror::{FsMirrorStore, GitCliMirror, MirrorLayout, MirrorStore, MirrorSync};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

mod error;
mod navigation;
mod repository;
mod session;
mod sync;

pub use error::ErrorHandler;
pub use navigation::NavigationHandler;
pub use repository::RepositoryHandler;
pub use session::SessionHandler;
pub use sync::SyncHandler;

/// BoxFuture type alias for async handlers
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Handler trait - performs the effects of one or more event kinds
pub trait Handler: Send + Sync {
    /// Handle an event
    ///
    /// # Parameters
    /// - `event`: The event being dispatched
    /// - `store`: The state store
    /// - `chain`: Generation bookkeeping of the running chain
    ///
    /// # Returns
    /// The follow-on event, or `None` to end the chain
    fn handle<'a>(
        &'a self,
        event: &'a Event,
        store: &'a Store,
        chain: &'a Chain,
    ) -> BoxFuture<'a, Option<Event>>;
}

/// External collaborators of the handlers
#[derive(Clone)]
pub struct Services {
    pub remote: Arc<dyn RemoteApi>,
    pub sync: Arc<dyn MirrorSync>,
    pub mirror: Arc<dyn MirrorStore>,
    pub config: AppConfig,
}

impl Services {
    /// Production collaborators: octocrab, git CLI and the filesystem mirror
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let layout = MirrorLayout::new(config.mirror_root()?, &config.repo_dir);
        Ok(Self {
            remote: Arc::new(OctocrabClient::new(config.api_base_url.clone())),
            sync: Arc::new(GitCliMirror::new(layout.clone())),
            mirror: Arc::new(FsMirrorStore::new(layout)),
            config: config.clone(),
        })
    }
}

/// Report `err` as the outcome of the handler for `origin`
fn fail(origin: EventKind, err: ControllerError) -> Option<Event> {
    log::warn!("{} failed ({:?}): {}", origin, err.kind(), err);
    Some(err.into_event(origin))
}
