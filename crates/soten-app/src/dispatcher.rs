//! Event dispatcher
//!
//! Routes each event to the one handler registered for its kind and runs the
//! resulting chain: a handler returns at most one follow-on event, which the
//! dispatcher checks against the transition table and dispatches next. Each
//! step is awaited before the next one starts, so the mutations of a chain
//! are sequenced.
//!
//! ```text
//! Event → Handler → Option<Event> → (transition check) → Handler → ...
//! ```
//!
//! A chain carries the sync generation it belongs to. Handlers that start a
//! new generation advance it; handlers that commit sync results check that
//! their chain is still current first.

use crate::events::{Event, EventKind, WireError};
use crate::handlers::{
    ErrorHandler, Handler, NavigationHandler, RepositoryHandler, Services, SessionHandler,
    SyncHandler,
};
use crate::store::Store;
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use strum::IntoEnumIterator;

/// Generation bookkeeping of one dispatch chain
#[derive(Debug)]
pub struct Chain {
    generation: AtomicU64,
}

impl Chain {
    /// Chain belonging to the store's current generation
    pub fn start(store: &Store) -> Self {
        Self {
            generation: AtomicU64::new(store.generation()),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Start a new generation owned by this chain
    pub(crate) fn advance(&self, store: &Store) {
        let generation = store.advance_generation();
        self.generation.store(generation, Ordering::SeqCst);
    }

    /// Whether no newer chain has started since
    pub fn is_current(&self, store: &Store) -> bool {
        self.generation() == store.generation()
    }
}

pub struct Dispatcher {
    store: Arc<Store>,
    handlers: HashMap<EventKind, Arc<dyn Handler>>,
}

impl Dispatcher {
    /// Dispatcher without any handlers
    pub fn new(store: Arc<Store>) -> Self {
        Self {
            store,
            handlers: HashMap::new(),
        }
    }

    /// Dispatcher with the standard handler for every event
    pub fn with_services(store: Arc<Store>, services: &Services) -> Self {
        let mut dispatcher = Self::new(store);
        dispatcher.register(
            &[EventKind::Authenticated, EventKind::Logout],
            Arc::new(SessionHandler::new(services.mirror.clone())),
        );
        dispatcher.register(
            &[EventKind::FetchAndSelectRepos, EventKind::SelectRepo],
            Arc::new(RepositoryHandler::new(
                services.remote.clone(),
                services.mirror.clone(),
            )),
        );
        dispatcher.register(
            &[
                EventKind::FetchRepoFiles,
                EventKind::ReadRepoFilesContent,
                EventKind::RepoReady,
            ],
            Arc::new(SyncHandler::new(
                services.sync.clone(),
                services.mirror.clone(),
                services.config.clone(),
            )),
        );
        dispatcher.register(
            &[EventKind::ShowNote, EventKind::ShowFront],
            Arc::new(NavigationHandler),
        );
        dispatcher.register(&[EventKind::Error], Arc::new(ErrorHandler));
        dispatcher
    }

    /// Register `handler` for each of `kinds`, replacing any previous one
    pub fn register(&mut self, kinds: &[EventKind], handler: Arc<dyn Handler>) {
        for kind in kinds {
            if self.handlers.insert(*kind, handler.clone()).is_some() {
                warn!("Replacing handler for {}", kind);
            }
        }
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Dispatch an event and run its chain to the end
    pub async fn dispatch(&self, event: Event) {
        let chain = Chain::start(&self.store);
        let max_steps = EventKind::iter().count();
        let mut next = Some(event);
        let mut steps = 0;

        while let Some(event) = next.take() {
            steps += 1;
            if steps > max_steps {
                error!("Event chain exceeded {} steps, stopping at {}", max_steps, event.kind());
                break;
            }

            let kind = event.kind();
            info!("Received event {}", kind);
            debug!("Payload of {}: {:?}", kind, event);

            let Some(handler) = self.handlers.get(&kind) else {
                warn!("Unimplemented event received: {}", kind);
                break;
            };

            let emitted = handler.handle(&event, &self.store, &chain).await;
            if let Some(follow_up) = &emitted {
                if !kind.may_emit(follow_up.kind()) {
                    error!(
                        "Illegal transition {} -> {}, dropping chain",
                        kind,
                        follow_up.kind()
                    );
                    break;
                }
            }
            next = emitted;
        }
    }

    /// Decode and dispatch an event given in wire form
    ///
    /// Unknown tags and malformed payloads are logged and dropped.
    pub async fn dispatch_wire(&self, tag: &str, payload: &str) {
        let payload = if payload.trim().is_empty() {
            Ok(serde_json::Value::Null)
        } else {
            serde_json::from_str(payload)
        };

        let event = payload
            .map_err(|source| match tag.parse::<EventKind>() {
                Ok(event) => WireError::InvalidPayload { event, source },
                Err(_) => WireError::UnknownEvent(tag.to_string()),
            })
            .and_then(|payload| Event::from_wire(tag, payload));

        match event {
            Ok(event) => self.dispatch(event).await,
            Err(e @ WireError::UnknownEvent(_)) => warn!("{}", e),
            Err(e) => error!("{}", e),
        }
    }
}
