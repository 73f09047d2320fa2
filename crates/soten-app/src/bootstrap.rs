//! Bootstrap and routing
//!
//! Runs once on startup and decides the first event from the URL fragment
//! and the persisted session:
//!
//! 1. `auth_error` in the fragment: show it, stop
//! 2. A complete OAuth payload: authenticate with it, stop
//! 3. Otherwise re-validate the persisted session (or log out)
//!
//! Once initialized, a remaining navigation fragment is routed. Later
//! fragment changes only re-run routing.

use crate::dispatcher::Dispatcher;
use crate::events::Event;
use crate::fragment::{parse_fragment, Fragment};
use crate::location::Location;
use crate::state::AppPhase;
use crate::store::Store;
use log::{debug, info, warn};
use soten_client::RemoteApi;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Result of an `init` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    Completed,
    /// Another `init` is in flight
    AlreadyRunning,
    AlreadyInitialized,
}

pub struct Bootstrap {
    dispatcher: Arc<Dispatcher>,
    remote: Arc<dyn RemoteApi>,
    location: Arc<dyn Location>,
    in_flight: AtomicBool,
}

impl Bootstrap {
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        remote: Arc<dyn RemoteApi>,
        location: Arc<dyn Location>,
    ) -> Self {
        Self {
            dispatcher,
            remote,
            location,
            in_flight: AtomicBool::new(false),
        }
    }

    fn store(&self) -> &Store {
        self.dispatcher.store()
    }

    /// Run the startup sequence; repeated or concurrent calls are no-ops
    pub async fn init(&self) -> InitOutcome {
        if self.store().app_phase.get() == AppPhase::Initialized {
            return InitOutcome::AlreadyInitialized;
        }
        if self.in_flight.swap(true, Ordering::SeqCst) {
            debug!("Bootstrap already running");
            return InitOutcome::AlreadyRunning;
        }

        self.run().await;
        self.in_flight.store(false, Ordering::SeqCst);
        InitOutcome::Completed
    }

    async fn run(&self) {
        match parse_fragment(&self.location.fragment()) {
            Fragment::AuthError(message) => {
                warn!("Sign-in failed: {}", message);
                self.store().auth_error_message.set(Some(message));
                self.location.clear_fragment();
                self.mark_initialized();
                return;
            }
            Fragment::OAuth(session) => {
                info!("Signed in via OAuth redirect");
                self.location.clear_fragment();
                self.dispatcher
                    .dispatch(Event::Authenticated(session))
                    .await;
                self.mark_initialized();
                return;
            }
            Fragment::IncompleteAuth => {
                warn!("Ignoring incomplete OAuth redirect");
                self.location.clear_fragment();
            }
            Fragment::Empty | Fragment::Route(_) => {}
        }

        self.restore_session().await;
        self.mark_initialized();
        self.route().await;
    }

    /// Re-validate the persisted session, or log out when there is none
    async fn restore_session(&self) {
        let Some(session) = self.store().take_pending_session() else {
            debug!("No persisted session");
            self.dispatcher.dispatch(Event::Logout).await;
            return;
        };

        match self.remote.current_user(&session.token).await {
            Ok(Some(user)) => {
                info!("Persisted session of {} is still valid", user.login);
                self.dispatcher
                    .dispatch(Event::Authenticated(session))
                    .await;
            }
            Ok(None) => {
                info!("Persisted session was rejected");
                self.dispatcher.dispatch(Event::Logout).await;
            }
            Err(e) => {
                warn!("Failed to validate persisted session: {}", e);
                self.dispatcher.dispatch(Event::Logout).await;
            }
        }
    }

    fn mark_initialized(&self) {
        self.store().app_phase.set(AppPhase::Initialized);
    }

    /// Dispatch the view event for the current navigation fragment
    async fn route(&self) {
        if let Fragment::Route(path) = parse_fragment(&self.location.fragment()) {
            let event = if path == "/" {
                Event::ShowFront
            } else {
                Event::ShowNote { path }
            };
            self.dispatcher.dispatch(event).await;
        }
    }

    /// React to a fragment change after startup
    pub async fn on_fragment_change(&self) {
        if self.store().app_phase.get() != AppPhase::Initialized {
            debug!("Ignoring fragment change during startup");
            return;
        }
        self.route().await;
    }
}
