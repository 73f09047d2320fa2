//! Session handler
//!
//! Handles `Authenticated` and `Logout`. Both start a new sync generation,
//! so chains started under the previous session cannot commit afterwards.

use super::{BoxFuture, Handler};
use crate::dispatcher::Chain;
use crate::events::Event;
use crate::state::{AuthStatus, FileMap, View};
use crate::store::Store;
use log::{error, info};
use soten_config::Session;
use soten_mirror::MirrorStore;
use std::sync::Arc;

pub struct SessionHandler {
    mirror: Arc<dyn MirrorStore>,
}

impl SessionHandler {
    pub fn new(mirror: Arc<dyn MirrorStore>) -> Self {
        Self { mirror }
    }

    fn authenticated(&self, session: &Session, store: &Store, chain: &Chain) -> Option<Event> {
        chain.advance(store);
        store.auth_error_message.set(None);

        let switched_user = store
            .session
            .with(|previous| {
                previous
                    .as_ref()
                    .is_some_and(|p| p.username != session.username)
            });
        if switched_user {
            info!("Session changed to {}, clearing previous data", session.username);
            store.clear_session_data();
        }

        info!("Authenticated as {}", session.username);
        store.session.set(Some(session.clone()));
        store.auth_status.set(AuthStatus::Authenticated);
        Some(Event::FetchAndSelectRepos)
    }

    async fn logout(&self, store: &Store, chain: &Chain) -> Option<Event> {
        chain.advance(store);
        store.take_pending_session();

        store.session.set(None);
        store.auth_status.set(AuthStatus::Unauthenticated);
        store.selected_repo.set(None);
        store.repo_list.set(Vec::new());
        store.filename_list.set(Vec::new());
        store.file_map.set(FileMap::new());
        store.ready.set(false);
        store.error_message.set(None);
        store.view.set(View::Front);
        store.current_path.set("/".to_string());

        let _mirror = store.lock_mirror().await;
        if let Err(e) = self.mirror.wipe().await {
            error!("Failed to wipe mirror on logout: {}", e);
        }
        info!("Logged out");
        None
    }
}

impl Handler for SessionHandler {
    fn handle<'a>(
        &'a self,
        event: &'a Event,
        store: &'a Store,
        chain: &'a Chain,
    ) -> BoxFuture<'a, Option<Event>> {
        Box::pin(async move {
            match event {
                Event::Authenticated(session) => self.authenticated(session, store, chain),
                Event::Logout => self.logout(store, chain).await,
                _ => None,
            }
        })
    }
}
