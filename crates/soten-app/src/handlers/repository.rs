//! Repository handler
//!
//! Handles `FetchAndSelectRepos` and `SelectRepo`.
//!
//! # Selection rules
//!
//! - A cached selection still present in the fresh listing resumes sync
//!   directly, without re-selection
//! - A cached selection missing from the listing is dropped with a warning
//! - With no usable selection, a sole listed repository is selected
//!   automatically; longer listings wait for the user

use super::{fail, BoxFuture, Handler};
use crate::dispatcher::Chain;
use crate::error::ControllerError;
use crate::events::{Event, EventKind};
use crate::store::Store;
use log::{info, warn};
use soten_client::RemoteApi;
use soten_config::RepoRef;
use soten_mirror::MirrorStore;
use std::sync::Arc;

pub struct RepositoryHandler {
    remote: Arc<dyn RemoteApi>,
    mirror: Arc<dyn MirrorStore>,
}

impl RepositoryHandler {
    pub fn new(remote: Arc<dyn RemoteApi>, mirror: Arc<dyn MirrorStore>) -> Self {
        Self { remote, mirror }
    }

    async fn fetch_and_select(&self, store: &Store, chain: &Chain) -> Option<Event> {
        let origin = EventKind::FetchAndSelectRepos;
        let Some(session) = store.session.get() else {
            return fail(origin, ControllerError::MissingSession);
        };

        let listing = self
            .remote
            .installation_repositories(&session.installation_id, &session.token)
            .await;
        if !chain.is_current(store) {
            info!("Discarding stale repository listing");
            return None;
        }

        let repos = match listing {
            Ok(Some(repos)) => repos,
            Ok(None) => return fail(origin, ControllerError::FetchFailed),
            Err(e) => {
                warn!("Repository listing failed: {}", e);
                return fail(origin, ControllerError::FetchFailed);
            }
        };
        if repos.is_empty() {
            return fail(origin, ControllerError::NoRepos);
        }

        info!("Installation grants access to {} repositories", repos.len());
        store.repo_list.set(repos.clone());
        store.error_message.set(None);

        if let Some(selected) = store.selected_repo.get() {
            if selected.is_listed_in(&repos) {
                info!("Resuming sync of {}", selected);
                return Some(Event::FetchRepoFiles);
            }
            warn!("Selected repository {} is no longer accessible", selected);
        }

        store.selected_repo.set(None);
        store.clear_repo_content();

        match repos.as_slice() {
            [only] => match only.parse::<RepoRef>() {
                Ok(repo) => Some(Event::SelectRepo(repo)),
                Err(e) => {
                    warn!("Cannot select listed repository: {}", e);
                    None
                }
            },
            _ => None,
        }
    }

    async fn select(&self, repo: &RepoRef, store: &Store, chain: &Chain) -> Option<Event> {
        let origin = EventKind::SelectRepo;
        let known = store.repo_list.get();
        if !known.is_empty() && !repo.is_listed_in(&known) {
            return fail(origin, ControllerError::RepoNotAccessible(repo.full_name()));
        }

        chain.advance(store);
        info!("Selected repository {}", repo);
        store.selected_repo.set(Some(repo.clone()));
        store.clear_repo_content();

        // The mirror no longer matches the selection, whether or not this
        // chain is still current
        let wiped = {
            let _mirror = store.lock_mirror().await;
            self.mirror.wipe().await
        };
        if !chain.is_current(store) {
            info!("Selection of {} superseded", repo);
            return None;
        }
        if let Err(e) = wiped {
            return fail(origin, ControllerError::Wipe(e));
        }
        Some(Event::FetchRepoFiles)
    }
}

impl Handler for RepositoryHandler {
    fn handle<'a>(
        &'a self,
        event: &'a Event,
        store: &'a Store,
        chain: &'a Chain,
    ) -> BoxFuture<'a, Option<Event>> {
        Box::pin(async move {
            match event {
                Event::FetchAndSelectRepos => self.fetch_and_select(store, chain).await,
                Event::SelectRepo(repo) => self.select(repo, store, chain).await,
                _ => None,
            }
        })
    }
}
