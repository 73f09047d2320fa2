//! Sync handler
//!
//! Handles `FetchRepoFiles`, `ReadRepoFilesContent` and `RepoReady`: brings
//! the mirror up to date, enumerates it and materializes the file map.
//! Every step holds the mirror lock and bails out as soon as its chain's
//! generation is no longer current, so a superseded chain neither touches
//! the mirror of a newer selection nor reports errors about an old one.

use super::{fail, BoxFuture, Handler};
use crate::dispatcher::Chain;
use crate::error::ControllerError;
use crate::events::{Event, EventKind};
use crate::state::FileMap;
use crate::store::Store;
use futures::future::join_all;
use log::{debug, info, warn};
use soten_config::AppConfig;
use soten_mirror::{MirrorStore, MirrorSync};
use std::sync::Arc;

pub struct SyncHandler {
    sync: Arc<dyn MirrorSync>,
    mirror: Arc<dyn MirrorStore>,
    config: AppConfig,
}

impl SyncHandler {
    pub fn new(
        sync: Arc<dyn MirrorSync>,
        mirror: Arc<dyn MirrorStore>,
        config: AppConfig,
    ) -> Self {
        Self {
            sync,
            mirror,
            config,
        }
    }

    async fn fetch_files(&self, store: &Store, chain: &Chain) -> Option<Event> {
        let origin = EventKind::FetchRepoFiles;
        let _mirror = store.lock_mirror().await;
        if !chain.is_current(store) {
            info!("Skipping sync of a superseded selection");
            return None;
        }
        let (Some(repo), Some(session)) = (store.selected_repo.get(), store.session.get()) else {
            return fail(origin, ControllerError::InvalidSyncState);
        };

        let synced = if self.sync.is_initialized().await {
            info!("Pulling {}", repo);
            self.sync.pull(&session).await
        } else {
            let url = self.config.clone_url(&repo);
            info!("Cloning {}", repo);
            match self.sync.clone_repo(&url, &session).await {
                Ok(()) => {
                    self.sync
                        .set_identity(&session.username, &session.email)
                        .await
                }
                Err(e) => {
                    // Only this chain has touched the mirror since it took the lock
                    if let Err(wipe_err) = self.mirror.wipe().await {
                        warn!("Failed to clean up after clone failure: {}", wipe_err);
                    }
                    Err(e)
                }
            }
        };

        if !chain.is_current(store) {
            info!("Discarding sync of {}, selection changed meanwhile", repo);
            return None;
        }
        if let Err(e) = synced {
            return fail(origin, e.into());
        }

        let listed = self.mirror.list_files().await;
        if !chain.is_current(store) {
            info!("Discarding stale file listing of {}", repo);
            return None;
        }
        let files = match listed {
            Ok(files) => files,
            Err(e) => return fail(origin, ControllerError::Enumerate(e)),
        };

        debug!("{} lists {} files", repo, files.len());
        store.filename_list.set(files);
        Some(Event::ReadRepoFilesContent)
    }

    async fn read_contents(&self, store: &Store, chain: &Chain) -> Option<Event> {
        let _mirror = store.lock_mirror().await;
        if !chain.is_current(store) {
            info!("Discarding stale file contents");
            return None;
        }

        let filenames = store.filename_list.get();
        let reads = filenames.iter().map(|path| async move {
            let content = self.mirror.read_file(path).await;
            (path, content)
        });

        let mut files = FileMap::new();
        for (path, content) in join_all(reads).await {
            match content {
                Ok(content) => {
                    files.insert(path.clone(), content);
                }
                Err(e) => debug!("Skipping unreadable file {}: {}", path, e),
            }
        }

        if !chain.is_current(store) {
            info!("Discarding stale file contents");
            return None;
        }

        store.file_map.set(files);
        store.ready.set(true);
        Some(Event::RepoReady)
    }

    fn ready(&self, store: &Store) -> Option<Event> {
        store.error_message.set(None);
        let count = store.file_map.with(|files| files.len());
        let repo = store
            .selected_repo
            .get()
            .map(|repo| repo.full_name())
            .unwrap_or_default();
        info!("Repository {} ready with {} files", repo, count);
        None
    }
}

impl Handler for SyncHandler {
    fn handle<'a>(
        &'a self,
        event: &'a Event,
        store: &'a Store,
        chain: &'a Chain,
    ) -> BoxFuture<'a, Option<Event>> {
        Box::pin(async move {
            match event {
                Event::FetchRepoFiles => self.fetch_files(store, chain).await,
                Event::ReadRepoFilesContent => self.read_contents(store, chain).await,
                Event::RepoReady => self.ready(store),
                _ => None,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{mock_session, FakeMirror, MirrorCall};
    use soten_config::RepoRef;
    use soten_mirror::FileContent;

    fn handler(mirror: &Arc<FakeMirror>) -> SyncHandler {
        SyncHandler::new(mirror.clone(), mirror.clone(), AppConfig::default())
    }

    fn selected_store() -> Store {
        let store = Store::in_memory();
        store.session.set(Some(mock_session()));
        store.selected_repo.set(Some(RepoRef::new("acme", "notes")));
        store
    }

    fn text(content: &str) -> FileContent {
        FileContent::Text(content.to_string())
    }

    async fn run(handler: &SyncHandler, event: Event, store: &Store) -> Option<Event> {
        handler.handle(&event, store, &Chain::start(store)).await
    }

    #[tokio::test]
    async fn test_fetch_without_selection_touches_nothing() {
        let mirror = Arc::new(FakeMirror::new());
        let handler = handler(&mirror);

        for store in [Store::in_memory(), {
            let store = Store::in_memory();
            store.selected_repo.set(Some(RepoRef::new("acme", "notes")));
            store
        }] {
            let next = run(&handler, Event::FetchRepoFiles, &store).await;
            assert_eq!(
                next,
                Some(Event::Error {
                    event: Some(EventKind::FetchRepoFiles),
                    message: "Invalid state when fetching files".to_string()
                })
            );
        }
        assert!(mirror.calls().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_clones_fresh_mirror() {
        let mirror = Arc::new(FakeMirror::new());
        mirror.add_remote(
            "https://github.com/acme/notes.git",
            &[("/soten/readme.md", text("# Readme"))],
        );
        let handler = handler(&mirror);
        let store = selected_store();

        let next = run(&handler, Event::FetchRepoFiles, &store).await;

        assert_eq!(next, Some(Event::ReadRepoFilesContent));
        assert_eq!(store.filename_list.get(), vec!["/soten/readme.md".to_string()]);
        assert_eq!(
            mirror.calls(),
            vec![
                MirrorCall::Clone {
                    url: "https://github.com/acme/notes.git".to_string(),
                    username: "testuser".to_string(),
                },
                MirrorCall::SetIdentity {
                    name: "testuser".to_string(),
                    email: "test@example.com".to_string(),
                },
                MirrorCall::List,
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_pulls_existing_mirror() {
        let mirror = Arc::new(FakeMirror::new());
        mirror.set_initialized(&[("/soten/a.md", text("# A")), ("/soten/b.md", text("# B"))]);
        let handler = handler(&mirror);
        let store = selected_store();

        let next = run(&handler, Event::FetchRepoFiles, &store).await;

        assert_eq!(next, Some(Event::ReadRepoFilesContent));
        assert_eq!(
            store.filename_list.get(),
            vec!["/soten/a.md".to_string(), "/soten/b.md".to_string()]
        );
        assert_eq!(
            mirror.calls(),
            vec![
                MirrorCall::Pull {
                    username: "testuser".to_string()
                },
                MirrorCall::List,
            ]
        );
    }

    #[tokio::test]
    async fn test_clone_failure_wipes_partial_mirror() {
        let mirror = Arc::new(FakeMirror::new());
        mirror.fail_next_clone("fatal: Authentication failed");
        let handler = handler(&mirror);
        let store = selected_store();

        let next = run(&handler, Event::FetchRepoFiles, &store).await;

        assert_eq!(
            next,
            Some(Event::Error {
                event: Some(EventKind::FetchRepoFiles),
                message: "Failed to sync repository: authentication rejected by remote: fatal: Authentication failed"
                    .to_string()
            })
        );
        assert_eq!(
            mirror.calls().last(),
            Some(&MirrorCall::Wipe),
            "partial clone must be removed"
        );
        assert!(store.filename_list.get().is_empty());
    }

    #[tokio::test]
    async fn test_pull_failure_is_reported() {
        let mirror = Arc::new(FakeMirror::new());
        mirror.set_initialized(&[("/soten/a.md", text("# A"))]);
        mirror.fail_pull("fatal: Not possible to fast-forward, aborting.");
        let handler = handler(&mirror);
        let store = selected_store();

        let next = run(&handler, Event::FetchRepoFiles, &store).await;

        assert!(matches!(
            next,
            Some(Event::Error {
                event: Some(EventKind::FetchRepoFiles),
                ..
            })
        ));
        assert!(!mirror.calls().contains(&MirrorCall::List));
    }

    #[tokio::test]
    async fn test_superseded_fetch_leaves_mirror_alone() {
        let mirror = Arc::new(FakeMirror::new());
        mirror.add_remote(
            "https://github.com/acme/notes.git",
            &[("/soten/readme.md", text("# Readme"))],
        );
        let handler = handler(&mirror);
        let store = selected_store();

        let chain = Chain::start(&store);
        store.advance_generation();
        let next = handler.handle(&Event::FetchRepoFiles, &store, &chain).await;

        assert_eq!(next, None);
        assert!(mirror.calls().is_empty());
        assert!(!mirror.has_file("/soten/readme.md"));
        assert!(store.filename_list.get().is_empty());
    }

    #[tokio::test]
    async fn test_failed_reads_are_dropped() {
        let mirror = Arc::new(FakeMirror::new());
        mirror.set_initialized(&[("/soten/a.md", text("# A"))]);
        let handler = handler(&mirror);
        let store = selected_store();
        store
            .filename_list
            .set(vec!["/soten/a.md".to_string(), "/soten/b.md".to_string()]);

        let next = run(&handler, Event::ReadRepoFilesContent, &store).await;

        assert_eq!(next, Some(Event::RepoReady));
        assert_eq!(
            store.file_map.get(),
            FileMap::from([("/soten/a.md".to_string(), text("# A"))])
        );
        assert!(store.ready.get());
    }

    #[tokio::test]
    async fn test_file_map_keys_are_readable_subset_of_listing() {
        let listings: [&[&str]; 4] = [
            &[],
            &["/soten/a.md"],
            &["/soten/missing.md", "/soten/a.md", "/soten/img/cat.png"],
            &["/soten/x.md", "/soten/y.md"],
        ];
        let mirror = Arc::new(FakeMirror::new());
        mirror.set_initialized(&[
            ("/soten/a.md", text("# A")),
            ("/soten/img/cat.png", text("not really a png")),
            ("/soten/unlisted.md", text("# Unlisted")),
        ]);
        let handler = handler(&mirror);

        for listing in listings {
            let store = selected_store();
            store
                .filename_list
                .set(listing.iter().map(|path| path.to_string()).collect());

            run(&handler, Event::ReadRepoFilesContent, &store).await;

            let readable: Vec<String> = listing
                .iter()
                .filter(|path| mirror.has_file(path))
                .map(|path| path.to_string())
                .collect();
            let mut keys: Vec<String> = store.file_map.get().into_keys().collect();
            let mut expected = readable.clone();
            keys.sort();
            expected.sort();
            assert_eq!(keys, expected, "listing {listing:?}");
        }
    }

    #[tokio::test]
    async fn test_stale_contents_are_discarded() {
        let mirror = Arc::new(FakeMirror::new());
        mirror.set_initialized(&[("/soten/a.md", text("# A"))]);
        let handler = handler(&mirror);
        let store = selected_store();
        store.filename_list.set(vec!["/soten/a.md".to_string()]);

        let chain = Chain::start(&store);
        store.advance_generation();
        let next = handler
            .handle(&Event::ReadRepoFilesContent, &store, &chain)
            .await;

        assert_eq!(next, None);
        assert!(store.file_map.get().is_empty());
        assert!(!store.ready.get());
    }

    #[tokio::test]
    async fn test_repo_ready_clears_error() {
        let mirror = Arc::new(FakeMirror::new());
        let handler = handler(&mirror);
        let store = selected_store();
        store.error_message.set(Some("Failed to fetch repos".to_string()));

        assert_eq!(run(&handler, Event::RepoReady, &store).await, None);
        assert!(store.error_message.get().is_none());
    }
}
