//! State store
//!
//! Holds every state cell of the controller plus the sync generation. The
//! store is shared by reference between the dispatcher, the handlers and the
//! bootstrap; tests build isolated instances over an in-memory key-value
//! store.
//!
//! # Persistence
//!
//! - `selected_repo` is restored from the key-value store on construction
//! - The persisted session is held back as the *pending session*; bootstrap
//!   re-validates it before it reaches the `session` cell, so the session
//!   cell is only ever filled together with `AuthStatus::Authenticated`
//!
//! # Mirror access
//!
//! The local mirror is shared by every chain. Handlers hold the mirror lock
//! for each step that touches it, so a wipe can never interleave with a
//! clone, pull or enumeration of another chain. The lock is fair, so steps
//! run in the order they asked for it.

use crate::state::{AppPhase, AuthStatus, FileMap, PersistedCell, StateCell, View};
use soten_config::{KeyValueStore, MemoryKeyValueStore, RepoRef, Session};
use soten_config::{SELECTED_REPO_KEY, SESSION_KEY};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, MutexGuard};

pub struct Store {
    pub session: PersistedCell<Session>,
    pub auth_status: StateCell<AuthStatus>,
    pub repo_list: StateCell<Vec<String>>,
    pub selected_repo: PersistedCell<RepoRef>,
    pub filename_list: StateCell<Vec<String>>,
    pub file_map: StateCell<FileMap>,
    pub ready: StateCell<bool>,
    pub view: StateCell<View>,
    pub current_path: StateCell<String>,
    pub error_message: StateCell<Option<String>>,
    pub auth_error_message: StateCell<Option<String>>,
    pub app_phase: StateCell<AppPhase>,
    pending_session: Mutex<Option<Session>>,
    generation: AtomicU64,
    mirror_lock: AsyncMutex<()>,
}

impl Store {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        let session = PersistedCell::empty(kv.clone(), SESSION_KEY);
        let pending_session = session.load();
        if pending_session.is_some() {
            log::info!("Found persisted session, awaiting validation");
        }

        Self {
            session,
            auth_status: StateCell::default(),
            repo_list: StateCell::default(),
            selected_repo: PersistedCell::restore(kv, SELECTED_REPO_KEY),
            filename_list: StateCell::default(),
            file_map: StateCell::default(),
            ready: StateCell::default(),
            view: StateCell::default(),
            current_path: StateCell::new("/".to_string()),
            error_message: StateCell::default(),
            auth_error_message: StateCell::default(),
            app_phase: StateCell::default(),
            pending_session: Mutex::new(pending_session),
            generation: AtomicU64::new(0),
            mirror_lock: AsyncMutex::new(()),
        }
    }

    /// Store without durable persistence
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryKeyValueStore::new()))
    }

    /// Take the persisted session that still awaits validation
    pub(crate) fn take_pending_session(&self) -> Option<Session> {
        self.pending_session
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
    }

    /// Current sync generation
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Start a new generation, invalidating every chain started before
    pub(crate) fn advance_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Exclusive access to the local mirror
    pub(crate) async fn lock_mirror(&self) -> MutexGuard<'_, ()> {
        self.mirror_lock.lock().await
    }

    /// Reset everything derived from the selected repository
    pub(crate) fn clear_repo_content(&self) {
        self.filename_list.set(Vec::new());
        self.file_map.set(FileMap::new());
        self.ready.set(false);
    }

    /// Reset everything derived from the session, except the selection
    pub(crate) fn clear_session_data(&self) {
        self.repo_list.set(Vec::new());
        self.clear_repo_content();
    }
}
