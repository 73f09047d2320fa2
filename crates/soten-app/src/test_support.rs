//! Hand-written fakes of the external collaborators

use async_trait::async_trait;
use soten_client::{CurrentUser, RemoteApi};
use soten_config::Session;
use soten_mirror::{FileContent, MirrorStore, MirrorSync, StoreError, SyncError};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub fn mock_session() -> Session {
    Session::new("testuser", "tok_123", "inst_456", "test@example.com")
}

/// Outcome of a fake remote call
#[derive(Clone)]
enum Reply<T> {
    Value(T),
    Rejected,
    Failed,
}

impl<T: Clone> Reply<T> {
    fn get(&self) -> anyhow::Result<Option<T>> {
        match self {
            Reply::Value(value) => Ok(Some(value.clone())),
            Reply::Rejected => Ok(None),
            Reply::Failed => Err(anyhow::anyhow!("connection reset")),
        }
    }
}

/// Remote API fake with canned replies
pub struct FakeRemote {
    user: Reply<CurrentUser>,
    repos: Reply<Vec<String>>,
    user_calls: Mutex<Vec<String>>,
    repo_calls: Mutex<Vec<(String, String)>>,
}

impl FakeRemote {
    fn new(user: Reply<CurrentUser>, repos: Reply<Vec<String>>) -> Self {
        Self {
            user,
            repos,
            user_calls: Mutex::new(Vec::new()),
            repo_calls: Mutex::new(Vec::new()),
        }
    }

    /// Accepts any token as `testuser` and lists `repos`
    pub fn with_repos(repos: &[&str]) -> Self {
        Self::new(
            Reply::Value(CurrentUser {
                login: "testuser".to_string(),
            }),
            Reply::Value(repos.iter().map(|repo| repo.to_string()).collect()),
        )
    }

    /// Rejects every token
    pub fn rejecting() -> Self {
        Self::new(Reply::Rejected, Reply::Rejected)
    }

    /// Accepts tokens but answers the listing with a non-success status
    pub fn failing_repos() -> Self {
        Self::new(
            Reply::Value(CurrentUser {
                login: "testuser".to_string(),
            }),
            Reply::Rejected,
        )
    }

    /// Every call fails at the transport level
    pub fn erroring() -> Self {
        Self::new(Reply::Failed, Reply::Failed)
    }

    pub fn user_calls(&self) -> Vec<String> {
        self.user_calls.lock().unwrap().clone()
    }

    pub fn repo_calls(&self) -> Vec<(String, String)> {
        self.repo_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteApi for FakeRemote {
    async fn current_user(&self, token: &str) -> anyhow::Result<Option<CurrentUser>> {
        self.user_calls.lock().unwrap().push(token.to_string());
        self.user.get()
    }

    async fn installation_repositories(
        &self,
        installation_id: &str,
        token: &str,
    ) -> anyhow::Result<Option<Vec<String>>> {
        self.repo_calls
            .lock()
            .unwrap()
            .push((installation_id.to_string(), token.to_string()));
        self.repos.get()
    }
}

/// Calls recorded by `FakeMirror`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorCall {
    Clone { url: String, username: String },
    Pull { username: String },
    SetIdentity { name: String, email: String },
    List,
    Wipe,
}

/// Holds the first clone until released
pub struct CloneGate {
    pub started: Notify,
    pub release: Notify,
}

/// Mirror sync and store fake over an in-memory file tree
///
/// Clones install the files registered for the cloned URL.
#[derive(Default)]
pub struct FakeMirror {
    initialized: AtomicBool,
    files: Mutex<BTreeMap<String, FileContent>>,
    remotes: Mutex<HashMap<String, Vec<(String, FileContent)>>>,
    clone_failure: Mutex<Option<String>>,
    pull_failure: Mutex<Option<String>>,
    wipe_fails: AtomicBool,
    gate: Mutex<Option<Arc<CloneGate>>>,
    calls: Mutex<Vec<MirrorCall>>,
}

impl FakeMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the files a clone of `url` produces
    pub fn add_remote(&self, url: &str, files: &[(&str, FileContent)]) {
        let files = files
            .iter()
            .map(|(path, content)| (path.to_string(), content.clone()))
            .collect();
        self.remotes.lock().unwrap().insert(url.to_string(), files);
    }

    /// Start out with an existing mirror holding `files`
    pub fn set_initialized(&self, files: &[(&str, FileContent)]) {
        self.initialized.store(true, Ordering::SeqCst);
        *self.files.lock().unwrap() = files
            .iter()
            .map(|(path, content)| (path.to_string(), content.clone()))
            .collect();
    }

    /// The next clone is rejected by the remote
    pub fn fail_next_clone(&self, stderr: &str) {
        *self.clone_failure.lock().unwrap() = Some(stderr.to_string());
    }

    /// Pulls are not fast-forwards
    pub fn fail_pull(&self, stderr: &str) {
        *self.pull_failure.lock().unwrap() = Some(stderr.to_string());
    }

    pub fn fail_wipe(&self) {
        self.wipe_fails.store(true, Ordering::SeqCst);
    }

    /// Make the next clone wait for `release` after signalling `started`
    pub fn gate_next_clone(&self) -> Arc<CloneGate> {
        let gate = Arc::new(CloneGate {
            started: Notify::new(),
            release: Notify::new(),
        });
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn has_file(&self, path: &str) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    pub fn calls(&self) -> Vec<MirrorCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: MirrorCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl MirrorSync for FakeMirror {
    async fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    async fn clone_repo(&self, url: &str, credentials: &Session) -> Result<(), SyncError> {
        self.record(MirrorCall::Clone {
            url: url.to_string(),
            username: credentials.username.clone(),
        });

        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.started.notify_one();
            gate.release.notified().await;
        }

        if let Some(stderr) = self.clone_failure.lock().unwrap().take() {
            return Err(SyncError::AuthRejected(stderr));
        }

        let files = self
            .remotes
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_default();
        *self.files.lock().unwrap() = files.into_iter().collect();
        self.initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn pull(&self, credentials: &Session) -> Result<(), SyncError> {
        self.record(MirrorCall::Pull {
            username: credentials.username.clone(),
        });
        match self.pull_failure.lock().unwrap().clone() {
            Some(stderr) => Err(SyncError::NonFastForward(stderr)),
            None => Ok(()),
        }
    }

    async fn set_identity(&self, name: &str, email: &str) -> Result<(), SyncError> {
        self.record(MirrorCall::SetIdentity {
            name: name.to_string(),
            email: email.to_string(),
        });
        Ok(())
    }
}

#[async_trait]
impl MirrorStore for FakeMirror {
    async fn list_files(&self) -> Result<Vec<String>, StoreError> {
        self.record(MirrorCall::List);
        Ok(self.files.lock().unwrap().keys().cloned().collect())
    }

    async fn read_file(&self, path: &str) -> Result<FileContent, StoreError> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    async fn wipe(&self) -> Result<(), StoreError> {
        self.record(MirrorCall::Wipe);
        if self.wipe_fails.load(Ordering::SeqCst) {
            return Err(StoreError::Io {
                path: "/soten".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            });
        }
        self.files.lock().unwrap().clear();
        self.initialized.store(false, Ordering::SeqCst);
        Ok(())
    }
}
