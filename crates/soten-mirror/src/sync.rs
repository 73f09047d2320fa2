//! Mirror synchronization
//!
//! Brings the mirror in line with the remote repository. The git CLI
//! implementation runs `git` through `tokio::process`; credentials are passed
//! as an extra HTTP header on the command line and never written to the
//! repository config or the remote URL.

use crate::error::SyncError;
use crate::layout::MirrorLayout;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::{debug, info};
use soten_config::Session;
use std::path::{Path, PathBuf};

/// Clone/pull of the remote repository into the mirror
#[async_trait]
pub trait MirrorSync: Send + Sync {
    /// Whether a mirror has already been cloned
    async fn is_initialized(&self) -> bool;

    /// Shallow, single-branch clone of `url` into the mirror
    async fn clone_repo(&self, url: &str, credentials: &Session) -> Result<(), SyncError>;

    /// Fast-forward-only pull of the existing mirror
    async fn pull(&self, credentials: &Session) -> Result<(), SyncError>;

    /// Configure the committer identity of the mirror
    async fn set_identity(&self, name: &str, email: &str) -> Result<(), SyncError>;
}

/// A git invocation; the auth header is kept apart so it never reaches logs
struct GitCommand<'a> {
    args: Vec<&'a str>,
    auth_header: Option<String>,
    cwd: Option<&'a Path>,
}

impl<'a> GitCommand<'a> {
    fn new(args: Vec<&'a str>) -> Self {
        Self {
            args,
            auth_header: None,
            cwd: None,
        }
    }

    fn authenticated(mut self, credentials: &Session) -> Self {
        self.auth_header = Some(auth_header(credentials));
        self
    }

    fn in_dir(mut self, cwd: &'a Path) -> Self {
        self.cwd = Some(cwd);
        self
    }

    fn display(&self) -> String {
        self.args.join(" ")
    }
}

fn auth_header(credentials: &Session) -> String {
    let basic = STANDARD.encode(format!("x-access-token:{}", credentials.token));
    format!("http.extraHeader=Authorization: Basic {}", basic)
}

/// Map git's stderr onto the sync error taxonomy
pub(crate) fn classify_failure(command: String, status: i32, stderr: &str) -> SyncError {
    let message = stderr.trim().to_string();
    let lower = message.to_lowercase();

    let auth_markers = [
        "authentication failed",
        "could not read username",
        "could not read password",
        "returned error: 401",
        "returned error: 403",
        "permission denied",
        "repository not found",
    ];
    let fast_forward_markers = [
        "not possible to fast-forward",
        "diverging branches",
        "non-fast-forward",
    ];
    let network_markers = [
        "could not resolve host",
        "unable to access",
        "failed to connect",
        "connection timed out",
        "connection refused",
        "early eof",
    ];

    if auth_markers.iter().any(|marker| lower.contains(marker)) {
        SyncError::AuthRejected(message)
    } else if fast_forward_markers.iter().any(|marker| lower.contains(marker)) {
        SyncError::NonFastForward(message)
    } else if network_markers.iter().any(|marker| lower.contains(marker)) {
        SyncError::Network(message)
    } else {
        SyncError::CommandFailed {
            command,
            status,
            stderr: message,
        }
    }
}

/// Mirror sync backed by the `git` executable
#[derive(Debug, Clone)]
pub struct GitCliMirror {
    layout: MirrorLayout,
    program: PathBuf,
}

impl GitCliMirror {
    pub fn new(layout: MirrorLayout) -> Self {
        Self {
            layout,
            program: PathBuf::from("git"),
        }
    }

    /// Use a specific git executable
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    async fn run(&self, command: GitCommand<'_>) -> Result<String, SyncError> {
        debug!("Running git {}", command.display());

        let mut process = tokio::process::Command::new(&self.program);
        process.env("GIT_TERMINAL_PROMPT", "0");
        if let Some(header) = &command.auth_header {
            process.arg("-c").arg(header);
        }
        process.args(&command.args);
        if let Some(cwd) = command.cwd {
            process.current_dir(cwd);
        }

        let output = process.output().await?;
        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).to_string());
        }

        Err(classify_failure(
            command.display(),
            output.status.code().unwrap_or(-1),
            &String::from_utf8_lossy(&output.stderr),
        ))
    }
}

#[async_trait]
impl MirrorSync for GitCliMirror {
    async fn is_initialized(&self) -> bool {
        let git_dir = self.layout.repo_path().join(".git");
        tokio::fs::try_exists(&git_dir).await.unwrap_or(false)
    }

    async fn clone_repo(&self, url: &str, credentials: &Session) -> Result<(), SyncError> {
        let repo_path = self.layout.repo_path();
        if let Some(parent) = repo_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let target = repo_path.to_string_lossy().to_string();

        info!("Cloning {} into {}", url, target);
        self.run(
            GitCommand::new(vec![
                "clone",
                "--depth",
                "1",
                "--single-branch",
                "--no-tags",
                url,
                &target,
            ])
            .authenticated(credentials),
        )
        .await?;
        Ok(())
    }

    async fn pull(&self, credentials: &Session) -> Result<(), SyncError> {
        let repo_path = self.layout.repo_path();

        info!("Pulling mirror at {:?}", repo_path);
        self.run(
            GitCommand::new(vec!["pull", "--ff-only"])
                .authenticated(credentials)
                .in_dir(&repo_path),
        )
        .await?;
        Ok(())
    }

    async fn set_identity(&self, name: &str, email: &str) -> Result<(), SyncError> {
        let repo_path = self.layout.repo_path();
        self.run(GitCommand::new(vec!["config", "user.name", name]).in_dir(&repo_path))
            .await?;
        self.run(GitCommand::new(vec!["config", "user.email", email]).in_dir(&repo_path))
            .await?;
        Ok(())
    }
}
