//! Remote API client for soten
//!
//! This crate provides a trait-based client for the two hosting platform
//! endpoints the note viewer consumes, plus the OAuth authorize URL helper.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │               RemoteApi trait                    │
//! │  - current_user()                                │
//! │  - installation_repositories()                   │
//! └─────────────────────────────────────────────────┘
//!                        │
//!                        ▼
//!              ┌─────────────────┐
//!              │ OctocrabClient  │
//!              │ (direct API)    │
//!              └─────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use soten_client::{OctocrabClient, RemoteApi};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = OctocrabClient::new("https://api.github.com");
//!
//! if let Some(user) = client.current_user("token").await? {
//!     println!("signed in as {}", user.login);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod oauth;
pub mod octocrab_client;
pub mod types;

pub use client::RemoteApi;
pub use oauth::authorize_url;
pub use octocrab_client::OctocrabClient;
pub use types::{CurrentUser, InstallationRepositories, Repository};
