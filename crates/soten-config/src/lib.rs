//! Configuration and persisted state for soten
//!
//! This crate provides:
//! - File path utilities for config and data files
//! - Configuration file loading (TOML)
//! - Application configuration (AppConfig)
//! - The session and repository selection types that survive reloads
//! - A key-value store gateway used to persist them

pub mod app_config;
pub mod config_file;
pub mod kv_store;
pub mod paths;
pub mod repo_ref;
pub mod session;

/// Default git host (public GitHub)
pub const DEFAULT_HOST: &str = "github.com";

pub use app_config::AppConfig;
pub use config_file::load_config_file;
pub use kv_store::{
    load_record, save_record, FileKeyValueStore, KeyValueStore, MemoryKeyValueStore,
    SELECTED_REPO_KEY, SESSION_KEY,
};
pub use repo_ref::RepoRef;
pub use session::Session;
