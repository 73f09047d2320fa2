//! soten CLI entry point
//!
//! Runs the controller once: bootstrap from the given fragment, apply the
//! requested actions, and print the resulting state. With `--relay` it only
//! evaluates one relay request against the configured prefix.

use anyhow::Result;
use clap::Parser;
use soten::{
    logger, AuthStatus, Bootstrap, Dispatcher, Event, MemoryLocation, Services, Store, View,
};
use soten_client::authorize_url;
use soten_config::{AppConfig, FileKeyValueStore, RepoRef};
use soten_mirror::{FileContent, RelayDecision, RelayPolicy};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "soten")]
#[command(version)]
#[command(about = "Sync and browse notes kept in a GitHub repository", long_about = None)]
struct Args {
    /// URL fragment to start with (OAuth redirect payload or note path)
    #[arg(long, default_value = "")]
    fragment: String,

    /// Repository to switch to
    #[arg(long, value_name = "OWNER/REPO")]
    select: Option<RepoRef>,

    /// Note to show, e.g. /soten/readme.md
    #[arg(long, value_name = "PATH")]
    show: Option<String>,

    /// Sign out and remove the local mirror
    #[arg(long)]
    logout: bool,

    /// Origin the OAuth callback redirects to
    #[arg(long, default_value = "http://localhost:5173")]
    origin: String,

    /// Show how the relay treats a request, then exit
    #[arg(long, num_args = 2, value_names = ["METHOD", "PATH"])]
    relay: Option<Vec<String>>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();
    logger::init();

    let args = Args::parse();
    let config = AppConfig::load();
    if let Some([method, path]) = args.relay.as_deref() {
        print_relay_decision(&config, method, path);
        return Ok(());
    }

    let services = Services::from_config(&config)?;
    let store = Arc::new(Store::new(Arc::new(FileKeyValueStore::open_default()?)));
    let dispatcher = Arc::new(Dispatcher::with_services(store.clone(), &services));
    let location = Arc::new(MemoryLocation::new(args.fragment.clone()));
    let bootstrap = Bootstrap::new(dispatcher.clone(), services.remote.clone(), location.clone());

    bootstrap.init().await;

    if args.logout {
        dispatcher.dispatch(Event::Logout).await;
    }
    if let Some(repo) = args.select {
        dispatcher.dispatch(Event::SelectRepo(repo)).await;
    }
    if let Some(path) = args.show {
        location.set_fragment(path);
        bootstrap.on_fragment_change().await;
    }

    print_summary(&store, &config, &args.origin)
}

fn print_relay_decision(config: &AppConfig, method: &str, path: &str) {
    match RelayPolicy::from_config(config).evaluate(method, path) {
        RelayDecision::Forward(url) => println!("{} {}", method.to_ascii_uppercase(), url),
        RelayDecision::Preflight => println!("200 (preflight)"),
        RelayDecision::Reject { status, body } => println!("{} {}", status, body),
    }
}

fn print_summary(store: &Store, config: &AppConfig, origin: &str) -> Result<()> {
    if let Some(message) = store.auth_error_message.get() {
        println!("Sign-in failed: {}", message);
    }

    match store.session.get() {
        Some(session) if store.auth_status.get() == AuthStatus::Authenticated => {
            println!("Signed in as {} <{}>", session.username, session.email);
        }
        _ => {
            println!("Not signed in");
            if let Some(client_id) = &config.client_id {
                println!("Sign in at {}", authorize_url(client_id, origin)?);
            }
        }
    }

    let repos = store.repo_list.get();
    if !repos.is_empty() {
        println!("Repositories:");
        let selected = store.selected_repo.get().map(|repo| repo.full_name());
        for repo in &repos {
            let marker = if selected.as_deref() == Some(repo.as_str()) {
                "*"
            } else {
                " "
            };
            println!("  {} {}", marker, repo);
        }
    }

    if store.ready.get() {
        println!("{} files ready", store.file_map.with(|files| files.len()));
    }

    if store.view.get() == View::Note {
        let path = store.current_path.get();
        match store.file_map.with(|files| files.get(&path).cloned()) {
            Some(FileContent::Text(text)) => println!("\n{}", text),
            Some(FileContent::Image(blob)) => {
                println!("{}: {} ({} bytes)", path, blob.mime, blob.bytes.len())
            }
            None => println!("{}: not found", path),
        }
    }

    if let Some(message) = store.error_message.get() {
        println!("Error: {}", message);
    }

    Ok(())
}
