//! URL fragment parsing
//!
//! The fragment carries either an OAuth redirect payload or a navigation
//! target. Auth payloads are form-encoded key/value pairs; anything else is
//! a route.

use soten_config::Session;
use std::collections::HashMap;
use url::form_urlencoded;

const AUTH_ERROR: &str = "auth_error";
const ACCESS_TOKEN: &str = "access_token";
const USERNAME: &str = "username";
const EMAIL: &str = "email";
const APP_INSTALL_ID: &str = "app_install_id";

const OAUTH_KEYS: [&str; 4] = [ACCESS_TOKEN, USERNAME, EMAIL, APP_INSTALL_ID];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// No fragment at all
    Empty,
    /// The OAuth flow failed with this message
    AuthError(String),
    /// The OAuth flow succeeded
    OAuth(Session),
    /// Some, but not all, OAuth keys are present
    IncompleteAuth,
    /// A navigation target, e.g. `/` or `/soten/readme.md`
    Route(String),
}

/// Classify a fragment, with or without its leading `#`
pub fn parse_fragment(raw: &str) -> Fragment {
    let raw = raw.strip_prefix('#').unwrap_or(raw);
    if raw.is_empty() {
        return Fragment::Empty;
    }

    let params: HashMap<String, String> = form_urlencoded::parse(raw.as_bytes())
        .into_owned()
        .collect();

    if let Some(message) = params.get(AUTH_ERROR) {
        return Fragment::AuthError(message.clone());
    }

    let value = |key: &str| params.get(key).filter(|value| !value.is_empty());
    match (
        value(ACCESS_TOKEN),
        value(USERNAME),
        value(EMAIL),
        value(APP_INSTALL_ID),
    ) {
        (Some(token), Some(username), Some(email), Some(installation_id)) => {
            Fragment::OAuth(Session::new(username, token, installation_id, email))
        }
        _ if OAUTH_KEYS.iter().any(|key| params.contains_key(*key)) => Fragment::IncompleteAuth,
        _ => Fragment::Route(raw.to_string()),
    }
}
