//! Relay policy for git wire requests
//!
//! The relay forwards `<prefix><host>/<path>` to `https://<host>/<path>` so
//! the mirror can reach the git host from environments that block
//! cross-origin requests. Only the policy lives here: the relay host (an
//! edge function in front of the web viewer) embeds it and does the
//! transport. The `soten --relay` flag evaluates single requests against the
//! configured prefix.

use log::debug;
use soten_config::AppConfig;
use url::Url;

/// Request headers passed through to the upstream host
pub const ALLOWED_REQUEST_HEADERS: &[&str] = &[
    "accept-encoding",
    "accept-language",
    "accept",
    "access-control-allow-origin",
    "authorization",
    "cache-control",
    "connection",
    "content-length",
    "content-type",
    "dnt",
    "git-protocol",
    "pragma",
    "range",
    "referer",
    "user-agent",
    "x-authorization",
    "x-http-method-override",
    "x-requested-with",
];

/// Response headers exposed back to the caller
pub const EXPOSED_RESPONSE_HEADERS: &[&str] = &[
    "accept-ranges",
    "age",
    "cache-control",
    "content-length",
    "content-language",
    "content-type",
    "date",
    "etag",
    "expires",
    "last-modified",
    "location",
    "pragma",
    "server",
    "transfer-encoding",
    "vary",
    "x-github-request-id",
    "x-redirected-url",
];

/// Methods the relay accepts
pub const ALLOWED_METHODS: &[&str] = &["POST", "GET", "OPTIONS"];

/// Outcome of evaluating one incoming request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayDecision {
    /// Forward to the rewritten upstream URL
    Forward(Url),
    /// Answer a preflight with 200 and no body
    Preflight,
    /// Refuse the request
    Reject { status: u16, body: &'static str },
}

#[derive(Debug, Clone)]
pub struct RelayPolicy {
    prefix: String,
}

impl Default for RelayPolicy {
    fn default() -> Self {
        Self::new("/api/cors-proxy/")
    }
}

impl RelayPolicy {
    /// `prefix` always ends with a slash after normalization
    pub fn new(prefix: &str) -> Self {
        let prefix = format!("/{}/", prefix.trim_matches('/'));
        Self { prefix }
    }

    /// Policy for the prefix configured as `relay_prefix`
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.relay_prefix)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Decide what to do with a request for `path` (path and query)
    pub fn evaluate(&self, method: &str, path: &str) -> RelayDecision {
        let method = method.to_ascii_uppercase();
        if !ALLOWED_METHODS.contains(&method.as_str()) {
            return RelayDecision::Reject {
                status: 405,
                body: "Method Not Allowed",
            };
        }

        let Some(target) = path.strip_prefix(&self.prefix) else {
            return RelayDecision::Reject {
                status: 404,
                body: "Not Found",
            };
        };

        let upstream = match Url::parse(&format!("https://{}", target)) {
            Ok(url) if url.host_str().is_some_and(|host| !host.is_empty()) => url,
            _ => {
                debug!("Relay target is not a valid URL: {}", target);
                return RelayDecision::Reject {
                    status: 400,
                    body: "Invalid URL",
                };
            }
        };

        if method == "OPTIONS" {
            return RelayDecision::Preflight;
        }

        RelayDecision::Forward(upstream)
    }

    /// Keep only the allow-listed request headers
    pub fn filter_request_headers<'a, I>(&self, headers: I) -> Vec<(String, String)>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        filter_headers(headers, ALLOWED_REQUEST_HEADERS)
    }

    /// Keep only the exposed response headers
    pub fn filter_response_headers<'a, I>(&self, headers: I) -> Vec<(String, String)>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        filter_headers(headers, EXPOSED_RESPONSE_HEADERS)
    }
}

fn filter_headers<'a, I>(headers: I, allowed: &[&str]) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    headers
        .into_iter()
        .filter_map(|(name, value)| {
            let name = name.to_ascii_lowercase();
            allowed
                .contains(&name.as_str())
                .then(|| (name, value.to_string()))
        })
        .collect()
}
