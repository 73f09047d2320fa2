//! OAuth authorize URL
//!
//! The code exchange happens in a backend callback; the client only needs to
//! send the user to the platform's authorize page with the callback as
//! redirect target.

use url::Url;

const AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
const CALLBACK_PATH: &str = "/api/gh-auth/callback";

/// Build the authorize URL for `client_id`, redirecting back to `origin`
pub fn authorize_url(client_id: &str, origin: &str) -> anyhow::Result<String> {
    let redirect_uri = format!("{}{}", origin.trim_end_matches('/'), CALLBACK_PATH);
    let url = Url::parse_with_params(
        AUTHORIZE_URL,
        &[("client_id", client_id), ("redirect_uri", redirect_uri.as_str())],
    )?;
    Ok(url.into())
}
