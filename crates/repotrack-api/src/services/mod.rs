//! Clients for the remote collaborators.

pub mod github;
pub mod hooks;
pub mod tokens;

pub use github::GitHubClient;
pub use hooks::HooksClient;
pub use tokens::TokenClient;

use std::time::Duration;

use url::Url;

/// Build the HTTP client shared by the remote service clients.
///
/// The timeout bounds every outbound request, including each page fetched
/// while enumerating GitHub repositories.
pub fn http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("repotrack/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()
}

/// Join a path onto a base URL without doubling or dropping slashes.
pub(crate) fn endpoint(base: &Url, path: &str) -> String {
    format!("{}{}", base.as_str().trim_end_matches('/'), path)
}

/// Percent-encode each segment of an `owner/name` pair for use in a path.
pub(crate) fn encode_full_name(full_name: &str) -> String {
    full_name
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
