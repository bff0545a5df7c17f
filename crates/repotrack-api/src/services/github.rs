//! GitHub API client for repository enumeration.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, HeaderMap, LINK};
use repotrack_core::Repository;
use repotrack_core::hosting::{EnumerationError, EnumerationResult, HostingEnumerator};
use repotrack_core::token::TokenLookup;
use serde::Deserialize;
use tracing::{debug, info, warn};
use url::Url;

use super::endpoint;

/// Items requested per page.
const PER_PAGE: u32 = 100;

/// Remaining-request count below which enumeration logs a warning.
const RATE_LIMIT_LOW_WATERMARK: u64 = 10;

/// GitHub API client.
pub struct GitHubClient {
    client: reqwest::Client,
    api_url: Url,
    tokens: Arc<dyn TokenLookup>,
}

impl GitHubClient {
    pub fn new(client: reqwest::Client, api_url: Url, tokens: Arc<dyn TokenLookup>) -> Self {
        Self {
            client,
            api_url,
            tokens,
        }
    }

    /// Fetch one page of the authenticated user's repositories.
    async fn list_repos(
        &self,
        username: &str,
        token: &str,
        page: u32,
    ) -> EnumerationResult<RepoPage> {
        let response = self
            .client
            .get(endpoint(&self.api_url, "/user/repos"))
            .query(&[("per_page", PER_PAGE), ("page", page)])
            .bearer_auth(token)
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| EnumerationError::Request {
                page,
                message: e.to_string(),
            })?;

        let status = response.status();
        let headers = response.headers();

        if is_rate_limited(status, headers) {
            warn!(username = %username, page, "GitHub API rate limit reached");
            return Err(EnumerationError::RateLimitExceeded);
        }

        if status == StatusCode::NOT_FOUND {
            return Err(EnumerationError::UnknownUser(username.to_string()));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EnumerationError::Api {
                page,
                status: status.as_u16(),
                body,
            });
        }

        match rate_limit_remaining(headers) {
            Some(remaining) if remaining < RATE_LIMIT_LOW_WATERMARK => {
                warn!(username = %username, remaining, "GitHub API rate limit running low");
            }
            _ => {}
        }

        let next = headers
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .and_then(next_page);

        let repos: Vec<GitHubRepo> =
            response
                .json()
                .await
                .map_err(|e| EnumerationError::Parse {
                    page,
                    message: e.to_string(),
                })?;

        Ok(RepoPage { repos, next })
    }
}

#[async_trait]
impl HostingEnumerator for GitHubClient {
    async fn user_repositories(&self, username: &str) -> EnumerationResult<Vec<Repository>> {
        let token = self.tokens.get_token(username).await?;

        let mut repositories = Vec::new();
        let mut cursor = Some(1);

        while let Some(page) = cursor {
            let fetched = self.list_repos(username, &token, page).await?;
            debug!(
                username = %username,
                page,
                count = fetched.repos.len(),
                next = ?fetched.next,
                "Fetched repository page"
            );

            repositories.extend(fetched.repos.into_iter().map(Repository::from));
            cursor = fetched.next;
        }

        info!(username = %username, count = repositories.len(), "Listed GitHub repositories");
        Ok(repositories)
    }
}

struct RepoPage {
    repos: Vec<GitHubRepo>,
    next: Option<u32>,
}

/// GitHub repository information.
#[derive(Debug, Deserialize)]
struct GitHubRepo {
    name: String,
    private: bool,
    owner: RepoOwner,
}

#[derive(Debug, Deserialize)]
struct RepoOwner {
    login: String,
}

impl From<GitHubRepo> for Repository {
    fn from(repo: GitHubRepo) -> Self {
        Repository::new(repo.owner.login, repo.name, repo.private)
    }
}

/// GitHub answers 429, or 403 with an exhausted quota, when rate limited.
fn is_rate_limited(status: StatusCode, headers: &HeaderMap) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || (status == StatusCode::FORBIDDEN && rate_limit_remaining(headers) == Some(0))
}

fn rate_limit_remaining(headers: &HeaderMap) -> Option<u64> {
    headers
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

/// Extract the page number of the `rel="next"` entry of a `Link` header.
///
/// `<https://api.github.com/user/repos?page=2>; rel="next", <...?page=5>; rel="last"`
pub fn next_page(link: &str) -> Option<u32> {
    link.split(',').find_map(|entry| {
        let mut parts = entry.split(';');
        let target = parts.next()?.trim();
        if !parts.any(|param| param.trim() == r#"rel="next""#) {
            return None;
        }

        let target = target.strip_prefix('<')?.strip_suffix('>')?;
        let url = Url::parse(target).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == "page")
            .and_then(|(_, value)| value.parse().ok())
    })
}
