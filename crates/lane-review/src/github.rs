//! GitHub REST API access for pull request metadata and comments.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GitHubError;

/// Default REST API origin.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Page size used for list endpoints (the API maximum).
pub const PER_PAGE: usize = 100;

/// Result type for GitHub operations.
pub type GitHubResult<T> = std::result::Result<T, GitHubError>;

/// A pull request, reduced to what the workflow reads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PullRequest {
    /// Pull request number
    pub number: u64,
    /// Title, absent or empty on some API responses
    #[serde(default)]
    pub title: Option<String>,
}

/// A commit listed on a pull request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PullCommit {
    pub sha: String,
    pub commit: CommitDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommitDetail {
    pub message: String,
}

/// A GitHub user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Username/login
    pub login: String,
}

/// A comment on an issue or pull request conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IssueComment {
    /// Comment ID
    pub id: u64,
    /// Comment body
    #[serde(default)]
    pub body: Option<String>,
    /// Comment author, absent for deleted accounts
    #[serde(default)]
    pub user: Option<User>,
}

/// Pull request and comment operations the workflow needs.
///
/// Implementations are bound to one repository.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Fetch a pull request.
    async fn get_pull_request(&self, number: u64) -> GitHubResult<PullRequest>;

    /// List every commit on a pull request, oldest first.
    ///
    /// GitHub documents this ordering for the pull request commits endpoint;
    /// callers rely on the last entry being the newest commit.
    async fn list_pull_commits(&self, number: u64) -> GitHubResult<Vec<PullCommit>>;

    /// List every comment on an issue or pull request, in creation order.
    async fn list_issue_comments(&self, number: u64) -> GitHubResult<Vec<IssueComment>>;

    /// Add a comment to an issue or pull request.
    async fn create_issue_comment(&self, number: u64, body: &str) -> GitHubResult<IssueComment>;

    /// Replace the body of an existing comment.
    async fn update_issue_comment(&self, comment_id: u64, body: &str)
        -> GitHubResult<IssueComment>;
}

#[derive(Serialize)]
struct CommentBody<'a> {
    body: &'a str,
}

/// GitHub REST API client for one repository.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    /// GitHub API token
    token: String,
    /// Repository owner
    owner: String,
    /// Repository name
    repo: String,
    /// REST API origin
    api_url: String,
    /// HTTP client
    client: reqwest::Client,
}

impl GitHubClient {
    /// Create a client for `owner/repo` against api.github.com.
    pub fn new(token: impl Into<String>, owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            owner: owner.into(),
            repo: repo.into(),
            api_url: DEFAULT_API_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Use a different API origin (GitHub Enterprise Server).
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    /// Build a repository-scoped API URL.
    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_url, self.owner, self.repo, path
        )
    }

    /// Make an authenticated request.
    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "lane-review")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }

    /// Send a request and decode a successful JSON response.
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> GitHubResult<T> {
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(parse_error(response).await);
        }
        Ok(response.json::<T>().await?)
    }

    /// Fetch all pages of a list endpoint.
    async fn get_all<T: DeserializeOwned>(&self, path: &str) -> GitHubResult<Vec<T>> {
        let url = self.repo_url(path);
        let mut items = Vec::new();
        let mut page = 1usize;

        loop {
            let request = self
                .request(reqwest::Method::GET, &url)
                .query(&[("per_page", PER_PAGE), ("page", page)]);
            let batch: Vec<T> = self.send_json(request).await?;
            let done = batch.len() < PER_PAGE;
            debug!(path = %path, page = page, count = batch.len(), "Fetched page");
            items.extend(batch);
            if done {
                return Ok(items);
            }
            page += 1;
        }
    }
}

/// Map a non-success response to an error.
async fn parse_error(response: reqwest::Response) -> GitHubError {
    let status = response.status().as_u16();

    match status {
        401 => GitHubError::Unauthorized,
        403 => {
            let rate_limited = response
                .headers()
                .get("x-ratelimit-remaining")
                .and_then(|v| v.to_str().ok())
                .map(|s| s == "0")
                .unwrap_or(false);
            if rate_limited {
                return GitHubError::RateLimited;
            }
            // Fork PRs land here with "Resource not accessible by integration".
            GitHubError::Api {
                status,
                message: body_message(response)
                    .await
                    .unwrap_or_else(|| "Forbidden".to_string()),
            }
        }
        404 => GitHubError::NotFound(response.url().path().to_string()),
        _ => GitHubError::Api {
            status,
            message: body_message(response)
                .await
                .unwrap_or_else(|| format!("HTTP {}", status)),
        },
    }
}

/// The `message` field of a GitHub error body, if any.
async fn body_message(response: reqwest::Response) -> Option<String> {
    response
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
}

#[async_trait]
impl IssueTracker for GitHubClient {
    async fn get_pull_request(&self, number: u64) -> GitHubResult<PullRequest> {
        let url = self.repo_url(&format!("pulls/{number}"));
        self.send_json(self.request(reqwest::Method::GET, &url)).await
    }

    async fn list_pull_commits(&self, number: u64) -> GitHubResult<Vec<PullCommit>> {
        self.get_all(&format!("pulls/{number}/commits")).await
    }

    async fn list_issue_comments(&self, number: u64) -> GitHubResult<Vec<IssueComment>> {
        self.get_all(&format!("issues/{number}/comments")).await
    }

    async fn create_issue_comment(&self, number: u64, body: &str) -> GitHubResult<IssueComment> {
        let url = self.repo_url(&format!("issues/{number}/comments"));
        let request = self
            .request(reqwest::Method::POST, &url)
            .json(&CommentBody { body });
        self.send_json(request).await
    }

    async fn update_issue_comment(
        &self,
        comment_id: u64,
        body: &str,
    ) -> GitHubResult<IssueComment> {
        let url = self.repo_url(&format!("issues/comments/{comment_id}"));
        let request = self
            .request(reqwest::Method::PATCH, &url)
            .json(&CommentBody { body });
        self.send_json(request).await
    }
}
