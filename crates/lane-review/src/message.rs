//! Snap message derived from the pull request.

use tracing::info;

use crate::github::{GitHubResult, IssueTracker};

/// Used when the PR has neither a title nor commits.
pub const FALLBACK_MESSAGE: &str = "CI";

/// Pick the snap message: PR title, else newest commit message, else `"CI"`.
pub async fn snap_message(tracker: &dyn IssueTracker, pr_number: u64) -> GitHubResult<String> {
    let pr = tracker.get_pull_request(pr_number).await?;
    let title = pr.title.unwrap_or_default();
    info!(pr = pr_number, title = %title, "PR title");

    let message = if !title.is_empty() {
        title
    } else {
        let commits = tracker.list_pull_commits(pr_number).await?;
        match commits.last() {
            Some(last) => {
                info!(sha = %last.sha, "Using last commit message");
                last.commit.message.clone()
            }
            None => FALLBACK_MESSAGE.to_string(),
        }
    };

    info!(message = %message, "Snap message");
    Ok(message)
}
