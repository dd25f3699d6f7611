//! The lane comment on the pull request.
//!
//! One comment per PR links to the review lane. Later runs edit it in place
//! instead of adding another.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{LaneConfig, DEFAULT_CLOUD_URL};
use crate::github::{GitHubResult, IssueComment, IssueTracker};

/// What happened to the lane comment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "action", content = "comment_id")]
pub enum CommentAction {
    Created(u64),
    Updated(u64),
}

impl CommentAction {
    pub fn comment_id(&self) -> u64 {
        match self {
            CommentAction::Created(id) | CommentAction::Updated(id) => *id,
        }
    }
}

/// Long-form UTC timestamp, e.g. `October 19, 2026, 02:05:09 PM UTC`.
pub fn human_timestamp(at: DateTime<Utc>) -> String {
    format!("{} UTC", at.format("%B %-d, %Y, %I:%M:%S %p"))
}

/// Text every lane comment starts with, whatever the cloud origin.
pub const COMMENT_LEAD: &str = "⚠️ Please review the changes in the Bit lane:";

/// Opening line of the comment.
pub fn comment_intro(lane_url: &str) -> String {
    format!("{COMMENT_LEAD} {lane_url}")
}

/// Body for a freshly created comment.
pub fn created_body(lane_url: &str, at: DateTime<Utc>) -> String {
    format!(
        "{}\n\n_Lane created: {}_",
        comment_intro(lane_url),
        human_timestamp(at)
    )
}

/// Body for an edited comment.
pub fn updated_body(lane_url: &str, at: DateTime<Utc>) -> String {
    format!(
        "{}\n\n_Lane updated: {}_",
        comment_intro(lane_url),
        human_timestamp(at)
    )
}

/// Whether a comment body is one of ours.
///
/// The Bit Cloud link, the configured origin and the lead text all count, so
/// a comment written under a previous `cloud_url` is still found.
fn is_lane_body(body: &str, config: &LaneConfig) -> bool {
    body.contains(DEFAULT_CLOUD_URL)
        || body.contains(&config.cloud_url)
        || body.contains(COMMENT_LEAD)
}

/// First comment authored by the bot that links to the lane.
pub fn find_lane_comment<'a>(
    comments: &'a [IssueComment],
    config: &LaneConfig,
) -> Option<&'a IssueComment> {
    comments.iter().find(|c| {
        let links_cloud = c
            .body
            .as_deref()
            .is_some_and(|body| is_lane_body(body, config));
        let by_bot = c
            .user
            .as_ref()
            .is_some_and(|user| user.login == config.bot_login);
        links_cloud && by_bot
    })
}

/// Update the existing lane comment, or create one.
pub async fn post_or_update(
    tracker: &dyn IssueTracker,
    config: &LaneConfig,
    pr_number: u64,
    lane_name: &str,
    now: DateTime<Utc>,
) -> GitHubResult<CommentAction> {
    let lane_url = config.lane_url(lane_name);
    let comments = tracker.list_issue_comments(pr_number).await?;

    match find_lane_comment(&comments, config) {
        Some(existing) => {
            let body = updated_body(&lane_url, now);
            let updated = tracker.update_issue_comment(existing.id, &body).await?;
            info!(comment_id = updated.id, lane_url = %lane_url, "Updated lane comment");
            Ok(CommentAction::Updated(updated.id))
        }
        None => {
            let body = created_body(&lane_url, now);
            let created = tracker.create_issue_comment(pr_number, &body).await?;
            info!(comment_id = created.id, lane_url = %lane_url, "Created lane comment");
            Ok(CommentAction::Created(created.id))
        }
    }
}
