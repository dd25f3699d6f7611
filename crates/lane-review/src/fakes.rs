//! In-memory fakes for the workflow's collaborators (testing only)
//!
//! Provides `FakeWorkspaceTool` and `MemoryIssueTracker`, which satisfy the
//! trait contracts without spawning processes or touching the network.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{GitHubError, LaneError, Result};
use crate::github::*;
use crate::runner::{StepResult, ToolInvocation, WorkspaceTool};
use crate::step::LaneStep;

// ---------------------------------------------------------------------------
// FakeWorkspaceTool
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum Failure {
    Exit(i32),
    Spawn,
}

/// Records every command and answers the status check with canned JSON.
#[derive(Debug)]
pub struct FakeWorkspaceTool {
    status_json: String,
    failures: HashMap<LaneStep, Failure>,
    calls: Mutex<Vec<ToolInvocation>>,
}

impl FakeWorkspaceTool {
    /// A tool whose status check prints `status_json`.
    pub fn new(status_json: &str) -> Self {
        Self {
            status_json: status_json.to_string(),
            failures: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Make `step` exit with `exit_code`.
    pub fn failing(mut self, step: LaneStep, exit_code: i32) -> Self {
        self.failures.insert(step, Failure::Exit(exit_code));
        self
    }

    /// Make `step` fail to start.
    pub fn unspawnable(mut self, step: LaneStep) -> Self {
        self.failures.insert(step, Failure::Spawn);
        self
    }

    /// Every invocation so far, in call order.
    pub fn calls(&self) -> Vec<ToolInvocation> {
        self.calls.lock().unwrap().clone()
    }

    /// Steps invoked so far, in call order.
    pub fn steps(&self) -> Vec<LaneStep> {
        self.calls().into_iter().map(|c| c.step).collect()
    }

    /// Arguments of the first invocation of `step`.
    pub fn args_for(&self, step: LaneStep) -> Option<Vec<String>> {
        self.calls()
            .into_iter()
            .find(|c| c.step == step)
            .map(|c| c.args)
    }
}

#[async_trait]
impl WorkspaceTool for FakeWorkspaceTool {
    async fn invoke(&self, invocation: &ToolInvocation) -> Result<StepResult> {
        self.calls.lock().unwrap().push(invocation.clone());

        let step = invocation.step;
        let exit_code = match self.failures.get(&step) {
            Some(Failure::Spawn) => {
                return Err(LaneError::Spawn {
                    step: step.name().to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "bit not found"),
                })
            }
            Some(Failure::Exit(code)) => *code,
            None => 0,
        };
        let stdout = if step.captures_output() {
            self.status_json.clone()
        } else {
            String::new()
        };

        Ok(StepResult {
            step_name: step.name().to_string(),
            exit_code,
            stdout,
            stderr: String::new(),
            duration_ms: 0,
            success: exit_code == 0,
        })
    }
}

// ---------------------------------------------------------------------------
// MemoryIssueTracker
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct TrackerState {
    comments: Vec<IssueComment>,
    next_comment_id: u64,
    commit_list_calls: usize,
    created: usize,
    updated: usize,
}

/// In-memory pull request with a mutable comment thread.
#[derive(Debug)]
pub struct MemoryIssueTracker {
    title: Option<String>,
    commits: Vec<PullCommit>,
    pull_request_missing: bool,
    state: Mutex<TrackerState>,
}

impl Default for MemoryIssueTracker {
    fn default() -> Self {
        Self {
            title: None,
            commits: Vec::new(),
            pull_request_missing: false,
            state: Mutex::new(TrackerState {
                next_comment_id: 1000,
                ..TrackerState::default()
            }),
        }
    }
}

impl MemoryIssueTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: Option<&str>) -> Self {
        self.title = title.map(str::to_string);
        self
    }

    /// Commit messages in API order (oldest first).
    pub fn with_commits(mut self, messages: &[&str]) -> Self {
        self.commits = messages
            .iter()
            .enumerate()
            .map(|(i, m)| PullCommit {
                sha: format!("{:040x}", i + 1),
                commit: CommitDetail {
                    message: m.to_string(),
                },
            })
            .collect();
        self
    }

    /// Seed an existing comment.
    pub fn with_comment(self, id: u64, body: &str, login: &str) -> Self {
        self.state.lock().unwrap().comments.push(IssueComment {
            id,
            body: Some(body.to_string()),
            user: Some(User {
                login: login.to_string(),
            }),
        });
        self
    }

    /// Make `get_pull_request` answer 404.
    pub fn without_pull_request(mut self) -> Self {
        self.pull_request_missing = true;
        self
    }

    pub fn comments(&self) -> Vec<IssueComment> {
        self.state.lock().unwrap().comments.clone()
    }

    pub fn commit_list_calls(&self) -> usize {
        self.state.lock().unwrap().commit_list_calls
    }

    pub fn created_count(&self) -> usize {
        self.state.lock().unwrap().created
    }

    pub fn updated_count(&self) -> usize {
        self.state.lock().unwrap().updated
    }
}

#[async_trait]
impl IssueTracker for MemoryIssueTracker {
    async fn get_pull_request(&self, number: u64) -> GitHubResult<PullRequest> {
        if self.pull_request_missing {
            return Err(GitHubError::NotFound(format!("pulls/{number}")));
        }
        Ok(PullRequest {
            number,
            title: self.title.clone(),
        })
    }

    async fn list_pull_commits(&self, _number: u64) -> GitHubResult<Vec<PullCommit>> {
        self.state.lock().unwrap().commit_list_calls += 1;
        Ok(self.commits.clone())
    }

    async fn list_issue_comments(&self, _number: u64) -> GitHubResult<Vec<IssueComment>> {
        Ok(self.comments())
    }

    async fn create_issue_comment(&self, _number: u64, body: &str) -> GitHubResult<IssueComment> {
        let mut state = self.state.lock().unwrap();
        state.next_comment_id += 1;
        let comment = IssueComment {
            id: state.next_comment_id,
            body: Some(body.to_string()),
            user: Some(User {
                login: crate::config::DEFAULT_BOT_LOGIN.to_string(),
            }),
        };
        state.comments.push(comment.clone());
        state.created += 1;
        Ok(comment)
    }

    async fn update_issue_comment(
        &self,
        comment_id: u64,
        body: &str,
    ) -> GitHubResult<IssueComment> {
        let mut state = self.state.lock().unwrap();
        let comment = state
            .comments
            .iter_mut()
            .find(|c| c.id == comment_id)
            .ok_or_else(|| GitHubError::NotFound(format!("issues/comments/{comment_id}")))?;
        comment.body = Some(body.to_string());
        let updated = comment.clone();
        state.updated += 1;
        Ok(updated)
    }
}
