//! Review lane orchestration.

use crate::comment::{self, CommentAction};
use crate::config::{Invocation, LaneConfig};
use crate::error::{LaneError, Result};
use crate::github::IssueTracker;
use crate::message;
use crate::runner::{StepResult, ToolInvocation, WorkspaceTool};
use crate::status::WorkspaceStatus;
use crate::step::{self, LaneStep, StepPolicy};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn, Instrument};

/// How a run ended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum WorkflowOutcome {
    /// No new or modified components; nothing was done.
    NoChanges,

    /// The lane was snapped and exported and the PR comment is current.
    Published {
        lane_url: String,
        comment: CommentAction,
        /// False when the stale remote lane could not be removed.
        stale_lane_removed: bool,
    },
}

/// Drives one review-lane run against a workspace tool and an issue tracker.
pub struct LaneWorkflow<'a> {
    tool: &'a dyn WorkspaceTool,
    tracker: &'a dyn IssueTracker,
    config: &'a LaneConfig,
}

impl<'a> LaneWorkflow<'a> {
    pub fn new(
        tool: &'a dyn WorkspaceTool,
        tracker: &'a dyn IssueTracker,
        config: &'a LaneConfig,
    ) -> Self {
        Self {
            tool,
            tracker,
            config,
        }
    }

    /// Run the workflow for one pull request.
    ///
    /// Steps run strictly in order: status check, strict status, lane
    /// create, snap, stale lane removal, export, PR comment. The first
    /// fatal failure aborts the run.
    pub async fn run(&self, invocation: &Invocation) -> Result<WorkflowOutcome> {
        let span = tracing::info_span!(
            "lane_review.run",
            lane = %invocation.lane_name,
            pr = invocation.pr_number,
        );
        self.run_inner(invocation).instrument(span).await
    }

    async fn run_inner(&self, invocation: &Invocation) -> Result<WorkflowOutcome> {
        let check = self
            .execute(invocation, LaneStep::Status, step::status_args())
            .await?
            .ok_or_else(|| LaneError::StepFailed {
                step: LaneStep::Status.name().to_string(),
                exit_code: -1,
            })?;
        let status = WorkspaceStatus::parse(&check.stdout)?;

        if !status.has_changes() {
            info!("No new or modified components, skipping lane");
            return Ok(WorkflowOutcome::NoChanges);
        }
        info!(
            new = status.new_components.len(),
            modified = status.modified_components.len(),
            "Workspace has changes"
        );

        self.execute(invocation, LaneStep::StrictStatus, step::strict_status_args())
            .await?;
        self.execute(
            invocation,
            LaneStep::LaneCreate,
            step::lane_create_args(&invocation.lane_name),
        )
        .await?;

        let snap_message = message::snap_message(self.tracker, invocation.pr_number).await?;
        let build = !self.config.use_external_build;
        self.execute(invocation, LaneStep::Snap, step::snap_args(&snap_message, build))
            .await?;

        let remote_lane = self.config.remote_lane_id(&invocation.lane_name);
        let stale_lane_removed = self
            .execute(invocation, LaneStep::LaneRemove, step::lane_remove_args(&remote_lane))
            .await?
            .is_some();

        self.execute(invocation, LaneStep::Export, step::export_args())
            .await?;

        let comment = comment::post_or_update(
            self.tracker,
            self.config,
            invocation.pr_number,
            &invocation.lane_name,
            Utc::now(),
        )
        .await?;

        Ok(WorkflowOutcome::Published {
            lane_url: self.config.lane_url(&invocation.lane_name),
            comment,
            stale_lane_removed,
        })
    }

    /// Run one step and apply its policy.
    ///
    /// Returns `Ok(None)` when a tolerated step failed.
    async fn execute(
        &self,
        invocation: &Invocation,
        step: LaneStep,
        mut args: Vec<String>,
    ) -> Result<Option<StepResult>> {
        if step.accepts_passthrough() {
            args.extend(invocation.extra_args.iter().cloned());
        }
        let tool_invocation = ToolInvocation {
            step,
            args,
            cwd: invocation.workspace_dir.clone(),
        };

        info!(step = step.name(), "Executing step");

        let failure = match self.tool.invoke(&tool_invocation).await {
            Ok(result) if result.passed() => {
                info!(
                    step = step.name(),
                    duration_ms = result.duration_ms,
                    "Step completed"
                );
                return Ok(Some(result));
            }
            Ok(result) => {
                if !result.stderr.trim().is_empty() {
                    warn!(step = step.name(), stderr = %result.stderr.trim(), "Step stderr");
                }
                LaneError::StepFailed {
                    step: step.name().to_string(),
                    exit_code: result.exit_code,
                }
            }
            Err(e) => e,
        };

        match step.policy() {
            StepPolicy::Fatal => Err(failure),
            StepPolicy::LogAndContinue => {
                warn!(step = step.name(), error = %failure, "Step failed, continuing");
                Ok(None)
            }
        }
    }
}
