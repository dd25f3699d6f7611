//! Workspace tool steps and their recovery policies.

use serde::{Deserialize, Serialize};

/// How the workflow reacts when a step fails.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StepPolicy {
    /// Abort the run.
    Fatal,

    /// Log a warning and carry on with the next step.
    LogAndContinue,
}

/// Commands the workflow issues to the workspace tool, in run order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LaneStep {
    /// bit status --json
    Status,

    /// bit status --strict
    StrictStatus,

    /// bit lane create <lane>
    LaneCreate,

    /// bit snap -m <message> [--build]
    Snap,

    /// bit lane remove <org>.<scope>/<lane> --silent --force
    LaneRemove,

    /// bit export
    Export,
}

impl LaneStep {
    /// Get the step name as a string.
    pub fn name(&self) -> &'static str {
        match self {
            LaneStep::Status => "status",
            LaneStep::StrictStatus => "strict_status",
            LaneStep::LaneCreate => "lane_create",
            LaneStep::Snap => "snap",
            LaneStep::LaneRemove => "lane_remove",
            LaneStep::Export => "export",
        }
    }

    /// Recovery policy for this step.
    ///
    /// Only lane removal is tolerated: on the first run for a PR there is no
    /// remote lane to remove.
    pub fn policy(&self) -> StepPolicy {
        match self {
            LaneStep::LaneRemove => StepPolicy::LogAndContinue,
            _ => StepPolicy::Fatal,
        }
    }

    /// Whether stdout must be captured instead of streamed to the CI log.
    pub fn captures_output(&self) -> bool {
        matches!(self, LaneStep::Status)
    }

    /// Whether pass-through arguments are appended to this step.
    pub fn accepts_passthrough(&self) -> bool {
        !matches!(self, LaneStep::Status)
    }
}

/// Arguments for `bit status --json`.
pub fn status_args() -> Vec<String> {
    vec!["status".to_string(), "--json".to_string()]
}

/// Arguments for `bit status --strict`.
pub fn strict_status_args() -> Vec<String> {
    vec!["status".to_string(), "--strict".to_string()]
}

/// Arguments for `bit lane create <lane>`.
pub fn lane_create_args(lane: &str) -> Vec<String> {
    vec!["lane".to_string(), "create".to_string(), lane.to_string()]
}

/// Arguments for `bit snap`. `--build` is left out when an external pipeline
/// builds the snapped components.
pub fn snap_args(message: &str, build: bool) -> Vec<String> {
    let mut args = vec!["snap".to_string(), "-m".to_string(), message.to_string()];
    if build {
        args.push("--build".to_string());
    }
    args
}

/// Arguments for removing the remote copy of a lane.
pub fn lane_remove_args(lane_id: &str) -> Vec<String> {
    vec![
        "lane".to_string(),
        "remove".to_string(),
        lane_id.to_string(),
        "--silent".to_string(),
        "--force".to_string(),
    ]
}

/// Arguments for `bit export`.
pub fn export_args() -> Vec<String> {
    vec!["export".to_string()]
}
