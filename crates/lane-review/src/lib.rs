//! lane-review - Bit review lanes for pull requests
//!
//! When a pull request changes Bit components, the workflow:
//! - Creates and snaps a review lane in the workspace
//! - Exports it to Bit Cloud, replacing any earlier copy
//! - Keeps a single PR comment linking to the lane

pub mod comment;
pub mod config;
pub mod error;
pub mod fakes;
pub mod github;
pub mod message;
pub mod runner;
pub mod status;
pub mod step;
pub mod telemetry;
pub mod workflow;

// Re-export key types
pub use comment::CommentAction;
pub use config::{Invocation, LaneConfig};
pub use error::{GitHubError, LaneError, Result};
pub use github::{GitHubClient, IssueTracker};
pub use runner::{BitCli, StepResult, ToolInvocation, WorkspaceTool};
pub use status::WorkspaceStatus;
pub use step::{LaneStep, StepPolicy};
pub use telemetry::init_tracing;
pub use workflow::{LaneWorkflow, WorkflowOutcome};
