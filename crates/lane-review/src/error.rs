//! Error types for lane-review

use thiserror::Error;

/// Errors that can abort a review-lane run
#[derive(Error, Debug)]
pub enum LaneError {
    /// `bit status --json` produced something other than a status document
    #[error("Malformed workspace status: {0}")]
    MalformedStatus(#[source] serde_json::Error),

    /// A workspace tool command exited non-zero
    #[error("Step {step} exited with code {exit_code}")]
    StepFailed { step: String, exit_code: i32 },

    /// A workspace tool command could not be started
    #[error("Failed to start step {step}: {source}")]
    Spawn {
        step: String,
        #[source]
        source: std::io::Error,
    },

    /// A workspace tool command ran past its timeout
    #[error("Step {step} timed out after {secs} seconds")]
    Timeout { step: String, secs: u64 },

    /// GitHub REST API failure
    #[error(transparent)]
    GitHub(#[from] GitHubError),

    /// Required configuration is missing or invalid
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Errors returned by the GitHub REST API client
#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub API error: {message} (status: {status})")]
    Api { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Rate limit exceeded")]
    RateLimited,
}

/// Convenience result alias.
pub type Result<T> = std::result::Result<T, LaneError>;
