//! Workspace tool execution.

use crate::error::{LaneError, Result};
use crate::step::LaneStep;
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;

/// A single command for the workspace tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    /// Step this command belongs to.
    pub step: LaneStep,

    /// Arguments after the executable, pass-through arguments included.
    pub args: Vec<String>,

    /// Working directory (the Bit workspace root).
    pub cwd: PathBuf,
}

/// Result of a step execution.
#[derive(Debug, Clone)]
pub struct StepResult {
    /// Step name.
    pub step_name: String,

    /// Exit code (0 = success, -1 when killed by a signal).
    pub exit_code: i32,

    /// Captured stdout, empty for streamed steps.
    pub stdout: String,

    /// Captured stderr, empty for streamed steps.
    pub stderr: String,

    /// Duration in milliseconds.
    pub duration_ms: u64,

    /// Whether execution succeeded.
    pub success: bool,
}

impl StepResult {
    /// Whether this step passed (exit code 0).
    pub fn passed(&self) -> bool {
        self.success && self.exit_code == 0
    }
}

/// Something that can run workspace tool commands.
#[async_trait]
pub trait WorkspaceTool: Send + Sync {
    /// Run one command and report how it exited.
    ///
    /// A non-zero exit is an `Ok` result; only failures to run the command
    /// at all are errors.
    async fn invoke(&self, invocation: &ToolInvocation) -> Result<StepResult>;
}

/// Runs the `bit` executable as a child process.
#[derive(Debug, Clone)]
pub struct BitCli {
    binary: String,
    timeout_secs: u64,
}

impl BitCli {
    /// Create a runner for the given executable, without a timeout.
    pub fn new(binary: &str) -> Self {
        Self {
            binary: binary.to_string(),
            timeout_secs: 0,
        }
    }

    /// Kill commands that run longer than `secs` (0 disables the timeout).
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

#[async_trait]
impl WorkspaceTool for BitCli {
    async fn invoke(&self, invocation: &ToolInvocation) -> Result<StepResult> {
        let start = Instant::now();
        let step = invocation.step;
        let capture = step.captures_output();

        let mut command = Command::new(&self.binary);
        command
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .kill_on_drop(true);
        if capture {
            command.stdout(Stdio::piped()).stderr(Stdio::piped());
        } else {
            command.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        }

        let child = command.spawn().map_err(|source| LaneError::Spawn {
            step: step.name().to_string(),
            source,
        })?;

        let waited = if self.timeout_secs > 0 {
            tokio::time::timeout(
                Duration::from_secs(self.timeout_secs),
                child.wait_with_output(),
            )
            .await
            .map_err(|_| LaneError::Timeout {
                step: step.name().to_string(),
                secs: self.timeout_secs,
            })?
        } else {
            child.wait_with_output().await
        };
        let output = waited.map_err(|source| LaneError::Spawn {
            step: step.name().to_string(),
            source,
        })?;

        let duration_ms = start.elapsed().as_millis() as u64;
        let exit_code = output.status.code().unwrap_or(-1);

        Ok(StepResult {
            step_name: step.name().to_string(),
            exit_code,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            duration_ms,
            success: output.status.success(),
        })
    }
}
