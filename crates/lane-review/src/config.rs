//! Run configuration and invocation parameters.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{LaneError, Result};

/// Default workspace tool binary.
pub const DEFAULT_TOOL_BINARY: &str = "bit";

/// Default Bit Cloud origin, used for lane links and to recognise our comment.
pub const DEFAULT_CLOUD_URL: &str = "https://bit.cloud";

/// GitHub login that owns the lane comment.
pub const DEFAULT_BOT_LOGIN: &str = "github-actions[bot]";

/// Lane configuration, resolved once at the process boundary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LaneConfig {
    /// Bit Cloud organisation owning the lane
    pub org: String,
    /// Bit scope the lane is exported to
    pub scope: String,
    /// Another pipeline (Ripple CI) builds snaps, so `--build` is skipped
    pub use_external_build: bool,
    /// Workspace tool executable
    pub tool_binary: String,
    /// Bit Cloud origin without trailing slash
    pub cloud_url: String,
    /// Author login of the comment we maintain on the PR
    pub bot_login: String,
}

impl LaneConfig {
    /// Create a config for an org/scope pair with default tool and cloud settings.
    pub fn new(org: &str, scope: &str) -> Self {
        LaneConfig {
            org: org.to_string(),
            scope: scope.to_string(),
            use_external_build: false,
            tool_binary: DEFAULT_TOOL_BINARY.to_string(),
            cloud_url: DEFAULT_CLOUD_URL.to_string(),
            bot_login: DEFAULT_BOT_LOGIN.to_string(),
        }
    }

    /// Resolve from `ORG`, `SCOPE`, `RIPPLE`, `BIT_BIN` and `BIT_CLOUD_URL`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| LaneError::Config(format!("{key} is not set")))
        };

        let org = required("ORG")?;
        let scope = required("SCOPE")?;

        let mut config = LaneConfig::new(&org, &scope)
            .with_external_build(is_ripple_enabled(lookup("RIPPLE").as_deref()));
        if let Some(bin) = lookup("BIT_BIN").filter(|v| !v.is_empty()) {
            config = config.with_tool_binary(&bin);
        }
        if let Some(url) = lookup("BIT_CLOUD_URL").filter(|v| !v.is_empty()) {
            config = config.with_cloud_url(&url);
        }
        Ok(config)
    }

    /// Mark builds as handled by an external pipeline.
    pub fn with_external_build(mut self, external: bool) -> Self {
        self.use_external_build = external;
        self
    }

    /// Use a different workspace tool executable.
    pub fn with_tool_binary(mut self, binary: &str) -> Self {
        self.tool_binary = binary.to_string();
        self
    }

    /// Point lane links at a different Bit Cloud origin.
    pub fn with_cloud_url(mut self, url: &str) -> Self {
        self.cloud_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Maintain comments authored by a different login.
    pub fn with_bot_login(mut self, login: &str) -> Self {
        self.bot_login = login.to_string();
        self
    }

    /// Remote lane identifier, `<org>.<scope>/<lane>`.
    pub fn remote_lane_id(&self, lane: &str) -> String {
        format!("{}.{}/{}", self.org, self.scope, lane)
    }

    /// Web URL of a lane on Bit Cloud.
    pub fn lane_url(&self, lane: &str) -> String {
        format!("{}/{}/{}/~lane/{}", self.cloud_url, self.org, self.scope, lane)
    }
}

/// `RIPPLE` disables `--build` only when set to exactly `"true"`.
pub fn is_ripple_enabled(value: Option<&str>) -> bool {
    value == Some("true")
}

/// Per-run parameters supplied by the CI environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Repository name
    pub repo: String,
    /// Repository owner or organisation
    pub owner: String,
    /// Pull request number
    pub pr_number: u64,
    /// Lane to create and export
    pub lane_name: String,
    /// Bit workspace root
    pub workspace_dir: PathBuf,
    /// Appended to every tool command after the status check
    pub extra_args: Vec<String>,
}
