//! lane-review - review lanes for pull requests
//!
//! Run from a pull request CI job inside a Bit workspace. When components
//! changed, creates a lane, snaps and exports it, then links it from the PR.
//!
//! Inputs come from flags or the usual GitHub Actions environment; anything
//! after `--` is passed through to every `bit` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use lane_review::{
    BitCli, GitHubClient, Invocation, LaneConfig, LaneWorkflow, WorkflowOutcome,
};
use tracing::{info, Level};

#[derive(Parser, Debug)]
#[command(name = "lane-review")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Create a Bit review lane for a pull request", long_about = None)]
struct Cli {
    /// GitHub token used for PR metadata and comments
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: String,

    /// Repository owner or organisation
    #[arg(long, env = "GITHUB_REPOSITORY_OWNER")]
    owner: String,

    /// Repository name (default: taken from GITHUB_REPOSITORY)
    #[arg(long)]
    repo: Option<String>,

    /// `owner/name` as set by GitHub Actions
    #[arg(long, env = "GITHUB_REPOSITORY", hide = true)]
    repository: Option<String>,

    /// Pull request number
    #[arg(long, env = "PR_NUMBER")]
    pr: u64,

    /// Lane to create and export
    #[arg(long, env = "LANE_NAME")]
    lane: String,

    /// Bit workspace directory
    #[arg(long, env = "WSDIR", default_value = "./")]
    ws_dir: PathBuf,

    /// Bit Cloud organisation
    #[arg(long, env = "ORG")]
    org: String,

    /// Bit scope the lane is exported to
    #[arg(long, env = "SCOPE")]
    scope: String,

    /// "true" when Ripple CI builds the snaps (skips --build)
    #[arg(long, env = "RIPPLE")]
    ripple: Option<String>,

    /// GitHub REST API origin
    #[arg(long, env = "GITHUB_API_URL", default_value = lane_review::github::DEFAULT_API_URL)]
    api_url: String,

    /// Bit executable
    #[arg(long, env = "BIT_BIN", default_value = lane_review::config::DEFAULT_TOOL_BINARY)]
    bit_bin: String,

    /// Bit Cloud origin used for lane links
    #[arg(long, env = "BIT_CLOUD_URL", default_value = lane_review::config::DEFAULT_CLOUD_URL)]
    cloud_url: String,

    /// Kill a bit command after this many seconds (0 = never)
    #[arg(long, default_value = "0")]
    timeout_secs: u64,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,

    /// Extra arguments appended to every bit command
    #[arg(last = true)]
    bit_args: Vec<String>,
}

impl Cli {
    /// Repository name from `--repo`, else the part after `/` in GITHUB_REPOSITORY.
    fn repo_name(&self) -> Result<String> {
        if let Some(repo) = &self.repo {
            return Ok(repo.clone());
        }
        self.repository
            .as_deref()
            .and_then(|full| full.split_once('/'))
            .map(|(_, name)| name.to_string())
            .context("Repository name not given: pass --repo or set GITHUB_REPOSITORY")
    }

    fn config(&self) -> LaneConfig {
        LaneConfig::new(&self.org, &self.scope)
            .with_external_build(lane_review::config::is_ripple_enabled(
                self.ripple.as_deref(),
            ))
            .with_tool_binary(&self.bit_bin)
            .with_cloud_url(&self.cloud_url)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    lane_review::init_tracing(cli.json, level);

    let config = cli.config();
    let invocation = Invocation {
        repo: cli.repo_name()?,
        owner: cli.owner.clone(),
        pr_number: cli.pr,
        lane_name: cli.lane.clone(),
        workspace_dir: cli.ws_dir.clone(),
        extra_args: cli.bit_args.clone(),
    };

    let tool = BitCli::new(&config.tool_binary).with_timeout(cli.timeout_secs);
    let tracker = GitHubClient::new(&cli.token, &invocation.owner, &invocation.repo)
        .with_api_url(&cli.api_url);

    let outcome = LaneWorkflow::new(&tool, &tracker, &config)
        .run(&invocation)
        .await
        .with_context(|| {
            format!(
                "Review lane {} for {}/{}#{} failed",
                invocation.lane_name, invocation.owner, invocation.repo, invocation.pr_number
            )
        })?;

    match outcome {
        WorkflowOutcome::NoChanges => info!("Nothing to review"),
        WorkflowOutcome::Published {
            lane_url,
            comment,
            stale_lane_removed,
        } => info!(
            lane_url = %lane_url,
            comment_id = comment.comment_id(),
            stale_lane_removed = stale_lane_removed,
            "Review lane published"
        ),
    }

    Ok(())
}
