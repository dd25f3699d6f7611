//! Tracing initialisation for the lane-review binary.
//!
//! Logs go to stderr so the CI log interleaves them with the output of the
//! `bit` commands, which inherit the same stream. Filtering comes from
//! `LANE_REVIEW_LOG`, then `RUST_LOG`, then the level chosen on the command
//! line. The default keeps HTTP client internals at `warn`.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter variable specific to this tool; wins over `RUST_LOG`.
pub const LOG_ENV: &str = "LANE_REVIEW_LOG";

/// Directive used when neither filter variable is set.
pub fn default_directive(level: Level) -> String {
    let level = level.as_str().to_ascii_lowercase();
    format!("warn,lane_review={level},lane_review_cli={level}")
}

/// Pick the filter directive from the environment lookup, else the default.
pub fn filter_directive<F>(lookup: F, level: Level) -> String
where
    F: Fn(&str) -> Option<String>,
{
    [LOG_ENV, "RUST_LOG"]
        .into_iter()
        .filter_map(|key| lookup(key))
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default_directive(level))
}

/// Colour codes only outside CI runners, whose log viewers show them raw
/// unless asked for.
pub fn use_ansi<F>(lookup: F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup("CI").map_or(true, |v| v.is_empty() || v == "false")
}

/// Initialise the global tracing subscriber.
///
/// * `json` — emit newline-delimited JSON log lines.
/// * `level` — verbosity for this tool's crates when no filter variable is set.
///
/// Later calls are ignored; the global subscriber can only be set once.
pub fn init_tracing(json: bool, level: Level) {
    let env = |key: &str| std::env::var(key).ok();
    let directive = filter_directive(env, level);
    let env_filter = EnvFilter::try_new(&directive)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(level)));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .json(),
            )
            .try_init()
            .ok();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_ansi(use_ansi(env)),
            )
            .try_init()
            .ok();
    }
}
