//! Integration tests for the review-lane workflow with in-memory fakes.

use lane_review::fakes::{FakeWorkspaceTool, MemoryIssueTracker};
use lane_review::{
    CommentAction, Invocation, LaneConfig, LaneError, LaneStep, LaneWorkflow, WorkflowOutcome,
};
use std::path::PathBuf;

const CHANGED: &str = r#"{"newComponents":["acme.design/button"],"modifiedComponents":[]}"#;
const UNCHANGED: &str = r#"{"newComponents":[],"modifiedComponents":[]}"#;
const BOT: &str = "github-actions[bot]";

fn invocation(extra_args: &[&str]) -> Invocation {
    Invocation {
        repo: "widgets".to_string(),
        owner: "acme".to_string(),
        pr_number: 42,
        lane_name: "pr-42".to_string(),
        workspace_dir: PathBuf::from("/work/ws"),
        extra_args: extra_args.iter().map(|a| a.to_string()).collect(),
    }
}

fn config() -> LaneConfig {
    LaneConfig::new("acme", "design")
}

/// Test: clean workspace stops after the status check
#[tokio::test]
async fn test_no_changes_is_noop() {
    let tool = FakeWorkspaceTool::new(UNCHANGED);
    let tracker = MemoryIssueTracker::new().with_title(Some("Fix bug"));
    let config = config();

    let outcome = LaneWorkflow::new(&tool, &tracker, &config)
        .run(&invocation(&["--log"]))
        .await
        .expect("run failed");

    assert_eq!(outcome, WorkflowOutcome::NoChanges);
    assert_eq!(tool.steps(), vec![LaneStep::Status]);
    assert!(tracker.comments().is_empty());
    assert_eq!(tracker.created_count(), 0);
}

/// Test: missing component lists count as no changes
#[tokio::test]
async fn test_absent_lists_is_noop() {
    let tool = FakeWorkspaceTool::new("\n  {\"stagedComponents\": []}\n");
    let tracker = MemoryIssueTracker::new();
    let config = config();

    let outcome = LaneWorkflow::new(&tool, &tracker, &config)
        .run(&invocation(&[]))
        .await
        .expect("run failed");

    assert_eq!(outcome, WorkflowOutcome::NoChanges);
    assert_eq!(tool.calls().len(), 1);
}

/// Test: full command sequence runs in order with pass-through arguments
#[tokio::test]
async fn test_full_sequence_in_order() {
    let tool = FakeWorkspaceTool::new(CHANGED);
    let tracker = MemoryIssueTracker::new().with_title(Some("Fix bug"));
    let config = config();

    let outcome = LaneWorkflow::new(&tool, &tracker, &config)
        .run(&invocation(&["--log", "debug"]))
        .await
        .expect("run failed");

    assert_eq!(
        tool.steps(),
        vec![
            LaneStep::Status,
            LaneStep::StrictStatus,
            LaneStep::LaneCreate,
            LaneStep::Snap,
            LaneStep::LaneRemove,
            LaneStep::Export,
        ]
    );

    assert_eq!(tool.args_for(LaneStep::Status).unwrap(), vec!["status", "--json"]);
    assert_eq!(
        tool.args_for(LaneStep::StrictStatus).unwrap(),
        vec!["status", "--strict", "--log", "debug"]
    );
    assert_eq!(
        tool.args_for(LaneStep::LaneCreate).unwrap(),
        vec!["lane", "create", "pr-42", "--log", "debug"]
    );
    assert_eq!(
        tool.args_for(LaneStep::Snap).unwrap(),
        vec!["snap", "-m", "Fix bug", "--build", "--log", "debug"]
    );
    assert_eq!(
        tool.args_for(LaneStep::LaneRemove).unwrap(),
        vec![
            "lane",
            "remove",
            "acme.design/pr-42",
            "--silent",
            "--force",
            "--log",
            "debug"
        ]
    );
    assert_eq!(
        tool.args_for(LaneStep::Export).unwrap(),
        vec!["export", "--log", "debug"]
    );
    assert!(tool
        .calls()
        .iter()
        .all(|c| c.cwd == PathBuf::from("/work/ws")));

    match outcome {
        WorkflowOutcome::Published {
            lane_url,
            comment,
            stale_lane_removed,
        } => {
            assert_eq!(lane_url, "https://bit.cloud/acme/design/~lane/pr-42");
            assert!(matches!(comment, CommentAction::Created(_)));
            assert!(stale_lane_removed);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

/// Test: snap message falls back to the newest commit, then to "CI"
#[tokio::test]
async fn test_snap_message_sources() {
    let config = config();

    let tool = FakeWorkspaceTool::new(CHANGED);
    let tracker = MemoryIssueTracker::new()
        .with_title(Some(""))
        .with_commits(&["a", "b", "c"]);
    LaneWorkflow::new(&tool, &tracker, &config)
        .run(&invocation(&[]))
        .await
        .expect("run failed");
    assert_eq!(tool.args_for(LaneStep::Snap).unwrap(), vec!["snap", "-m", "c", "--build"]);

    let tool = FakeWorkspaceTool::new(CHANGED);
    let tracker = MemoryIssueTracker::new().with_title(Some(""));
    LaneWorkflow::new(&tool, &tracker, &config)
        .run(&invocation(&[]))
        .await
        .expect("run failed");
    assert_eq!(tool.args_for(LaneStep::Snap).unwrap(), vec!["snap", "-m", "CI", "--build"]);
}

/// Test: external builds drop the --build flag
#[tokio::test]
async fn test_external_build_omits_build_flag() {
    let tool = FakeWorkspaceTool::new(CHANGED);
    let tracker = MemoryIssueTracker::new().with_title(Some("Fix bug"));
    let config = config().with_external_build(true);

    LaneWorkflow::new(&tool, &tracker, &config)
        .run(&invocation(&[]))
        .await
        .expect("run failed");

    let snap = tool.args_for(LaneStep::Snap).unwrap();
    assert_eq!(snap, vec!["snap", "-m", "Fix bug"]);
    assert!(!snap.contains(&"--build".to_string()));
}

/// Test: RIPPLE resolution feeds the build flag
#[tokio::test]
async fn test_ripple_env_values() {
    for (ripple, expect_build) in [(Some("true"), false), (Some("false"), true), (None, true)] {
        let config = LaneConfig::from_lookup(|key| match key {
            "ORG" => Some("acme".to_string()),
            "SCOPE" => Some("design".to_string()),
            "RIPPLE" => ripple.map(str::to_string),
            _ => None,
        })
        .unwrap();
        let tool = FakeWorkspaceTool::new(CHANGED);
        let tracker = MemoryIssueTracker::new().with_title(Some("t"));

        LaneWorkflow::new(&tool, &tracker, &config)
            .run(&invocation(&[]))
            .await
            .expect("run failed");

        let has_build = tool
            .args_for(LaneStep::Snap)
            .unwrap()
            .contains(&"--build".to_string());
        assert_eq!(has_build, expect_build, "RIPPLE={ripple:?}");
    }
}

/// Test: an existing bot comment is updated in place, twice
#[tokio::test]
async fn test_existing_comment_is_updated() {
    let tracker = MemoryIssueTracker::new()
        .with_title(Some("Fix bug"))
        .with_comment(7, "Thanks!", "octocat")
        .with_comment(
            9,
            "⚠️ Please review the changes in the Bit lane: https://bit.cloud/acme/design/~lane/pr-42",
            BOT,
        );
    let config = config();

    for _ in 0..2 {
        let tool = FakeWorkspaceTool::new(CHANGED);
        let outcome = LaneWorkflow::new(&tool, &tracker, &config)
            .run(&invocation(&[]))
            .await
            .expect("run failed");
        assert!(matches!(
            outcome,
            WorkflowOutcome::Published {
                comment: CommentAction::Updated(9),
                ..
            }
        ));
    }

    assert_eq!(tracker.created_count(), 0);
    assert_eq!(tracker.updated_count(), 2);
    let comments = tracker.comments();
    assert_eq!(comments.len(), 2);
    let body = comments[1].body.as_deref().unwrap();
    assert!(body.contains("\n\n_Lane updated: "));
    assert!(body.ends_with(" UTC_"));
}

/// Test: first run creates exactly one comment, second run updates it
#[tokio::test]
async fn test_comment_created_then_updated() {
    let tracker = MemoryIssueTracker::new()
        .with_title(Some("Fix bug"))
        .with_comment(3, "https://bit.cloud mentioned by a human", "octocat");
    let config = config();

    let tool = FakeWorkspaceTool::new(CHANGED);
    let first = LaneWorkflow::new(&tool, &tracker, &config)
        .run(&invocation(&[]))
        .await
        .expect("first run failed");
    let created_id = match first {
        WorkflowOutcome::Published {
            comment: CommentAction::Created(id),
            ..
        } => id,
        other => panic!("expected a created comment, got {other:?}"),
    };
    assert_eq!(tracker.created_count(), 1);
    let body = tracker.comments()[1].body.clone().unwrap();
    assert!(body.starts_with(
        "⚠️ Please review the changes in the Bit lane: https://bit.cloud/acme/design/~lane/pr-42"
    ));
    assert!(body.contains("_Lane created: "));

    let tool = FakeWorkspaceTool::new(CHANGED);
    let second = LaneWorkflow::new(&tool, &tracker, &config)
        .run(&invocation(&[]))
        .await
        .expect("second run failed");
    assert!(matches!(
        second,
        WorkflowOutcome::Published { comment: CommentAction::Updated(id), .. } if id == created_id
    ));
    assert_eq!(tracker.created_count(), 1);
    assert_eq!(tracker.comments().len(), 2);
}

/// Test: failed lane removal does not stop export or the comment
#[tokio::test]
async fn test_lane_remove_failure_is_tolerated() {
    let tool = FakeWorkspaceTool::new(CHANGED).failing(LaneStep::LaneRemove, 1);
    let tracker = MemoryIssueTracker::new().with_title(Some("Fix bug"));
    let config = config();

    let outcome = LaneWorkflow::new(&tool, &tracker, &config)
        .run(&invocation(&[]))
        .await
        .expect("run should survive lane removal failure");

    assert_eq!(tool.steps().last(), Some(&LaneStep::Export));
    assert_eq!(tracker.created_count(), 1);
    assert!(matches!(
        outcome,
        WorkflowOutcome::Published {
            stale_lane_removed: false,
            ..
        }
    ));
}

/// Test: lane removal that cannot even start is tolerated too
#[tokio::test]
async fn test_lane_remove_spawn_failure_is_tolerated() {
    let tool = FakeWorkspaceTool::new(CHANGED).unspawnable(LaneStep::LaneRemove);
    let tracker = MemoryIssueTracker::new().with_title(Some("Fix bug"));
    let config = config();

    LaneWorkflow::new(&tool, &tracker, &config)
        .run(&invocation(&[]))
        .await
        .expect("run should survive lane removal failure");

    assert!(tool.steps().contains(&LaneStep::Export));
    assert_eq!(tracker.created_count(), 1);
}

/// Test: strict status failure aborts before the lane is created
#[tokio::test]
async fn test_strict_status_failure_is_fatal() {
    let tool = FakeWorkspaceTool::new(CHANGED).failing(LaneStep::StrictStatus, 1);
    let tracker = MemoryIssueTracker::new().with_title(Some("Fix bug"));
    let config = config();

    let err = LaneWorkflow::new(&tool, &tracker, &config)
        .run(&invocation(&[]))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        LaneError::StepFailed { ref step, exit_code: 1 } if step == "strict_status"
    ));
    assert_eq!(tool.steps(), vec![LaneStep::Status, LaneStep::StrictStatus]);
    assert_eq!(tracker.created_count(), 0);
}

/// Test: export failure aborts and no comment is posted
#[tokio::test]
async fn test_export_failure_is_fatal() {
    let tool = FakeWorkspaceTool::new(CHANGED).failing(LaneStep::Export, 3);
    let tracker = MemoryIssueTracker::new().with_title(Some("Fix bug"));
    let config = config();

    let err = LaneWorkflow::new(&tool, &tracker, &config)
        .run(&invocation(&[]))
        .await
        .unwrap_err();

    assert!(matches!(err, LaneError::StepFailed { exit_code: 3, .. }));
    assert!(tracker.comments().is_empty());
}

/// Test: unparseable status output is fatal
#[tokio::test]
async fn test_malformed_status_is_fatal() {
    let tool = FakeWorkspaceTool::new("error: workspace not found");
    let tracker = MemoryIssueTracker::new();
    let config = config();

    let err = LaneWorkflow::new(&tool, &tracker, &config)
        .run(&invocation(&[]))
        .await
        .unwrap_err();

    assert!(matches!(err, LaneError::MalformedStatus(_)));
    assert_eq!(tool.calls().len(), 1);
}

/// Test: API failure while deriving the message stops before snapping
#[tokio::test]
async fn test_api_failure_is_fatal() {
    let tool = FakeWorkspaceTool::new(CHANGED);
    let tracker = MemoryIssueTracker::new().without_pull_request();
    let config = config();

    let err = LaneWorkflow::new(&tool, &tracker, &config)
        .run(&invocation(&[]))
        .await
        .unwrap_err();

    assert!(matches!(err, LaneError::GitHub(_)));
    assert!(!tool.steps().contains(&LaneStep::Snap));
}
