use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use probehound::engine::{probe_fn, single_field, DispatchSettings, FailureKind, Fields, Outcome, ProbeSet};
use probehound::error::{OsintError, OsintResult, ProbeError};
use probehound::notify::{Notification, Notifier};
use probehound::reporting::{load_artifact, ResultSink};
use probehound::session::Session;
use probehound::target::{Target, TargetKind, Validator};
use probehound::RunResult;

fn settings(concurrency: usize, timeout_ms: u64) -> DispatchSettings {
    DispatchSettings::new(concurrency, Duration::from_millis(timeout_ms))
}

fn fields(value: serde_json::Value) -> Fields {
    value.as_object().cloned().unwrap()
}

/// A fast, B slightly later and overlapping on `x`, C never finishes in time
fn overlapping_probes() -> ProbeSet {
    ProbeSet::from_probes(
        TargetKind::Ip,
        vec![
            probe_fn("A", |_| async { Ok::<_, ProbeError>(fields(json!({ "x": 1 }))) }),
            probe_fn("B", |_| async {
                tokio::time::sleep(Duration::from_millis(100)).await;
                Ok::<_, ProbeError>(fields(json!({ "x": 2, "y": 3 })))
            }),
            probe_fn("C", |_| async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok::<_, ProbeError>(fields(json!({ "z": 0 })))
            }),
        ],
    )
    .unwrap()
}

struct CountingNotifier {
    calls: AtomicUsize,
    fail: bool,
}

#[async_trait]
impl Notifier for CountingNotifier {
    async fn notify(&self, _notification: &Notification) -> OsintResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(OsintError::Notification("no display".to_string()))
        } else {
            Ok(())
        }
    }
}

struct BrokenSink;

#[async_trait]
impl ResultSink for BrokenSink {
    async fn persist(&self, _result: &RunResult, _kind: TargetKind, dir: &Path) -> OsintResult<Option<PathBuf>> {
        Err(OsintError::Persistence {
            path: dir.to_path_buf(),
            message: "disk full".to_string(),
        })
    }
}

struct AcceptAll;

impl Validator for AcceptAll {
    fn is_valid(&self, _kind: TargetKind, _raw: &str) -> bool {
        true
    }
}

#[tokio::test]
async fn test_end_to_end_run_merges_and_persists() {
    let dir = tempfile::tempdir().unwrap();

    let report = Session::new(overlapping_probes(), settings(3, 500))
        .target("203.0.113.5")
        .output(dir.path())
        .execute()
        .await
        .unwrap()
        .finish()
        .await
        .unwrap();

    assert_eq!(report.result.fields(), &fields(json!({ "x": 2, "y": 3 })));
    assert_eq!(report.ledger.len(), 3);
    assert_eq!(report.ledger.outcome("C"), Some(&Outcome::Timeout));
    assert!(report.ledger.outcome("A").unwrap().is_success());
    assert_eq!(report.ledger.get("A").unwrap().sequence, 0);

    let artifact = report.artifact.clone().unwrap();
    let name = artifact.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("TraceLog_"));
    assert!(name.ends_with(".json"));

    let loaded = load_artifact(&artifact).await.unwrap();
    assert_eq!(loaded, report.result);
    assert_eq!(RunResult::replay(&report.ledger), report.result);
}

#[tokio::test]
async fn test_empty_probe_set_is_a_configuration_error() {
    let dir = tempfile::tempdir().unwrap();

    let err = Session::new(ProbeSet::new(TargetKind::Email), settings(4, 1_000))
        .target("someone@example.com")
        .output(dir.path())
        .execute()
        .await
        .err()
        .unwrap();

    assert!(matches!(err, OsintError::Configuration(_)));
    assert!(err.is_fatal());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_all_failures_still_complete_without_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let probes = ProbeSet::from_probes(
        TargetKind::Username,
        vec![
            probe_fn("github", |_| async {
                Err::<Fields, _>(ProbeError::NotFound("404".to_string()))
            }),
            probe_fn("gitlab", |_| async {
                Err::<Fields, _>(ProbeError::Status {
                    status: 500,
                    url: "https://gitlab.com/octocat".to_string(),
                })
            }),
        ],
    )
    .unwrap();

    let report = Session::new(probes, settings(20, 1_000))
        .target("octocat")
        .output(dir.path())
        .execute()
        .await
        .unwrap()
        .finish()
        .await
        .unwrap();

    assert!(report.dispatched());
    assert!(report.result.is_empty());
    assert_eq!(report.ledger.failed(), 2);
    assert!(matches!(
        report.ledger.outcome("gitlab"),
        Some(Outcome::Failure { kind: FailureKind::Status, .. })
    ));
    assert!(report.artifact.is_none());
    assert!(report.persistence_error.is_none());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_invalid_target_never_runs_probes() {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&runs);
    let probes = ProbeSet::from_probes(
        TargetKind::Email,
        vec![probe_fn("breaches", move |_| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ProbeError>(single_field("breaches", json!([])))
            }
        })],
    )
    .unwrap();

    let report = Session::new(probes, settings(4, 1_000))
        .target("not-an-email")
        .execute()
        .await
        .unwrap()
        .finish()
        .await
        .unwrap();

    assert!(!report.dispatched());
    assert!(report.ledger.is_empty());
    assert_eq!(runs.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_custom_validator_is_authoritative() {
    let dir = tempfile::tempdir().unwrap();
    let probes = ProbeSet::from_probes(
        TargetKind::Username,
        vec![probe_fn("echo", |target: Target| async move {
            Ok::<_, ProbeError>(single_field("echo", target.value()))
        })],
    )
    .unwrap();

    let report = Session::new(probes, settings(1, 1_000))
        .with_validator(Arc::new(AcceptAll))
        .target("two words")
        .output(dir.path())
        .execute()
        .await
        .unwrap()
        .finish()
        .await
        .unwrap();

    assert_eq!(report.target, Some(Target::Username("two words".to_string())));
    assert_eq!(report.result.get("echo"), Some(&json!("two words")));
}

#[tokio::test]
async fn test_notifier_failure_does_not_affect_report() {
    let dir = tempfile::tempdir().unwrap();
    let notifier = Arc::new(CountingNotifier {
        calls: AtomicUsize::new(0),
        fail: true,
    });

    let report = Session::new(overlapping_probes(), settings(3, 300))
        .with_notifier(notifier.clone())
        .target("198.51.100.1")
        .output(dir.path())
        .execute()
        .await
        .unwrap()
        .notify()
        .finish()
        .await
        .unwrap();

    assert_eq!(notifier.calls.load(Ordering::SeqCst), 1);
    assert!(report.artifact.is_some());
    assert_eq!(report.result.len(), 2);
}

#[tokio::test]
async fn test_persistence_failure_keeps_the_result() {
    let dir = tempfile::tempdir().unwrap();
    let report = Session::new(overlapping_probes(), settings(3, 300))
        .with_sink(Arc::new(BrokenSink))
        .target("198.51.100.2")
        .output(dir.path())
        .execute()
        .await
        .unwrap()
        .finish()
        .await
        .unwrap();

    assert!(report.artifact.is_none());
    assert!(report.persistence_error.unwrap().contains("disk full"));
    assert_eq!(report.result.get("x"), Some(&json!(2)));
}

#[tokio::test]
async fn test_consecutive_runs_write_distinct_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let mut artifacts = Vec::new();

    for _ in 0..3 {
        let report = Session::new(overlapping_probes(), settings(3, 200))
            .target("192.0.2.1")
            .output(dir.path())
            .execute()
            .await
            .unwrap()
            .finish()
            .await
            .unwrap();
        artifacts.push(report.artifact.unwrap());
    }

    artifacts.sort();
    artifacts.dedup();
    assert_eq!(artifacts.len(), 3);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 3);
}
