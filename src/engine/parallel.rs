// src/engine/parallel.rs
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, info_span, warn, Instrument};

use super::outcome::{FailureKind, Ledger, Outcome, RunResult};
use super::probe::{Probe, ProbeSet};
use crate::error::{OsintError, OsintResult};
use crate::target::Target;

/// Worker-pool width and per-probe deadline for one dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSettings {
    pub concurrency: usize,
    pub timeout: Duration,
}

impl DispatchSettings {
    pub fn new(concurrency: usize, timeout: Duration) -> Self {
        Self {
            concurrency,
            timeout,
        }
    }

    fn validate(&self) -> OsintResult<()> {
        if self.concurrency == 0 {
            return Err(OsintError::Configuration(
                "Concurrency limit must be at least 1".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(OsintError::Configuration(
                "Per-probe timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Report sent from a worker back to the merging task
struct ProbeReport {
    probe: String,
    outcome: Outcome,
    elapsed: Duration,
}

/// Spawned probe tasks, aborted if the dispatch is dropped before they finish
struct ProbeTasks {
    handles: Vec<(String, JoinHandle<()>)>,
}

impl ProbeTasks {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            handles: Vec::with_capacity(capacity),
        }
    }
}

impl Drop for ProbeTasks {
    fn drop(&mut self) {
        for (_, handle) in &self.handles {
            handle.abort();
        }
    }
}

/// Bounded-concurrency executor for a probe set.
///
/// Every probe runs on its own task; at most `concurrency` of them hold a
/// worker slot at once. Outcomes flow through one channel to a single
/// consumer, which owns the merged result and the ledger.
pub struct Dispatcher {
    settings: DispatchSettings,
}

impl Dispatcher {
    pub fn new(settings: DispatchSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> DispatchSettings {
        self.settings
    }

    /// Run every probe in the set against the target.
    ///
    /// Returns once each probe has reported success, failure or timeout.
    /// Only contract violations (empty set, empty target, kind mismatch,
    /// unusable settings) are returned as errors, and those are raised
    /// before anything is scheduled.
    pub async fn run(&self, probes: &ProbeSet, target: &Target) -> OsintResult<(RunResult, Ledger)> {
        self.settings.validate()?;
        Self::check_contract(probes, target)?;

        info!(
            "Dispatching {} {} probes against {} (concurrency {}, timeout {:?})",
            probes.len(),
            probes.kind(),
            target.value(),
            self.settings.concurrency,
            self.settings.timeout
        );

        let semaphore = Arc::new(Semaphore::new(self.settings.concurrency));
        let (tx, mut rx) = mpsc::channel::<ProbeReport>(self.settings.concurrency);
        let target = Arc::new(target.clone());
        let timeout = self.settings.timeout;

        let mut tasks = ProbeTasks::with_capacity(probes.len());

        for probe in probes.iter() {
            let probe = Arc::clone(probe);
            let name = probe.name().to_string();
            let tx = tx.clone();
            let semaphore = Arc::clone(&semaphore);
            let target = Arc::clone(&target);
            let span = info_span!("probe", name = %name);

            let handle = tokio::spawn(
                async move {
                    let Ok(_permit) = semaphore.acquire_owned().await else {
                        return;
                    };

                    let started = Instant::now();
                    let outcome = execute_probe(probe.as_ref(), &target, timeout).await;
                    let report = ProbeReport {
                        probe: probe.name().to_string(),
                        outcome,
                        elapsed: started.elapsed(),
                    };

                    if tx.send(report).await.is_err() {
                        error!("Result channel closed before probe could report");
                    }
                }
                .instrument(span),
            );

            tasks.handles.push((name, handle));
        }

        // Workers hold the only remaining senders
        drop(tx);

        let mut result = RunResult::new();
        let mut ledger = Ledger::new();

        while let Some(report) = rx.recv().await {
            match &report.outcome {
                Outcome::Success(fields) => {
                    debug!("Probe {} returned {} fields in {:?}", report.probe, fields.len(), report.elapsed);
                    result.merge(fields);
                }
                Outcome::Failure { kind, message } => {
                    warn!("Probe {} failed ({:?}): {}", report.probe, kind, message);
                }
                Outcome::Timeout => {
                    warn!("Probe {} timed out after {:?}", report.probe, timeout);
                }
            }
            ledger.record(report.probe, report.outcome, report.elapsed);
        }

        // Anything that exited without reporting still gets exactly one entry
        for (name, handle) in tasks.handles.iter_mut() {
            let joined = handle.await;
            if ledger.contains(name) {
                continue;
            }

            let outcome = match joined {
                Err(e) if e.is_panic() => {
                    error!("Probe {} panicked", name);
                    Outcome::failure(FailureKind::Panicked, "probe panicked")
                }
                Err(e) => Outcome::failure(FailureKind::Aborted, e.to_string()),
                Ok(()) => Outcome::failure(FailureKind::Aborted, "probe exited without reporting"),
            };
            ledger.record(name.clone(), outcome, Duration::ZERO);
        }

        info!(
            "Dispatch complete: {} succeeded, {} failed, {} timed out",
            ledger.succeeded(),
            ledger.failed(),
            ledger.timed_out()
        );

        Ok((result, ledger))
    }

    fn check_contract(probes: &ProbeSet, target: &Target) -> OsintResult<()> {
        if probes.is_empty() {
            return Err(OsintError::Configuration(format!(
                "No probes registered for {} targets",
                probes.kind()
            )));
        }
        if target.value().trim().is_empty() {
            return Err(OsintError::Configuration("Target value is empty".to_string()));
        }
        if target.kind() != probes.kind() {
            return Err(OsintError::Configuration(format!(
                "Cannot run {} probes against a {} target",
                probes.kind(),
                target.kind()
            )));
        }
        Ok(())
    }
}

/// Convenience form of [`Dispatcher::run`]
pub async fn run(
    probes: &ProbeSet,
    target: &Target,
    concurrency: usize,
    timeout: Duration,
) -> OsintResult<(RunResult, Ledger)> {
    Dispatcher::new(DispatchSettings::new(concurrency, timeout))
        .run(probes, target)
        .await
}

/// Run one probe under its deadline. Dropping the future on timeout
/// cancels whatever I/O it still had in flight.
async fn execute_probe(probe: &dyn Probe, target: &Target, timeout: Duration) -> Outcome {
    match tokio::time::timeout(timeout, probe.run(target)).await {
        Ok(Ok(fields)) if fields.is_empty() => Outcome::failure(FailureKind::Empty, "probe returned no fields"),
        Ok(Ok(fields)) => Outcome::Success(fields),
        Ok(Err(e)) => Outcome::from(e),
        Err(_) => Outcome::Timeout,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use crate::engine::probe::{probe_fn, single_field, Fields};
    use crate::error::ProbeError;
    use crate::target::TargetKind;

    fn target() -> Target {
        Target::Username("octocat".into())
    }

    fn delayed(name: &str, delay: Duration, fields: Fields) -> Arc<dyn Probe> {
        probe_fn(name, move |_| {
            let fields = fields.clone();
            async move {
                tokio::time::sleep(delay).await;
                Ok::<_, ProbeError>(fields)
            }
        })
    }

    struct PanickingProbe;

    #[async_trait::async_trait]
    impl Probe for PanickingProbe {
        fn name(&self) -> &str {
            "boom"
        }

        async fn run(&self, _target: &Target) -> crate::error::ProbeResult<Fields> {
            panic!("probe bug")
        }
    }

    fn failing(name: &str) -> Arc<dyn Probe> {
        probe_fn(name, |_| async {
            Err::<Fields, _>(ProbeError::Status {
                status: 503,
                url: "https://example.invalid".into(),
            })
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_later_completion_overwrites_and_slow_probe_times_out() {
        let probes = ProbeSet::from_probes(
            TargetKind::Username,
            vec![
                delayed("a", Duration::from_secs(1), single_field("x", 1)),
                delayed("b", Duration::from_secs(2), single_field("x", 2)),
                delayed("c", Duration::from_secs(3), single_field("y", 3)),
            ],
        )
        .unwrap();

        let (result, ledger) = run(&probes, &target(), 3, Duration::from_millis(2500))
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result.get("x"), Some(&json!(2)));
        assert!(result.get("y").is_none());

        assert_eq!(ledger.len(), 3);
        assert!(ledger.outcome("a").unwrap().is_success());
        assert!(ledger.outcome("b").unwrap().is_success());
        assert!(ledger.outcome("c").unwrap().is_timeout());
        assert!(ledger.get("a").unwrap().sequence < ledger.get("b").unwrap().sequence);
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_entry_per_probe_for_any_concurrency() {
        for concurrency in [1, 2, 5, 10] {
            let probes = ProbeSet::from_probes(
                TargetKind::Username,
                (0..10).map(|i| {
                    let name = format!("p{i}");
                    if i % 3 == 0 {
                        failing(&name)
                    } else {
                        delayed(&name, Duration::from_millis(100 * i), single_field(name.clone(), i))
                    }
                }),
            )
            .unwrap();

            let (result, ledger) = run(&probes, &target(), concurrency, Duration::from_secs(5))
                .await
                .unwrap();

            assert_eq!(ledger.len(), 10, "concurrency {concurrency}");
            assert_eq!(ledger.failed(), 4);
            assert_eq!(ledger.timed_out(), 0);
            assert_eq!(result.len(), 6);
        }
    }

    #[tokio::test]
    async fn test_concurrency_limit_is_respected() {
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let probes = ProbeSet::from_probes(
            TargetKind::Username,
            (0..12).map(|i| {
                let running = Arc::clone(&running);
                let peak = Arc::clone(&peak);
                probe_fn(format!("p{i}"), move |_| {
                    let running = Arc::clone(&running);
                    let peak = Arc::clone(&peak);
                    async move {
                        let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        running.fetch_sub(1, Ordering::SeqCst);
                        Ok::<_, ProbeError>(single_field(format!("p{i}"), true))
                    }
                })
            }),
        )
        .unwrap();

        let (result, ledger) = run(&probes, &target(), 3, Duration::from_secs(5)).await.unwrap();

        assert_eq!(ledger.succeeded(), 12);
        assert_eq!(result.len(), 12);
        assert!(peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_failures_still_complete() {
        let probes = ProbeSet::from_probes(
            TargetKind::Username,
            vec![failing("github"), failing("gitlab")],
        )
        .unwrap();

        let (result, ledger) = run(&probes, &target(), 2, Duration::from_secs(1)).await.unwrap();

        assert!(result.is_empty());
        assert_eq!(ledger.failed(), 2);
        assert_eq!(
            ledger.outcome("github"),
            Some(&Outcome::failure(
                FailureKind::Status,
                "unexpected status 503 from https://example.invalid"
            ))
        );
    }

    #[tokio::test]
    async fn test_panicking_probe_is_isolated() {
        let probes = ProbeSet::from_probes(
            TargetKind::Username,
            vec![
                Arc::new(PanickingProbe) as Arc<dyn Probe>,
                delayed("ok", Duration::from_millis(1), single_field("ok", true)),
            ],
        )
        .unwrap();

        let (result, ledger) = run(&probes, &target(), 2, Duration::from_secs(1)).await.unwrap();

        assert_eq!(ledger.len(), 2);
        assert_eq!(result.get("ok"), Some(&json!(true)));
        assert!(matches!(
            ledger.outcome("boom"),
            Some(Outcome::Failure { kind: FailureKind::Panicked, .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_payload_is_a_failure() {
        let probes = ProbeSet::from_probes(
            TargetKind::Username,
            vec![probe_fn("hollow", |_| async { Ok::<_, ProbeError>(Fields::new()) })],
        )
        .unwrap();

        let (result, ledger) = run(&probes, &target(), 1, Duration::from_secs(1)).await.unwrap();

        assert!(result.is_empty());
        assert!(matches!(
            ledger.outcome("hollow"),
            Some(Outcome::Failure { kind: FailureKind::Empty, .. })
        ));
    }

    #[tokio::test]
    async fn test_contract_violations_are_rejected_before_dispatch() {
        let empty = ProbeSet::new(TargetKind::Username);
        let err = run(&empty, &target(), 4, Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, OsintError::Configuration(_)));

        let probes = ProbeSet::from_probes(TargetKind::Username, vec![failing("github")]).unwrap();

        let blank = Target::Username(String::new());
        assert!(run(&probes, &blank, 4, Duration::from_secs(1)).await.unwrap_err().is_fatal());

        let wrong_kind = Target::Email("a@example.com".into());
        assert!(run(&probes, &wrong_kind, 4, Duration::from_secs(1)).await.unwrap_err().is_fatal());

        assert!(run(&probes, &target(), 0, Duration::from_secs(1)).await.unwrap_err().is_fatal());
        assert!(run(&probes, &target(), 1, Duration::ZERO).await.unwrap_err().is_fatal());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_dispatch_aborts_running_probes() {
        let finished = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&finished);

        let probes = ProbeSet::from_probes(
            TargetKind::Username,
            vec![probe_fn("lingering", move |_| {
                let counter = Arc::clone(&counter);
                async move {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, ProbeError>(single_field("lingering", true))
                }
            })],
        )
        .unwrap();

        let target = target();
        let dispatch = run(&probes, &target, 1, Duration::from_secs(60));
        assert!(tokio::time::timeout(Duration::from_secs(1), dispatch).await.is_err());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(finished.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_out_probe_is_cancelled() {
        let finished = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&finished);

        let probes = ProbeSet::from_probes(
            TargetKind::Username,
            vec![probe_fn("slow", move |_| {
                let counter = Arc::clone(&counter);
                async move {
                    tokio::time::sleep(Duration::from_secs(10)).await;
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, ProbeError>(single_field("slow", true))
                }
            })],
        )
        .unwrap();

        let (_, ledger) = run(&probes, &target(), 1, Duration::from_secs(1)).await.unwrap();
        assert!(ledger.outcome("slow").unwrap().is_timeout());

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(finished.load(Ordering::SeqCst), 0);
    }
}
