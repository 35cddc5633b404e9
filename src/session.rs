// src/session.rs
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::engine::{DispatchSettings, Dispatcher, Ledger, ProbeSet, RunResult};
use crate::error::OsintResult;
use crate::notify::{LogNotifier, Notification, Notifier};
use crate::reporting::{JsonSink, ResultSink};
use crate::target::{FormatValidator, Target, TargetKind, Validator};

/// Everything a finished session knows about its run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub kind: TargetKind,
    /// `None` when the target was rejected and nothing was dispatched
    pub target: Option<Target>,
    pub result: RunResult,
    pub ledger: Ledger,
    pub artifact: Option<PathBuf>,
    pub persistence_error: Option<String>,
}

impl RunReport {
    fn skipped(kind: TargetKind) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            kind,
            target: None,
            result: RunResult::new(),
            ledger: Ledger::new(),
            artifact: None,
            persistence_error: None,
        }
    }

    pub fn dispatched(&self) -> bool {
        self.target.is_some()
    }

    pub fn notification(&self) -> Notification {
        let title = match self.kind {
            TargetKind::Email => "Email run complete",
            TargetKind::Ip => "Trace run complete",
            TargetKind::Username => "Username run complete",
        };

        let message = match &self.target {
            Some(target) => format!(
                "{}: {} of {} probes succeeded",
                target.value(),
                self.ledger.succeeded(),
                self.ledger.len()
            ),
            None => "No valid target, nothing was run".to_string(),
        };

        Notification {
            title: title.to_string(),
            message,
        }
    }
}

/// Fluent run orchestration: target, output, execute, notify.
///
/// ```no_run
/// # async fn demo(probes: probehound::engine::ProbeSet) -> probehound::error::OsintResult<()> {
/// use std::time::Duration;
/// use probehound::engine::DispatchSettings;
/// use probehound::session::Session;
///
/// let session = Session::new(probes, DispatchSettings::new(5, Duration::from_secs(15)))
///     .target("8.8.8.8")
///     .output("./results")
///     .execute()
///     .await?
///     .notify();
/// let report = session.finish().await;
/// # Ok(())
/// # }
/// ```
pub struct Session {
    probes: Arc<ProbeSet>,
    settings: DispatchSettings,
    validator: Arc<dyn Validator>,
    sink: Arc<dyn ResultSink>,
    notifier: Arc<dyn Notifier>,
    default_output: PathBuf,
    target: Option<Target>,
    output: Option<PathBuf>,
    report: Option<RunReport>,
    pending_notification: Option<JoinHandle<()>>,
}

impl Session {
    pub fn new(probes: impl Into<Arc<ProbeSet>>, settings: DispatchSettings) -> Self {
        let probes = probes.into();
        let default_output = PathBuf::from(probes.kind().default_output_dir());

        Self {
            probes,
            settings,
            validator: Arc::new(FormatValidator),
            sink: Arc::new(JsonSink::new()),
            notifier: Arc::new(LogNotifier),
            default_output,
            target: None,
            output: None,
            report: None,
            pending_notification: None,
        }
    }

    pub fn with_validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn ResultSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Folder used when [`Session::output`] is never called
    pub fn with_default_output(mut self, dir: impl Into<PathBuf>) -> Self {
        self.default_output = dir.into();
        self
    }

    pub fn kind(&self) -> TargetKind {
        self.probes.kind()
    }

    /// Set the target. A value the validator rejects is logged and leaves the
    /// session without a target, so `execute` will not dispatch anything.
    pub fn target(mut self, raw: &str) -> Self {
        let kind = self.kind();

        let accepted = if self.validator.is_valid(kind, raw) {
            Target::from_validated(kind, raw)
        } else {
            None
        };

        match accepted {
            Some(target) => {
                info!("Target {} set: {}", kind, target.value());
                self.target = Some(target);
            }
            None => {
                error!("Invalid {} target: {}", kind, raw);
                self.target = None;
            }
        }
        self
    }

    /// Set the output folder, creating it right away
    pub fn output(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        match std::fs::create_dir_all(&dir) {
            Ok(()) => {
                info!("Output folder set: {}", dir.display());
                self.output = Some(dir);
            }
            Err(e) => {
                error!("Failed to create output folder {}: {}", dir.display(), e);
            }
        }
        self
    }

    /// Dispatch every probe, then persist the merged result.
    ///
    /// A rejected or missing target produces an empty report without
    /// dispatching. Persistence failures are kept in the report; only
    /// configuration errors are returned.
    pub async fn execute(mut self) -> OsintResult<Self> {
        let kind = self.kind();

        let Some(target) = self.target.clone() else {
            warn!("No valid {} target specified; nothing to run", kind);
            self.report = Some(RunReport::skipped(kind));
            return Ok(self);
        };

        let output = match self.output.clone() {
            Some(dir) => dir,
            None => {
                let dir = self.default_output.clone();
                if let Err(e) = tokio::fs::create_dir_all(&dir).await {
                    error!("Failed to create output folder {}: {}", dir.display(), e);
                }
                dir
            }
        };

        let run_id = Uuid::new_v4();
        info!("Starting {} run {} on {}", kind, run_id, target.value());

        let (result, ledger) = Dispatcher::new(self.settings).run(&self.probes, &target).await?;

        let (artifact, persistence_error) = persist(self.sink.as_ref(), &result, kind, &output).await;

        info!(
            "{} run {} completed with {} fields from {} probes",
            kind,
            run_id,
            result.len(),
            ledger.succeeded()
        );

        self.report = Some(RunReport {
            run_id,
            kind,
            target: Some(target),
            result,
            ledger,
            artifact,
            persistence_error,
        });

        Ok(self)
    }

    /// Send the completion notification in the background. Delivery
    /// failures are logged and never affect the report.
    pub fn notify(mut self) -> Self {
        let Some(report) = &self.report else {
            warn!("notify called before execute; nothing to report");
            return self;
        };

        let notification = report.notification();
        let notifier = Arc::clone(&self.notifier);

        self.pending_notification = Some(tokio::spawn(async move {
            if let Err(e) = notifier.notify(&notification).await {
                warn!("Notification failed: {}", e);
            }
        }));

        self
    }

    pub fn report(&self) -> Option<&RunReport> {
        self.report.as_ref()
    }

    /// Wait for any pending notification, then hand back the report
    pub async fn finish(mut self) -> Option<RunReport> {
        if let Some(handle) = self.pending_notification.take() {
            if let Err(e) = handle.await {
                warn!("Notification task ended abnormally: {}", e);
            }
        }
        self.report
    }
}

async fn persist(
    sink: &dyn ResultSink,
    result: &RunResult,
    kind: TargetKind,
    dir: &Path,
) -> (Option<PathBuf>, Option<String>) {
    match sink.persist(result, kind, dir).await {
        Ok(artifact) => (artifact, None),
        Err(e) => {
            error!("Failed to save results: {}", e);
            (None, Some(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use serde_json::json;

    use crate::engine::{probe_fn, single_field};
    use crate::error::ProbeError;
    use crate::target::MockValidator;

    fn probes() -> ProbeSet {
        ProbeSet::from_probes(
            TargetKind::Ip,
            vec![probe_fn("geolocation", |target: Target| async move {
                Ok::<_, ProbeError>(single_field("geolocation", json!({ "ip": target.value() })))
            })],
        )
        .unwrap()
    }

    fn settings() -> DispatchSettings {
        DispatchSettings::new(2, Duration::from_secs(1))
    }

    #[tokio::test]
    async fn test_rejected_target_skips_dispatch() {
        let mut validator = MockValidator::new();
        validator
            .expect_is_valid()
            .withf(|kind, raw| *kind == TargetKind::Ip && raw == "10.0.0.1")
            .times(1)
            .return_const(false);

        let dir = tempfile::tempdir().unwrap();
        let session = Session::new(probes(), settings())
            .with_validator(Arc::new(validator))
            .target("10.0.0.1")
            .output(dir.path())
            .execute()
            .await
            .unwrap();

        let report = session.report().unwrap();
        assert!(!report.dispatched());
        assert!(report.result.is_empty());
        assert!(report.ledger.is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_execute_persists_to_output() {
        let dir = tempfile::tempdir().unwrap();
        let report = Session::new(probes(), settings())
            .target("192.0.2.7")
            .output(dir.path().join("trace"))
            .execute()
            .await
            .unwrap()
            .finish()
            .await
            .unwrap();

        assert_eq!(report.result.get("geolocation"), Some(&json!({ "ip": "192.0.2.7" })));
        let artifact = report.artifact.expect("artifact written");
        assert!(artifact.starts_with(dir.path().join("trace")));
        assert!(report.persistence_error.is_none());
    }

    #[tokio::test]
    async fn test_default_output_is_used_when_unset() {
        let dir = tempfile::tempdir().unwrap();
        let fallback = dir.path().join("trace_results");

        let report = Session::new(probes(), settings())
            .with_default_output(&fallback)
            .target("192.0.2.8")
            .execute()
            .await
            .unwrap()
            .finish()
            .await
            .unwrap();

        assert!(fallback.is_dir());
        assert!(report.artifact.unwrap().starts_with(&fallback));
    }

    #[test]
    fn test_notification_text() {
        let mut report = RunReport::skipped(TargetKind::Email);
        assert_eq!(report.notification().message, "No valid target, nothing was run");

        report.target = Some(Target::Email("a@b.io".into()));
        report.ledger.record("breaches", crate::engine::Outcome::Timeout, Duration::ZERO);
        let notification = report.notification();
        assert_eq!(notification.title, "Email run complete");
        assert_eq!(notification.message, "a@b.io: 0 of 1 probes succeeded");
    }
}
