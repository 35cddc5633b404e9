// src/engine/probe.rs
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::{OsintError, OsintResult, ProbeResult};
use crate::target::{Target, TargetKind};

/// Field-name to value mapping produced by a successful probe.
pub type Fields = serde_json::Map<String, Value>;

/// Build a payload holding a single field.
pub fn single_field(key: impl Into<String>, value: impl Into<Value>) -> Fields {
    let mut fields = Fields::new();
    fields.insert(key.into(), value.into());
    fields
}

/// One independent check against an external source.
///
/// Implementations must not mutate shared state. Any error they return is
/// recorded as a failure for this probe only and never reaches the caller of
/// the dispatcher.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Unique name of the probe within its set
    fn name(&self) -> &str;

    /// Short human-readable description
    fn description(&self) -> &str {
        ""
    }

    /// Run the check and return a non-empty payload
    async fn run(&self, target: &Target) -> ProbeResult<Fields>;
}

/// Probe backed by a plain async function.
pub struct FnProbe<F> {
    name: String,
    description: String,
    func: F,
}

impl<F, Fut> FnProbe<F>
where
    F: Fn(Target) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ProbeResult<Fields>> + Send + 'static,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            func,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

#[async_trait]
impl<F, Fut> Probe for FnProbe<F>
where
    F: Fn(Target) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ProbeResult<Fields>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn run(&self, target: &Target) -> ProbeResult<Fields> {
        (self.func)(target.clone()).await
    }
}

/// Wrap an async function as a shareable probe.
pub fn probe_fn<F, Fut>(name: impl Into<String>, func: F) -> Arc<dyn Probe>
where
    F: Fn(Target) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ProbeResult<Fields>> + Send + 'static,
{
    Arc::new(FnProbe::new(name, func))
}

/// The fixed collection of probes for one target kind.
///
/// Probe names are unique within a set.
#[derive(Clone)]
pub struct ProbeSet {
    kind: TargetKind,
    probes: Vec<Arc<dyn Probe>>,
}

impl ProbeSet {
    pub fn new(kind: TargetKind) -> Self {
        Self {
            kind,
            probes: Vec::new(),
        }
    }

    /// Build a set from an iterator of probes, rejecting duplicate names
    pub fn from_probes<I>(kind: TargetKind, probes: I) -> OsintResult<Self>
    where
        I: IntoIterator<Item = Arc<dyn Probe>>,
    {
        let mut set = Self::new(kind);
        for probe in probes {
            set.register(probe)?;
        }
        Ok(set)
    }

    /// Add a probe to the set
    pub fn register(&mut self, probe: Arc<dyn Probe>) -> OsintResult<()> {
        if self.contains(probe.name()) {
            return Err(OsintError::Configuration(format!(
                "Duplicate probe name in {} probe set: {}",
                self.kind,
                probe.name()
            )));
        }

        debug!("Registering {} probe: {}", self.kind, probe.name());
        self.probes.push(probe);
        Ok(())
    }

    /// Chaining form of [`ProbeSet::register`]
    pub fn with(mut self, probe: Arc<dyn Probe>) -> OsintResult<Self> {
        self.register(probe)?;
        Ok(self)
    }

    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.probes.iter().any(|p| p.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.probes.iter().map(|p| p.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Probe>> {
        self.probes.iter()
    }
}

impl std::fmt::Debug for ProbeSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbeSet")
            .field("kind", &self.kind)
            .field("probes", &self.names())
            .finish()
    }
}
