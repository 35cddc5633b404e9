// src/engine/outcome.rs
use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::probe::Fields;
use crate::error::ProbeError;

/// Classification of a probe failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Network,
    Status,
    Parse,
    Resolve,
    Io,
    NotFound,
    MissingCredential,
    Empty,
    Panicked,
    Aborted,
}

impl From<&ProbeError> for FailureKind {
    fn from(error: &ProbeError) -> Self {
        match error {
            ProbeError::Http(_) => FailureKind::Network,
            ProbeError::Status { .. } => FailureKind::Status,
            ProbeError::Parse(_) => FailureKind::Parse,
            ProbeError::Resolve(_) => FailureKind::Resolve,
            ProbeError::Io(_) => FailureKind::Io,
            ProbeError::NotFound(_) => FailureKind::NotFound,
            ProbeError::MissingCredential(_) => FailureKind::MissingCredential,
            ProbeError::Empty => FailureKind::Empty,
        }
    }
}

/// What happened to one probe during one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success(Fields),
    Failure { kind: FailureKind, message: String },
    Timeout,
}

impl Outcome {
    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Outcome::Failure {
            kind,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Outcome::Timeout)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Success(_) => "success",
            Outcome::Failure { .. } => "failure",
            Outcome::Timeout => "timeout",
        }
    }
}

impl From<ProbeError> for Outcome {
    fn from(error: ProbeError) -> Self {
        Outcome::failure(FailureKind::from(&error), error.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub outcome: Outcome,
    pub elapsed: Duration,
    /// Position in completion order, starting at 0
    pub sequence: usize,
}

/// Per-probe outcome record for one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    entries: BTreeMap<String, LedgerEntry>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a probe outcome. Returns the completion sequence number.
    pub fn record(&mut self, probe: impl Into<String>, outcome: Outcome, elapsed: Duration) -> usize {
        let sequence = self.entries.len();
        self.entries.insert(
            probe.into(),
            LedgerEntry {
                outcome,
                elapsed,
                sequence,
            },
        );
        sequence
    }

    pub fn get(&self, probe: &str) -> Option<&LedgerEntry> {
        self.entries.get(probe)
    }

    pub fn outcome(&self, probe: &str) -> Option<&Outcome> {
        self.entries.get(probe).map(|e| &e.outcome)
    }

    pub fn contains(&self, probe: &str) -> bool {
        self.entries.contains_key(probe)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.count(Outcome::is_success)
    }

    pub fn timed_out(&self) -> usize {
        self.count(Outcome::is_timeout)
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failure { .. }))
    }

    fn count(&self, predicate: impl Fn(&Outcome) -> bool) -> usize {
        self.entries.values().filter(|e| predicate(&e.outcome)).count()
    }

    /// Entries sorted by probe name
    pub fn iter(&self) -> impl Iterator<Item = (&str, &LedgerEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Entries in the order the probes reported
    pub fn in_completion_order(&self) -> Vec<(&str, &LedgerEntry)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by_key(|(_, entry)| entry.sequence);
        entries
    }
}

/// Merged payloads of every successful probe in a run.
///
/// Merging is last-writer-wins per field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunResult {
    fields: Fields,
}

impl RunResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a payload, overwriting any field already present
    pub fn merge(&mut self, payload: &Fields) {
        for (key, value) in payload {
            if let Some(previous) = self.fields.insert(key.clone(), value.clone()) {
                if previous != *value {
                    debug!("Field {} overwritten by a later probe", key);
                }
            }
        }
    }

    /// Left-fold a sequence of payloads
    pub fn fold<'a, I>(payloads: I) -> Self
    where
        I: IntoIterator<Item = &'a Fields>,
    {
        payloads.into_iter().fold(Self::new(), |mut acc, payload| {
            acc.merge(payload);
            acc
        })
    }

    /// Rebuild the merge from a ledger, replaying successes in completion order
    pub fn replay(ledger: &Ledger) -> Self {
        Self::fold(
            ledger
                .in_completion_order()
                .into_iter()
                .filter_map(|(_, entry)| match &entry.outcome {
                    Outcome::Success(fields) => Some(fields),
                    _ => None,
                }),
        )
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }
}

impl From<Fields> for RunResult {
    fn from(fields: Fields) -> Self {
        Self { fields }
    }
}
