use std::path::PathBuf;
use thiserror::Error;

use crate::target::TargetKind;

/// Errors surfaced to callers of the library.
///
/// Probe-level failures never appear here: they are absorbed by the
/// dispatcher and recorded in the run ledger instead.
#[derive(Error, Debug)]
pub enum OsintError {
    #[error("Invalid {kind} target: {value:?}")]
    Validation {
        kind: TargetKind,
        value: String,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Persistence error: {path:?} - {message}")]
    Persistence {
        path: PathBuf,
        message: String,
    },

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Network error: {0}")]
    Network(String),
}

impl OsintError {
    /// Whether this error must abort a run outright.
    pub fn is_fatal(&self) -> bool {
        matches!(self, OsintError::Configuration(_))
    }
}

impl From<serde_json::Error> for OsintError {
    fn from(error: serde_json::Error) -> Self {
        OsintError::Serialization(error.to_string())
    }
}

pub type OsintResult<T> = std::result::Result<T, OsintError>;

/// Failure raised inside a single probe.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    Status {
        status: u16,
        url: String,
    },

    #[error("failed to parse response: {0}")]
    Parse(String),

    #[error("DNS resolution failed: {0}")]
    Resolve(#[from] hickory_resolver::error::ResolveError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("missing credential: {0}")]
    MissingCredential(String),

    #[error("probe returned no fields")]
    Empty,
}

impl From<serde_json::Error> for ProbeError {
    fn from(error: serde_json::Error) -> Self {
        ProbeError::Parse(error.to_string())
    }
}

pub type ProbeResult<T> = std::result::Result<T, ProbeError>;
