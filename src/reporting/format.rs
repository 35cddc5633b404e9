use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Local};

use crate::engine::RunResult;
use crate::error::OsintResult;
use crate::target::TargetKind;

/// Persists a merged run result to a durable artifact
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Write the result into `dir`, creating the directory if needed.
    ///
    /// An empty result is not written and yields `Ok(None)`.
    async fn persist(&self, result: &RunResult, kind: TargetKind, dir: &Path) -> OsintResult<Option<PathBuf>>;
}

/// Extension of every persisted artifact
pub const ARTIFACT_EXTENSION: &str = "json";

/// Artifact filename for a run: kind prefix, local timestamp, sequence token.
pub fn artifact_file_name(kind: TargetKind, at: DateTime<Local>, sequence: u64) -> String {
    format!(
        "{}_{}_{}.{}",
        kind.artifact_prefix(),
        at.format("%Y%m%d_%H%M%S%3f"),
        sequence,
        ARTIFACT_EXTENSION
    )
}
