use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Local;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::engine::RunResult;
use crate::error::{OsintError, OsintResult};
use crate::reporting::formats::{artifact_file_name, ResultSink};
use crate::target::TargetKind;

/// Process-wide token appended to artifact names
static NEXT_SEQUENCE: AtomicU64 = AtomicU64::new(0);

const MAX_NAME_ATTEMPTS: usize = 64;

/// JSON artifact writer
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSink;

impl JsonSink {
    /// Create a new JSON sink
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ResultSink for JsonSink {
    async fn persist(&self, result: &RunResult, kind: TargetKind, dir: &Path) -> OsintResult<Option<PathBuf>> {
        if result.is_empty() {
            warn!("No results to save for {} run", kind);
            return Ok(None);
        }

        tokio::fs::create_dir_all(dir).await.map_err(|e| OsintError::Persistence {
            path: dir.to_path_buf(),
            message: format!("Failed to create directory: {}", e),
        })?;

        let json = serde_json::to_string_pretty(result)?;

        for _ in 0..MAX_NAME_ATTEMPTS {
            let sequence = NEXT_SEQUENCE.fetch_add(1, Ordering::SeqCst);
            let path = dir.join(artifact_file_name(kind, Local::now(), sequence));

            // create_new keeps earlier artifacts from ever being overwritten
            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!("Artifact name already taken: {}", path.display());
                    continue;
                }
                Err(e) => {
                    return Err(OsintError::Persistence {
                        path,
                        message: format!("Failed to create file: {}", e),
                    })
                }
            };

            let written = async {
                file.write_all(json.as_bytes()).await?;
                file.flush().await
            }
            .await;

            if let Err(e) = written {
                drop(file);
                return Err(discard_partial(&path, e).await);
            }

            info!("Results saved to {}", path.display());
            return Ok(Some(path));
        }

        Err(OsintError::Persistence {
            path: dir.to_path_buf(),
            message: "Could not find a free artifact name".to_string(),
        })
    }
}

/// Remove an artifact whose write failed, so no truncated file is left behind
async fn discard_partial(path: &Path, cause: std::io::Error) -> OsintError {
    if let Err(e) = tokio::fs::remove_file(path).await {
        warn!("Failed to remove partial artifact {}: {}", path.display(), e);
    }

    OsintError::Persistence {
        path: path.to_path_buf(),
        message: format!("Failed to write file: {}", cause),
    }
}

/// Read a persisted artifact back into a run result
pub async fn load_artifact(path: &Path) -> OsintResult<RunResult> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| OsintError::Persistence {
        path: path.to_path_buf(),
        message: format!("Failed to read file: {}", e),
    })?;

    let result: RunResult = serde_json::from_str(&content)?;
    Ok(result)
}
