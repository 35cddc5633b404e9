// src/utils/shell.rs
use std::process::Output;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, trace, warn};

use crate::error::{OsintError, OsintResult};

/// Run a program with arguments, giving up after `timeout`.
///
/// The child is killed if the deadline passes.
pub async fn execute_with_timeout(program: &str, args: &[&str], timeout: Duration) -> OsintResult<Output> {
    debug!("Executing {} with timeout {:?}", program, timeout);

    let command_future = Command::new(program).args(args).kill_on_drop(true).output();

    match tokio::time::timeout(timeout, command_future).await {
        Ok(Ok(output)) => {
            if output.status.success() {
                trace!("Command succeeded: {}", program);
            } else {
                let stderr = String::from_utf8_lossy(&output.stderr);
                warn!("Command failed: {}\nStderr: {}", program, stderr);
            }
            Ok(output)
        }
        Ok(Err(e)) => Err(OsintError::Notification(format!("Failed to execute {}: {}", program, e))),
        Err(_) => {
            warn!("Command timed out after {:?}: {}", timeout, program);
            Err(OsintError::Notification(format!(
                "{} timed out after {:?}",
                program, timeout
            )))
        }
    }
}
