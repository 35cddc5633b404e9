// src/notify.rs
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::error::{OsintError, OsintResult};
use crate::utils::shell::execute_with_timeout;

const APP_NAME: &str = "probehound";

/// Post-run completion signal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
}

/// Delivers completion signals. Callers treat delivery as fire-and-forget.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &Notification) -> OsintResult<()>;
}

/// Records notifications in the log only
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: &Notification) -> OsintResult<()> {
        info!("{}: {}", notification.title, notification.message);
        Ok(())
    }
}

/// Desktop notifications through an external command such as `notify-send`
#[derive(Debug, Clone)]
pub struct CommandNotifier {
    program: String,
    timeout: Duration,
}

impl CommandNotifier {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl Notifier for CommandNotifier {
    async fn notify(&self, notification: &Notification) -> OsintResult<()> {
        let output = execute_with_timeout(
            &self.program,
            &["--app-name", APP_NAME, &notification.title, &notification.message],
            self.timeout,
        )
        .await?;

        if output.status.success() {
            info!("Notification sent");
            Ok(())
        } else {
            Err(OsintError::Notification(format!(
                "{} exited with {}",
                self.program, output.status
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification() -> Notification {
        Notification {
            title: "Trace complete".into(),
            message: "done".into(),
        }
    }

    #[tokio::test]
    async fn test_log_notifier_never_fails() {
        assert!(LogNotifier.notify(&notification()).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_command_reports_error() {
        let notifier = CommandNotifier::new("probehound-missing-notifier").with_timeout(Duration::from_secs(1));
        let err = notifier.notify(&notification()).await.unwrap_err();
        assert!(!err.is_fatal());
    }
}
