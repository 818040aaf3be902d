//! Process manager reload hook.

use std::process::Command;

use tracing::{debug, info, warn};

use crate::domain::ports::NotificationPort;
use crate::infrastructure::config::NotificationsConfig;

/// Runs a shell command (e.g. `pm2 reload 0`) after files change on disk.
///
/// The command line is split on whitespace; no shell is involved.
#[derive(Debug, Clone)]
pub struct ProcessReloadNotifier {
    command: String,
}

impl ProcessReloadNotifier {
    /// Creates a notifier running `command`.
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// Builds a notifier when a non-empty reload command is configured.
    #[must_use]
    pub fn from_config(config: &NotificationsConfig) -> Option<Self> {
        config
            .reload_command
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(Self::new)
    }

    /// Returns the configured command line.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }
}

/// Runs `command` to completion, returning whether it succeeded.
fn run_reload_command(command: &str, subject: &str) -> bool {
    let mut parts = command.split_whitespace();
    let Some(program) = parts.next() else {
        return false;
    };

    match Command::new(program).args(parts).output() {
        Ok(output) if output.status.success() => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if !stderr.trim().is_empty() {
                warn!(command, subject, stderr = %stderr.trim(), "Reload command wrote to stderr");
            }
            info!(
                command,
                subject,
                stdout = %String::from_utf8_lossy(&output.stdout).trim(),
                "Reload command finished"
            );
            true
        }
        Ok(output) => {
            warn!(
                command,
                subject,
                status = %output.status,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "Reload command failed"
            );
            false
        }
        Err(e) => {
            warn!(command, subject, error = %e, "Failed to run reload command");
            false
        }
    }
}

impl NotificationPort for ProcessReloadNotifier {
    fn notify(&self, subject: &str) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(subject, "No runtime available, skipping reload command");
            return;
        };

        debug!(command = %self.command, subject, "Scheduling reload command");
        let command = self.command.clone();
        let subject = subject.to_string();

        handle.spawn_blocking(move || {
            run_reload_command(&command, &subject);
        });
    }
}
