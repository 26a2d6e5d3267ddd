//! Supervisor and process-table probe.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind};
use tracing::{debug, warn};

use terractl_core::domain::{ProbeReport, SupervisorStatus, parse_supervisor_status};
use terractl_core::paths::SupervisorTarget;
use terractl_core::ports::{CommandRunner, CommandSpec, StateProbe};

/// Reads live state from three sources on every call: the supervisor control
/// socket, `supervisorctl status`, and the OS process table.
pub struct SupervisorProbe {
    target: SupervisorTarget,
    runner: Arc<dyn CommandRunner>,
}

impl SupervisorProbe {
    pub fn new(target: SupervisorTarget, runner: Arc<dyn CommandRunner>) -> Self {
        Self { target, runner }
    }

    async fn daemon_up(&self) -> bool {
        socket_reachable(&self.target.socket).await
    }

    async fn supervisor_status(&self) -> SupervisorStatus {
        let spec = CommandSpec::new(&self.target.ctl).arg("status");
        let output = self.runner.run(spec).await;
        // `supervisorctl status` exits non-zero whenever any program is not
        // RUNNING, so the output is parsed regardless of the exit code.
        if !output.success && output.stdout.trim().is_empty() {
            debug!(error = %output.diagnostic(), "supervisorctl status returned nothing");
        }
        parse_supervisor_status(&output.stdout)
    }
}

#[async_trait]
impl StateProbe for SupervisorProbe {
    async fn probe(&self) -> ProbeReport {
        let daemon_up = self.daemon_up().await;
        let programs = if daemon_up {
            self.supervisor_status().await
        } else {
            SupervisorStatus::new()
        };
        ProbeReport {
            daemon_up,
            process_alive: self.is_process_alive().await,
            programs,
        }
    }

    async fn is_process_alive(&self) -> bool {
        self.is_pattern_running(&self.target.process_pattern).await
    }

    async fn is_pattern_running(&self, pattern: &str) -> bool {
        let pattern = pattern.to_string();
        match tokio::task::spawn_blocking(move || process_table_matches(&pattern)).await {
            Ok(found) => found,
            Err(e) => {
                warn!(error = %e, "Process table scan failed");
                false
            }
        }
    }
}

/// Whether any process other than this one has `pattern` in its name or
/// full command line.
pub fn process_table_matches(pattern: &str) -> bool {
    let mut system = System::new();
    system.refresh_processes_specifics(
        ProcessesToUpdate::All,
        true,
        ProcessRefreshKind::nothing().with_cmd(UpdateKind::OnlyIfNotSet),
    );
    let own_pid = sysinfo::get_current_pid().ok();

    system.processes().iter().any(|(pid, process)| {
        if Some(*pid) == own_pid {
            return false;
        }
        if process.name().to_string_lossy().contains(pattern) {
            return true;
        }
        let cmdline = process
            .cmd()
            .iter()
            .map(|arg| arg.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ");
        cmdline.contains(pattern)
    })
}

#[cfg(unix)]
async fn socket_reachable(path: &Path) -> bool {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return false;
    }
    match tokio::net::UnixStream::connect(path).await {
        Ok(_) => true,
        Err(e) => {
            debug!(socket = %path.display(), error = %e, "Supervisor socket refused connection");
            false
        }
    }
}

#[cfg(not(unix))]
async fn socket_reachable(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}
