//! Status snapshots and health checks.

use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

use crate::domain::{DiskUsage, ManagedProcessState, ProgramStatus, RUNNING_LABEL, SupervisorStatus};
use crate::paths::{BACKUP_SCHEDULER_PATTERN, ServerLayout};
use crate::ports::{DiskProbe, StateProbe};
use crate::settings::SettingsStore;

const MIB: u64 = 1024 * 1024;
const DISK_OK_FREE: u64 = 500 * MIB;
const DISK_WARN_FREE: u64 = 100 * MIB;

/// Disk usage or the reason it could not be read.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DiskReport {
    Usage(DiskUsage),
    Error { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct DiskSection {
    pub worlds: DiskReport,
    pub backups: DiskReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerStatus {
    /// Process-table liveness.
    pub running: bool,
    /// Supervisor daemon reachable.
    pub supervisor: bool,
    pub state: ManagedProcessState,
    pub processes: SupervisorStatus,
    /// Supervisor entry for the server, or one synthesized from liveness.
    pub terraria: ProgramStatus,
    pub disk: DiskSection,
}

/// Minimal unauthenticated status.
#[derive(Debug, Clone, Serialize)]
pub struct QuickStatus {
    pub api: &'static str,
    pub supervisor: bool,
    pub terraria: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: CheckStatus,
    pub message: String,
}

impl HealthCheck {
    fn new(status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub supervisor: HealthCheck,
    pub terraria: HealthCheck,
    pub backup_scheduler: HealthCheck,
    pub disk: HealthCheck,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    /// False when any check is an error; warnings do not count.
    pub healthy: bool,
    pub checks: HealthChecks,
}

pub struct StatusService {
    layout: Arc<ServerLayout>,
    probe: Arc<dyn StateProbe>,
    disk: Arc<dyn DiskProbe>,
    settings: Arc<SettingsStore>,
}

impl StatusService {
    pub fn new(
        layout: Arc<ServerLayout>,
        probe: Arc<dyn StateProbe>,
        disk: Arc<dyn DiskProbe>,
        settings: Arc<SettingsStore>,
    ) -> Self {
        Self {
            layout,
            probe,
            disk,
            settings,
        }
    }

    pub async fn status(&self) -> ServerStatus {
        let report = self.probe.probe().await;
        let program = &self.layout.supervisor.program;

        let terraria = report.programs.get(program).cloned().unwrap_or_else(|| {
            let label = if report.process_alive { RUNNING_LABEL } else { "STOPPED" };
            ProgramStatus {
                state: label.to_string(),
                running: report.process_alive,
                details: String::new(),
            }
        });

        ServerStatus {
            running: report.process_alive,
            supervisor: report.daemon_up,
            state: report.state_of(program),
            terraria,
            disk: DiskSection {
                worlds: self.disk_report(&self.layout.dirs.worlds),
                backups: self.disk_report(&self.layout.dirs.backups),
            },
            processes: report.programs,
        }
    }

    pub async fn quick(&self) -> QuickStatus {
        let report = self.probe.probe().await;
        QuickStatus {
            api: "running",
            supervisor: report.daemon_up,
            terraria: report.process_alive,
        }
    }

    pub async fn health(&self) -> HealthReport {
        let report = self.probe.probe().await;

        let supervisor = if report.daemon_up {
            HealthCheck::new(CheckStatus::Ok, "Running")
        } else {
            HealthCheck::new(CheckStatus::Error, "Not running")
        };

        let terraria = if report.process_alive {
            HealthCheck::new(CheckStatus::Ok, "Running")
        } else {
            HealthCheck::new(CheckStatus::Warning, "Not running")
        };

        let backup_scheduler = if self.probe.is_pattern_running(BACKUP_SCHEDULER_PATTERN).await {
            HealthCheck::new(CheckStatus::Ok, "Running")
        } else if self.settings.snapshot().backup_enabled {
            HealthCheck::new(CheckStatus::Warning, "Not running")
        } else {
            HealthCheck::new(CheckStatus::Ok, "Disabled")
        };

        let disk = match self.disk.usage(&self.layout.dirs.worlds) {
            Ok(usage) => disk_check(&usage),
            Err(reason) => HealthCheck::new(CheckStatus::Error, reason),
        };

        let checks = HealthChecks {
            supervisor,
            terraria,
            backup_scheduler,
            disk,
        };
        let healthy = [
            &checks.supervisor,
            &checks.terraria,
            &checks.backup_scheduler,
            &checks.disk,
        ]
        .iter()
        .all(|c| c.status != CheckStatus::Error);

        HealthReport { healthy, checks }
    }

    fn disk_report(&self, path: &Path) -> DiskReport {
        self.disk
            .usage(path)
            .map_or_else(|error| DiskReport::Error { error }, DiskReport::Usage)
    }
}

fn disk_check(usage: &DiskUsage) -> HealthCheck {
    if usage.free_bytes > DISK_OK_FREE {
        HealthCheck::new(CheckStatus::Ok, format!("{} free", usage.free_human))
    } else if usage.free_bytes > DISK_WARN_FREE {
        HealthCheck::new(CheckStatus::Warning, format!("{} free (low)", usage.free_human))
    } else {
        HealthCheck::new(
            CheckStatus::Error,
            format!("{} free (critical)", usage.free_human),
        )
    }
}
