//! Derived process state and supervisor status parsing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// State label the supervisor reports for a healthy program.
pub const RUNNING_LABEL: &str = "RUNNING";

/// Status of a single supervised program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramStatus {
    /// Raw state token, e.g. `RUNNING`, `STOPPED`, `FATAL`.
    pub state: String,
    /// `state == "RUNNING"`.
    pub running: bool,
    /// Remainder of the status line (pid, uptime, exit reason).
    pub details: String,
}

/// Program name → status, rebuilt from live supervisor output on every probe.
pub type SupervisorStatus = BTreeMap<String, ProgramStatus>;

/// Parse `supervisorctl status` output.
///
/// Each line tokenizes into `<name> <STATE> <detail...>`; lines with fewer
/// than two tokens are noise and skipped.
pub fn parse_supervisor_status(output: &str) -> SupervisorStatus {
    let mut programs = SupervisorStatus::new();
    for line in output.lines() {
        let mut parts = line.split_whitespace();
        let (Some(name), Some(state)) = (parts.next(), parts.next()) else {
            continue;
        };
        let details = parts.collect::<Vec<_>>().join(" ");
        programs.insert(
            name.to_string(),
            ProgramStatus {
                state: state.to_string(),
                running: state == RUNNING_LABEL,
                details,
            },
        );
    }
    programs
}

/// Snapshot returned by the state probe.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProbeReport {
    /// Supervisor control socket exists and accepts connections.
    pub daemon_up: bool,
    /// A process matching the managed server pattern is in the process table.
    pub process_alive: bool,
    /// Per-program supervisor status (empty when the daemon is down).
    pub programs: SupervisorStatus,
}

impl ProbeReport {
    /// Derive the managed process state for `program`.
    pub fn state_of(&self, program: &str) -> ManagedProcessState {
        let label = self.programs.get(program).map(|p| p.state.as_str());
        ManagedProcessState::derive(self.process_alive, label)
    }
}

/// Lifecycle state of the managed server. Never stored; always derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManagedProcessState {
    Unknown,
    Stopped,
    Starting,
    Running,
    Stopping,
}

impl ManagedProcessState {
    /// Combine process-table liveness with the supervisor's label.
    ///
    /// The process table wins on liveness; the supervisor label only refines
    /// transitional states.
    pub fn derive(alive: bool, supervisor_label: Option<&str>) -> Self {
        match (alive, supervisor_label) {
            (true, Some("STOPPING")) => Self::Stopping,
            (true, Some("STARTING")) => Self::Starting,
            (true, _) => Self::Running,
            (false, Some("STARTING" | "BACKOFF")) => Self::Starting,
            (false, Some("STOPPING")) => Self::Stopping,
            (false, Some("UNKNOWN")) => Self::Unknown,
            (false, _) => Self::Stopped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_status_lines_and_skips_noise() {
        let output = "terraria                         RUNNING   pid 1234, uptime 0:30:00\n\
                      \n\
                      backup-scheduler                 STOPPED   Not started\n\
                      garbage\n";
        let programs = parse_supervisor_status(output);
        assert_eq!(programs.len(), 2);

        let terraria = &programs["terraria"];
        assert!(terraria.running);
        assert_eq!(terraria.details, "pid 1234, uptime 0:30:00");

        let scheduler = &programs["backup-scheduler"];
        assert!(!scheduler.running);
        assert_eq!(scheduler.state, "STOPPED");
    }

    #[test]
    fn status_line_without_detail() {
        let programs = parse_supervisor_status("terraria STOPPED");
        assert_eq!(programs["terraria"].details, "");
    }

    #[test]
    fn derive_state_from_liveness_and_label() {
        assert_eq!(
            ManagedProcessState::derive(true, Some("RUNNING")),
            ManagedProcessState::Running
        );
        assert_eq!(
            ManagedProcessState::derive(true, None),
            ManagedProcessState::Running
        );
        assert_eq!(
            ManagedProcessState::derive(true, Some("STOPPING")),
            ManagedProcessState::Stopping
        );
        assert_eq!(
            ManagedProcessState::derive(false, Some("RUNNING")),
            ManagedProcessState::Stopped
        );
        assert_eq!(
            ManagedProcessState::derive(false, Some("BACKOFF")),
            ManagedProcessState::Starting
        );
        assert_eq!(
            ManagedProcessState::derive(false, Some("UNKNOWN")),
            ManagedProcessState::Unknown
        );
        assert_eq!(
            ManagedProcessState::derive(false, None),
            ManagedProcessState::Stopped
        );
    }
}
