//! State probe port.
//!
//! Answers "is the supervisor up, is the server alive, what does the
//! supervisor think of each program" from live sources on every call. Nothing
//! is cached: a stale answer would let a restore run against a live world.

use async_trait::async_trait;

use crate::domain::ProbeReport;

/// Read-only view of the managed process and its supervisor.
#[async_trait]
pub trait StateProbe: Send + Sync {
    /// Full report: daemon reachability, process liveness, program table.
    async fn probe(&self) -> ProbeReport;

    /// Process-table check for the managed server only.
    ///
    /// Cheaper than [`StateProbe::probe`]; used right before mutations.
    async fn is_process_alive(&self) -> bool;

    /// Whether any process whose command line contains `pattern` is running.
    async fn is_pattern_running(&self, pattern: &str) -> bool;
}
