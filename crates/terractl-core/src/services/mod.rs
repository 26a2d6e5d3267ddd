//! Core services.
//!
//! Services depend only on ports and domain types. Adapters reach them
//! through [`AppCore`].

mod app_core;
mod config;
mod coordinator;
mod inspector;
mod logs;
mod status;

pub use app_core::{AppCore, CorePorts};
pub use config::ConfigService;
pub use coordinator::{
    BACKUP_TIMEOUT, BackupCreated, CommandReport, LifecycleCoordinator, ProcessAction,
    WORLD_CREATE_TIMEOUT, WorldCopied, WorldCreateRequest, WorldCreated, WorldDeleted,
};
pub use inspector::{ArtifactInspector, OTHER_LOG_TYPE};
pub use logs::{
    DEFAULT_SEARCH_LIMIT, DEFAULT_WINDOW, LogAccess, LogCleared, MAX_SEARCH_LIMIT, MAX_WINDOW,
};
pub use status::{
    CheckStatus, DiskReport, DiskSection, HealthCheck, HealthChecks, HealthReport, QuickStatus,
    ServerStatus, StatusService,
};

use crate::domain::sanitize_name;
use crate::ports::CoreError;

/// Sanitize a caller-supplied world name, rejecting names that sanitize to
/// nothing.
pub(crate) fn require_world_name(raw: &str) -> Result<String, CoreError> {
    let name = sanitize_name(raw);
    if name.is_empty() {
        return Err(CoreError::Validation(
            "World name must contain at least one alphanumeric character".to_string(),
        ));
    }
    Ok(name)
}
