//! Core of terractl: domain types, ports and the lifecycle coordinator for a
//! supervised game server, its worlds, backups and logs.
//!
//! This crate contains no OS process or HTTP code. Adapters implement the
//! traits in [`ports`] and reach every operation through [`AppCore`].

#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod paths;
pub mod ports;
pub mod services;
pub mod settings;
pub mod utils;

// Re-export commonly used types for convenience
pub use domain::{
    BackupDetail, BackupEntry, BackupListing, BackupName, DiskUsage, FileInfo, LogFileEntry,
    LogKind, LogListing, LogSearchHit, LogSearchResult, LogWindow, ManagedProcessState,
    ProbeReport, ProgramStatus, SupervisorStatus, WorldDetail, WorldEntry, is_safe_filename,
    parse_supervisor_status, sanitize_name,
};
pub use paths::{Directories, ScriptPaths, ServerLayout, SupervisorTarget};
pub use ports::{
    ArchiveLister, CommandOutput, CommandRunner, CommandSpec, CoreError, DiskProbe,
    NoopArchiveLister, StateProbe,
};
pub use services::{
    AppCore, ArtifactInspector, ConfigService, CorePorts, HealthReport, LifecycleCoordinator,
    LogAccess, ServerStatus, StatusService, WorldCreateRequest,
};
pub use settings::{ServerSettings, SettingKey, SettingsStore, SettingsView};
pub use utils::{format_bytes, strip_ansi_codes};

// Only exercised by the property tests under tests/
#[cfg(test)]
use proptest as _;
