//! Domain types for worlds, backups, logs and the managed process.

pub mod artifacts;
pub mod logs;
pub mod names;
pub mod process_state;

pub use artifacts::{
    BackupDetail, BackupEntry, BackupListing, DiskUsage, FileInfo, LogFileEntry, LogListing,
    LogSearchHit, LogSearchResult, LogWindow, WorldDetail, WorldEntry,
};
pub use logs::{LogKind, UnknownLogKind};
pub use names::{BackupName, is_safe_filename, sanitize_name};
pub use process_state::{
    ManagedProcessState, ProbeReport, ProgramStatus, RUNNING_LABEL, SupervisorStatus,
    parse_supervisor_status,
};
