//! Backup archive inspection port.

use std::path::Path;

/// Lists the entries stored in a backup archive.
pub trait ArchiveLister: Send + Sync {
    /// Entry paths in archive order. Errors carry a human-readable reason.
    fn list_entries(&self, archive: &Path) -> Result<Vec<String>, String>;
}

/// Lister for adapters that do not inspect archive contents.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopArchiveLister;

impl ArchiveLister for NoopArchiveLister {
    fn list_entries(&self, _archive: &Path) -> Result<Vec<String>, String> {
        Err("archive inspection not available".to_string())
    }
}
