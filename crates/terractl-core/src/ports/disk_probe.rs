//! Disk capacity port.

use std::path::Path;

use crate::domain::DiskUsage;

/// Reports capacity of the filesystem holding a directory.
pub trait DiskProbe: Send + Sync {
    /// Returns a human-readable reason on failure (missing path, unsupported platform).
    fn usage(&self, path: &Path) -> Result<DiskUsage, String>;
}
