//! Filesystem capacity via `statvfs`.

use std::path::Path;

use terractl_core::domain::DiskUsage;
use terractl_core::ports::DiskProbe;

#[derive(Debug, Clone, Copy, Default)]
pub struct StatvfsDiskProbe;

impl DiskProbe for StatvfsDiskProbe {
    #[cfg(unix)]
    fn usage(&self, path: &Path) -> Result<DiskUsage, String> {
        let stat = nix::sys::statvfs::statvfs(path).map_err(|e| e.desc().to_string())?;
        let fragment = u64::from(stat.fragment_size());
        let total = u64::from(stat.blocks()).saturating_mul(fragment);
        let free = u64::from(stat.blocks_free()).saturating_mul(fragment);
        Ok(DiskUsage::from_totals(total, free))
    }

    #[cfg(not(unix))]
    fn usage(&self, path: &Path) -> Result<DiskUsage, String> {
        Err(format!(
            "disk usage is not supported on this platform ({})",
            path.display()
        ))
    }
}
