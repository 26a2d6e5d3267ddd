//! Read-only view of worlds, backups and log files on disk.
//!
//! The API is synchronous; async callers run it through `spawn_blocking`.

use chrono::{DateTime, Utc};
use std::cmp::Reverse;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::debug;

use crate::domain::{
    BackupDetail, BackupEntry, BackupListing, BackupName, FileInfo, LogFileEntry, LogKind,
    LogListing, WorldDetail, WorldEntry, is_safe_filename,
};
use crate::paths::{Directories, WORLD_EXTENSION};
use crate::ports::{ArchiveLister, CoreError};
use crate::utils::format_bytes;

use super::require_world_name;

/// Type label for files in the log directory outside the fixed set.
pub const OTHER_LOG_TYPE: &str = "other";

/// Stats and lists artifacts. Stateless; every call reads the filesystem.
pub struct ArtifactInspector {
    dirs: Arc<Directories>,
    archives: Arc<dyn ArchiveLister>,
}

impl ArtifactInspector {
    pub fn new(dirs: Arc<Directories>, archives: Arc<dyn ArchiveLister>) -> Self {
        Self { dirs, archives }
    }

    pub fn directories(&self) -> &Directories {
        &self.dirs
    }

    /// Metadata for a regular file, `None` if it is missing or not a file.
    pub fn stat(&self, path: &Path) -> Option<FileInfo> {
        stat_file(path)
    }

    /// Every `*.wld` in the world directory, sorted by name ignoring case.
    pub fn list_worlds(&self) -> Vec<WorldEntry> {
        let suffix = format!(".{WORLD_EXTENSION}");
        let mut worlds: Vec<WorldEntry> = read_dir_names(&self.dirs.worlds)
            .into_iter()
            .filter_map(|filename| {
                let name = filename.strip_suffix(&suffix)?.to_string();
                if name.is_empty() {
                    return None;
                }
                let info = stat_file(&self.dirs.worlds.join(&filename))?;
                Some(WorldEntry {
                    has_backup: self.dirs.world_backup_file(&name).is_file(),
                    name,
                    filename,
                    size_bytes: info.size_bytes,
                    size: info.size_human,
                    modified: info.modified,
                })
            })
            .collect();

        worlds.sort_by_cached_key(|w| w.name.to_lowercase());
        worlds
    }

    /// Detail view of one world including its `.bak` companion.
    pub fn get_world(&self, raw_name: &str) -> Result<WorldDetail, CoreError> {
        let name = require_world_name(raw_name)?;
        let path = self.dirs.world_file(&name);
        let info = stat_file(&path)
            .ok_or_else(|| CoreError::NotFound(format!("World '{name}' does not exist")))?;
        let companion = stat_file(&self.dirs.world_backup_file(&name));

        Ok(WorldDetail {
            filename: info.name,
            path,
            size_bytes: info.size_bytes,
            size: info.size_human,
            modified: info.modified,
            created: info.created,
            has_backup: companion.is_some(),
            backup_size: companion.as_ref().map(|c| c.size_human.clone()),
            backup_modified: companion.map(|c| c.modified),
            name,
        })
    }

    /// Managed backups, newest first.
    ///
    /// `count` and the size totals cover every backup matching `world`; only
    /// the returned list is cut to `limit`.
    pub fn list_backups(
        &self,
        world: Option<&str>,
        limit: Option<usize>,
        retention: u32,
    ) -> BackupListing {
        let mut backups = self.managed_backups();
        if let Some(world) = world.filter(|w| !w.is_empty()) {
            backups.retain(|b| b.world_name == world);
        }

        let total_size_bytes = backups.iter().map(|b| b.size_bytes).sum();
        if let Some(limit) = limit.filter(|l| *l > 0) {
            backups.truncate(limit);
        }

        BackupListing {
            count: backups.len(),
            backups,
            total_size_bytes,
            total_size: format_bytes(total_size_bytes),
            retention,
        }
    }

    /// Every file in the backup directory matching the managed naming
    /// pattern, newest first (filename descending on equal timestamps).
    pub fn managed_backups(&self) -> Vec<BackupEntry> {
        let mut backups: Vec<BackupEntry> = read_dir_names(&self.dirs.backups)
            .into_iter()
            .filter_map(|filename| {
                let parsed = BackupName::parse(&filename)?;
                let info = stat_file(&self.dirs.backup_file(&filename))?;
                Some(BackupEntry {
                    filename,
                    world_name: parsed.world,
                    date: parsed.date,
                    time: parsed.time,
                    size_bytes: info.size_bytes,
                    size: info.size_human,
                    created: info.modified,
                })
            })
            .collect();

        backups.sort_by(|a, b| {
            b.created
                .cmp(&a.created)
                .then_with(|| b.filename.cmp(&a.filename))
        });
        backups
    }

    /// Detail view of one backup archive.
    ///
    /// Archives outside the managed pattern are still readable here and
    /// report `unknown` as their world. A failure to list the archive omits
    /// `contents` rather than failing the call.
    pub fn get_backup(&self, filename: &str) -> Result<BackupDetail, CoreError> {
        let path = self.checked_backup_path(filename)?;
        let info = stat_file(&path)
            .ok_or_else(|| CoreError::NotFound(format!("Backup '{filename}' does not exist")))?;

        let contents = match self.archives.list_entries(&path) {
            Ok(entries) => Some(entries),
            Err(reason) => {
                debug!(filename = %filename, %reason, "Could not list backup contents");
                None
            }
        };

        Ok(BackupDetail {
            filename: filename.to_string(),
            world_name: BackupName::parse(filename).map_or_else(|| "unknown".to_string(), |b| b.world),
            path,
            size_bytes: info.size_bytes,
            size: info.size_human,
            created: info.modified,
            contents,
        })
    }

    /// Reject path-unsafe names, then join onto the backup directory.
    pub fn checked_backup_path(&self, filename: &str) -> Result<std::path::PathBuf, CoreError> {
        if !is_safe_filename(filename) {
            return Err(CoreError::Validation("Invalid backup filename".to_string()));
        }
        Ok(self.dirs.backup_file(filename))
    }

    /// Every regular file in the log directory, newest first.
    pub fn list_logs(&self) -> LogListing {
        let mut logs: Vec<LogFileEntry> = read_dir_names(&self.dirs.logs)
            .into_iter()
            .filter_map(|name| {
                let info = stat_file(&self.dirs.logs.join(&name))?;
                let log_type = LogKind::from_filename(&name)
                    .map_or(OTHER_LOG_TYPE, LogKind::as_str)
                    .to_string();
                Some(LogFileEntry {
                    name,
                    log_type,
                    size_bytes: info.size_bytes,
                    size: info.size_human,
                    modified: info.modified,
                })
            })
            .collect();

        logs.sort_by_key(|l| Reverse(l.modified));
        LogListing {
            count: logs.len(),
            logs,
            path: self.dirs.logs.clone(),
        }
    }
}

pub(crate) fn stat_file(path: &Path) -> Option<FileInfo> {
    let meta = fs::metadata(path).ok()?;
    if !meta.is_file() {
        return None;
    }
    let modified = to_utc(meta.modified());
    let created = meta.created().map_or(modified, DateTime::<Utc>::from);

    Some(FileInfo {
        path: path.to_path_buf(),
        name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        size_bytes: meta.len(),
        size_human: format_bytes(meta.len()),
        modified,
        created,
    })
}

fn to_utc(time: io::Result<SystemTime>) -> DateTime<Utc> {
    time.map_or(DateTime::<Utc>::UNIX_EPOCH, DateTime::<Utc>::from)
}

/// UTF-8 entry names of a directory; a missing or unreadable directory is empty.
fn read_dir_names(dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    entries
        .filter_map(Result::ok)
        .filter_map(|e| e.file_name().into_string().ok())
        .collect()
}
