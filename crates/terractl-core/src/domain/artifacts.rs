//! On-disk artifact metadata: worlds, backups, logs, disk usage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::utils::format_bytes;

/// Stat result for a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub path: PathBuf,
    pub name: String,
    pub size_bytes: u64,
    pub size_human: String,
    pub modified: DateTime<Utc>,
    /// Birth time where the platform reports one, otherwise the change time
    /// the filesystem exposes as a fallback (mtime).
    pub created: DateTime<Utc>,
}

/// A world as it appears in listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldEntry {
    pub name: String,
    pub filename: String,
    pub size_bytes: u64,
    pub size: String,
    pub modified: DateTime<Utc>,
    /// Derived from the presence of `<name>.wld.bak`.
    pub has_backup: bool,
}

/// Detailed view of one world, including its `.bak` companion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldDetail {
    pub name: String,
    pub filename: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub size: String,
    pub modified: DateTime<Utc>,
    pub created: DateTime<Utc>,
    pub has_backup: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_modified: Option<DateTime<Utc>>,
}

/// A managed backup archive as it appears in listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupEntry {
    pub filename: String,
    pub world_name: String,
    pub date: String,
    pub time: String,
    pub size_bytes: u64,
    pub size: String,
    pub created: DateTime<Utc>,
}

/// Result of a backup listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupListing {
    pub backups: Vec<BackupEntry>,
    pub count: usize,
    /// Sum over every backup matching the filter, before any limit.
    pub total_size_bytes: u64,
    pub total_size: String,
    pub retention: u32,
}

/// Detailed view of a single backup archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupDetail {
    pub filename: String,
    pub path: PathBuf,
    /// `unknown` for archives outside the managed naming pattern.
    pub world_name: String,
    pub size_bytes: u64,
    pub size: String,
    pub created: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contents: Option<Vec<String>>,
}

/// A file in the log directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogFileEntry {
    pub name: String,
    /// Logical name, or `other` for files outside the fixed set.
    #[serde(rename = "type")]
    pub log_type: String,
    pub size_bytes: u64,
    pub size: String,
    pub modified: DateTime<Utc>,
}

/// Result of listing the log directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogListing {
    pub logs: Vec<LogFileEntry>,
    pub count: usize,
    pub path: PathBuf,
}

/// A window of lines read from one log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogWindow {
    pub log_type: String,
    pub filename: String,
    pub exists: bool,
    pub lines: Vec<String>,
    pub total_lines: usize,
    /// 0-based index of the first returned line.
    pub start_line: usize,
    /// 0-based index one past the last returned line.
    pub end_line: usize,
}

/// One search match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSearchHit {
    /// Logical log name.
    pub log: String,
    pub filename: String,
    /// 1-based.
    pub line_number: usize,
    pub content: String,
}

/// Result of a log search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSearchResult {
    pub query: String,
    pub results: Vec<LogSearchHit>,
    pub count: usize,
    pub limited: bool,
}

/// Filesystem capacity for a directory root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskUsage {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub free_bytes: u64,
    pub total_human: String,
    pub used_human: String,
    pub free_human: String,
    pub percent_used: f64,
}

impl DiskUsage {
    /// Build from raw totals; `used = total - free`, percentage to one decimal.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_totals(total_bytes: u64, free_bytes: u64) -> Self {
        let free_bytes = free_bytes.min(total_bytes);
        let used_bytes = total_bytes - free_bytes;
        let percent_used = if total_bytes == 0 {
            0.0
        } else {
            (used_bytes as f64 / total_bytes as f64 * 1000.0).round() / 10.0
        };
        Self {
            total_bytes,
            used_bytes,
            free_bytes,
            total_human: format_bytes(total_bytes),
            used_human: format_bytes(used_bytes),
            free_human: format_bytes(free_bytes),
            percent_used,
        }
    }
}
