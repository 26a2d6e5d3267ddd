//! Name sanitization and managed backup filenames.
//!
//! Every user-supplied world name passes through [`sanitize_name`] before it
//! touches the filesystem. Backup archives are only recognized when their
//! filename matches the managed pattern; anything else in the backup
//! directory is treated as foreign and never listed.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static BACKUP_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^backup_(.+)_(\d{8})_(\d{6})\.tar(\.gz)?$").expect("static backup pattern")
});

/// Keep only `[A-Za-z0-9_-]`, dropping every other character.
///
/// The result may be empty; callers treat that as a validation failure.
pub fn sanitize_name(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// Whether a caller-supplied filename can be joined onto a directory root
/// without escaping it.
pub fn is_safe_filename(filename: &str) -> bool {
    !filename.is_empty()
        && !filename.contains("..")
        && !filename.contains('/')
        && !filename.contains('\\')
}

/// A parsed managed backup filename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupName {
    /// World the archive was taken from.
    pub world: String,
    /// `YYYYMMDD`
    pub date: String,
    /// `HHMMSS`
    pub time: String,
    /// Whether the archive carries the `.gz` suffix.
    pub compressed: bool,
}

impl BackupName {
    /// Parse `backup_<world>_<YYYYMMDD>_<HHMMSS>.tar[.gz]`.
    ///
    /// Returns `None` for any filename outside the managed pattern.
    pub fn parse(filename: &str) -> Option<Self> {
        let caps = BACKUP_NAME_RE.captures(filename)?;
        Some(Self {
            world: caps[1].to_string(),
            date: caps[2].to_string(),
            time: caps[3].to_string(),
            compressed: caps.get(4).is_some(),
        })
    }
}

impl fmt::Display for BackupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "backup_{}_{}_{}.tar", self.world, self.date, self.time)?;
        if self.compressed {
            f.write_str(".gz")?;
        }
        Ok(())
    }
}
