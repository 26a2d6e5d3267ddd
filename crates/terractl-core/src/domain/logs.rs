//! Logical log names and their physical files.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A fixed symbolic log name mapped to one physical file in the log dir.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    Server,
    Error,
    Supervisor,
    Crash,
    Backup,
    Restore,
    World,
}

impl LogKind {
    /// Every logical log, one entry per physical file.
    pub const ALL: [Self; 7] = [
        Self::Server,
        Self::Error,
        Self::Supervisor,
        Self::Crash,
        Self::Backup,
        Self::Restore,
        Self::World,
    ];

    /// Names accepted by [`LogKind::from_str`], aliases included.
    pub const ACCEPTED_NAMES: [&'static str; 10] = [
        "server",
        "stdout",
        "error",
        "stderr",
        "supervisor",
        "crash",
        "crashes",
        "backup",
        "restore",
        "world",
    ];

    /// Names accepted by the clear operation.
    pub const CLEARABLE_NAMES: [&'static str; 5] =
        ["crash", "crashes", "backup", "restore", "world"];

    /// Canonical logical name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Server => "server",
            Self::Error => "error",
            Self::Supervisor => "supervisor",
            Self::Crash => "crash",
            Self::Backup => "backup",
            Self::Restore => "restore",
            Self::World => "world",
        }
    }

    /// Physical filename inside the log directory.
    pub const fn filename(self) -> &'static str {
        match self {
            Self::Server => "terraria-stdout.log",
            Self::Error => "terraria-stderr.log",
            Self::Supervisor => "supervisord.log",
            Self::Crash => "crashes.log",
            Self::Backup => "backup.log",
            Self::Restore => "restore.log",
            Self::World => "world-manager.log",
        }
    }

    /// Whether the log may be truncated through the API.
    ///
    /// The live server's stdout/stderr and the supervisor log are evidence of
    /// a running process and are never cleared.
    pub const fn is_clearable(self) -> bool {
        matches!(self, Self::Crash | Self::Backup | Self::Restore | Self::World)
    }

    /// Reverse lookup from a physical filename.
    pub fn from_filename(filename: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.filename() == filename)
    }
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown logical log name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown log type: {0}")]
pub struct UnknownLogKind(pub String);

impl FromStr for LogKind {
    type Err = UnknownLogKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "server" | "stdout" => Ok(Self::Server),
            "error" | "stderr" => Ok(Self::Error),
            "supervisor" => Ok(Self::Supervisor),
            "crash" | "crashes" => Ok(Self::Crash),
            "backup" => Ok(Self::Backup),
            "restore" => Ok(Self::Restore),
            "world" => Ok(Self::World),
            other => Err(UnknownLogKind(other.to_string())),
        }
    }
}
