//! Filesystem roots and external collaborators for a single server install.
//!
//! All values are injected at the composition root; nothing here reads the
//! environment.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::domain::LogKind;

/// File written by the server launcher with the effective runtime config.
pub const RUNTIME_CONFIG_FILE: &str = "serverconfig-runtime.txt";

/// Extension of world files in the world directory.
pub const WORLD_EXTENSION: &str = "wld";

/// Fixed directory roots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Directories {
    pub worlds: PathBuf,
    pub backups: PathBuf,
    pub logs: PathBuf,
    pub scripts: PathBuf,
    pub config: PathBuf,
}

impl Directories {
    /// Standard layout below an installation root.
    pub fn under(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            worlds: root.join("worlds"),
            backups: root.join("backups"),
            logs: root.join("logs"),
            scripts: root.join("scripts"),
            config: root.join("config"),
        }
    }

    /// `<worlds>/<name>.wld`. `name` must already be sanitized.
    pub fn world_file(&self, name: &str) -> PathBuf {
        self.worlds.join(format!("{name}.{WORLD_EXTENSION}"))
    }

    /// `<worlds>/<name>.wld.bak`, the server's own rolling backup.
    pub fn world_backup_file(&self, name: &str) -> PathBuf {
        self.worlds.join(format!("{name}.{WORLD_EXTENSION}.bak"))
    }

    /// `<backups>/<filename>`. `filename` must already be path-safe.
    pub fn backup_file(&self, filename: &str) -> PathBuf {
        self.backups.join(filename)
    }

    pub fn log_file(&self, kind: LogKind) -> PathBuf {
        self.logs.join(kind.filename())
    }

    pub fn runtime_config_file(&self) -> PathBuf {
        self.config.join(RUNTIME_CONFIG_FILE)
    }
}

/// Management scripts living in the scripts directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptPaths {
    pub backup: PathBuf,
    pub restore: PathBuf,
    pub world_manager: PathBuf,
}

impl ScriptPaths {
    pub fn in_dir(scripts: impl AsRef<Path>) -> Self {
        let scripts = scripts.as_ref();
        Self {
            backup: scripts.join("backup.sh"),
            restore: scripts.join("restore.sh"),
            world_manager: scripts.join("world-manager.sh"),
        }
    }
}

/// How to reach and identify the supervised server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupervisorTarget {
    /// Supervisor CLI, looked up on `PATH` unless absolute.
    pub ctl: PathBuf,
    /// Control socket whose presence means the daemon is up.
    pub socket: PathBuf,
    /// Program name inside the supervisor.
    pub program: String,
    /// Substring identifying the server in the process table.
    pub process_pattern: String,
}

impl Default for SupervisorTarget {
    fn default() -> Self {
        Self {
            ctl: PathBuf::from("supervisorctl"),
            socket: PathBuf::from("/tmp/supervisor.sock"),
            program: "terraria".to_string(),
            process_pattern: "TerrariaServer".to_string(),
        }
    }
}

/// Process pattern of the periodic backup scheduler.
pub const BACKUP_SCHEDULER_PATTERN: &str = "backup-scheduler";

/// Everything the core needs to locate one server installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerLayout {
    pub dirs: Directories,
    pub scripts: ScriptPaths,
    pub supervisor: SupervisorTarget,
}

impl ServerLayout {
    /// Standard layout below `root` with the default supervisor target.
    pub fn under(root: impl AsRef<Path>) -> Self {
        let dirs = Directories::under(root);
        let scripts = ScriptPaths::in_dir(&dirs.scripts);
        Self {
            dirs,
            scripts,
            supervisor: SupervisorTarget::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_layout() {
        let dirs = Directories::under("/terraria");
        assert_eq!(dirs.worlds, PathBuf::from("/terraria/worlds"));
        assert_eq!(
            dirs.world_backup_file("Alpha"),
            PathBuf::from("/terraria/worlds/Alpha.wld.bak")
        );
        assert_eq!(
            dirs.log_file(LogKind::Crash),
            PathBuf::from("/terraria/logs/crashes.log")
        );
        assert_eq!(
            dirs.runtime_config_file(),
            PathBuf::from("/terraria/config/serverconfig-runtime.txt")
        );
    }

    #[test]
    fn scripts_in_dir() {
        let scripts = ScriptPaths::in_dir("/opt/scripts");
        assert_eq!(scripts.restore, PathBuf::from("/opt/scripts/restore.sh"));
        assert_eq!(
            scripts.world_manager,
            PathBuf::from("/opt/scripts/world-manager.sh")
        );
    }
}
