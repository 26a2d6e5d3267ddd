//! Lifecycle coordination for the managed server, its worlds and backups.
//!
//! Every mutating operation follows the same shape: re-read live state,
//! check the precondition, hand the mutation to a script, the supervisor or
//! the filesystem, then re-read state and report. Precondition failures are
//! returned before any external command runs.
//!
//! Two advisory locks serialize mutations issued through this coordinator:
//! `process_lock` guards start/stop/restart and anything that requires the
//! server to be in a given state, `world_lock` guards the world and backup
//! directories. When both are needed they are taken in that order.

use serde::Serialize;
use std::collections::HashSet;
use std::fs::{self, File, FileTimes};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::domain::{BackupEntry, ManagedProcessState};
use crate::paths::ServerLayout;
use crate::ports::{CommandOutput, CommandRunner, CommandSpec, CoreError, StateProbe};
use crate::settings::SettingsStore;

use super::{ArtifactInspector, require_world_name};

/// Timeout for backup creation, restore and cleanup.
pub const BACKUP_TIMEOUT: Duration = Duration::from_secs(60);

/// Timeout for world generation.
pub const WORLD_CREATE_TIMEOUT: Duration = Duration::from_secs(300);

const DEFAULT_WORLD_SIZE: i64 = 2;
const DEFAULT_DIFFICULTY: i64 = 0;

/// Outcome of start/stop/restart.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessAction {
    pub message: String,
    pub output: String,
    /// State derived from a probe taken after the command returned.
    pub state: ManagedProcessState,
}

/// Outcome of a script that produces no artifact of its own.
#[derive(Debug, Clone, Serialize)]
pub struct CommandReport {
    pub message: String,
    pub output: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BackupCreated {
    pub message: String,
    pub output: String,
    /// Backups that appeared during this call, newest first.
    pub backups: Vec<BackupEntry>,
}

/// Parameters for world generation. Out-of-range size and difficulty fall
/// back to Medium and Classic.
#[derive(Debug, Clone, Default)]
pub struct WorldCreateRequest {
    pub name: String,
    pub size: Option<i64>,
    pub difficulty: Option<i64>,
    pub seed: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorldCreated {
    pub message: String,
    pub name: String,
    pub size: String,
    pub size_code: i64,
    pub difficulty: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorldDeleted {
    pub message: String,
    pub name: String,
    pub removed_backup: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorldCopied {
    pub message: String,
    pub name: String,
    pub size: String,
    pub modified: chrono::DateTime<chrono::Utc>,
}

pub struct LifecycleCoordinator {
    layout: Arc<ServerLayout>,
    runner: Arc<dyn CommandRunner>,
    probe: Arc<dyn StateProbe>,
    inspector: Arc<ArtifactInspector>,
    settings: Arc<SettingsStore>,
    process_lock: Mutex<()>,
    world_lock: Mutex<()>,
}

impl LifecycleCoordinator {
    pub fn new(
        layout: Arc<ServerLayout>,
        runner: Arc<dyn CommandRunner>,
        probe: Arc<dyn StateProbe>,
        inspector: Arc<ArtifactInspector>,
        settings: Arc<SettingsStore>,
    ) -> Self {
        Self {
            layout,
            runner,
            probe,
            inspector,
            settings,
            process_lock: Mutex::new(()),
            world_lock: Mutex::new(()),
        }
    }

    // -------------------------------------------------------------------------
    // Process lifecycle
    // -------------------------------------------------------------------------

    pub async fn start(&self) -> Result<ProcessAction, CoreError> {
        let _process = self.process_lock.lock().await;
        if self.probe.is_process_alive().await {
            return Err(CoreError::InvalidState(
                "Server is already running".to_string(),
            ));
        }

        let output = self.runner.run(self.supervisorctl("start")).await;
        if !output.success && !mentions(&output, "already started") {
            return Err(CoreError::external("Failed to start server", &output));
        }

        let state = self.current_state().await;
        info!(?state, "Server start command sent");
        Ok(ProcessAction {
            message: "Server start command sent".to_string(),
            output: output.clean_stdout(),
            state,
        })
    }

    pub async fn stop(&self) -> Result<ProcessAction, CoreError> {
        let _process = self.process_lock.lock().await;
        if !self.probe.is_process_alive().await {
            return Err(CoreError::InvalidState("Server is not running".to_string()));
        }

        let output = self.runner.run(self.supervisorctl("stop")).await;
        if !output.success && !mentions(&output, "already stopped") {
            return Err(CoreError::external("Failed to stop server", &output));
        }

        let state = self.current_state().await;
        info!(?state, "Server stop command sent");
        Ok(ProcessAction {
            message: "Server stop command sent. World will be saved.".to_string(),
            output: output.clean_stdout(),
            state,
        })
    }

    pub async fn restart(&self) -> Result<ProcessAction, CoreError> {
        let _process = self.process_lock.lock().await;

        let output = self.runner.run(self.supervisorctl("restart")).await;
        if !output.success {
            return Err(CoreError::external("Failed to restart server", &output));
        }

        let state = self.current_state().await;
        info!(?state, "Server restart command sent");
        Ok(ProcessAction {
            message: "Server restart command sent. Players will be disconnected.".to_string(),
            output: output.clean_stdout(),
            state,
        })
    }

    // -------------------------------------------------------------------------
    // Backups
    // -------------------------------------------------------------------------

    /// Run the backup script for one world, or for all worlds when `world`
    /// is `None` or empty.
    ///
    /// Success requires the backup directory to contain a new managed
    /// archive afterwards (one for `world`, when given).
    pub async fn create_backup(&self, world: Option<&str>) -> Result<BackupCreated, CoreError> {
        let world = world
            .filter(|w| !w.is_empty())
            .map(require_world_name)
            .transpose()?;

        let _worlds = self.world_lock.lock().await;
        if let Some(name) = &world {
            if !file_exists(&self.layout.dirs.world_file(name)).await {
                return Err(CoreError::NotFound(format!("World '{name}' does not exist")));
            }
        }

        let before: HashSet<String> = self
            .inspect(ArtifactInspector::managed_backups)
            .await?
            .into_iter()
            .map(|b| b.filename)
            .collect();

        let spec = CommandSpec::new(&self.layout.scripts.backup)
            .arg("create")
            .args(world.clone())
            .with_timeout(BACKUP_TIMEOUT);
        let output = self.runner.run(spec).await;
        if !output.success {
            return Err(CoreError::external("Failed to create backup", &output));
        }

        let created: Vec<BackupEntry> = self
            .inspect(ArtifactInspector::managed_backups)
            .await?
            .into_iter()
            .filter(|b| !before.contains(&b.filename))
            .collect();
        let satisfied = match &world {
            Some(name) => created.iter().any(|b| &b.world_name == name),
            None => !created.is_empty(),
        };
        if !satisfied {
            warn!(world = ?world, "Backup script succeeded but no new backup appeared");
            return Err(CoreError::PostconditionMismatch {
                message: "Backup script reported success but no new backup was found".to_string(),
                detail: output.clean_stdout(),
            });
        }

        info!(world = ?world, count = created.len(), "Backup created");
        Ok(BackupCreated {
            message: "Backup created successfully".to_string(),
            output: output.clean_stdout(),
            backups: created,
        })
    }

    /// Restore a backup archive. Refused while the server is alive.
    pub async fn restore_backup(
        &self,
        filename: &str,
        skip_pre_restore_backup: bool,
    ) -> Result<CommandReport, CoreError> {
        let path = self.inspector.checked_backup_path(filename)?;

        let _process = self.process_lock.lock().await;
        let _worlds = self.world_lock.lock().await;
        ensure_exists(&path, || format!("Backup '{filename}' does not exist")).await?;
        if self.probe.is_process_alive().await {
            return Err(CoreError::InvalidState(
                "Stop the server before restoring a backup".to_string(),
            ));
        }

        let mut spec = CommandSpec::new(&self.layout.scripts.restore)
            .args(["restore", filename, "--force"])
            .with_timeout(BACKUP_TIMEOUT);
        if skip_pre_restore_backup {
            spec = spec.arg("--no-backup");
        }
        let output = self.runner.run(spec).await;
        if !output.success {
            return Err(CoreError::external("Failed to restore backup", &output));
        }

        info!(filename, skip_pre_restore_backup, "Backup restored");
        Ok(CommandReport {
            message: "Backup restored successfully".to_string(),
            output: output.clean_stdout(),
        })
    }

    /// Delete a backup archive. `confirm` must be exactly `"true"`.
    pub async fn delete_backup(
        &self,
        filename: &str,
        confirm: Option<&str>,
    ) -> Result<CommandReport, CoreError> {
        let path = self.inspector.checked_backup_path(filename)?;

        let _worlds = self.world_lock.lock().await;
        ensure_exists(&path, || format!("Backup '{filename}' does not exist")).await?;
        if confirm != Some("true") {
            return Err(CoreError::Validation(
                "Add ?confirm=true to URL to confirm deletion".to_string(),
            ));
        }

        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| CoreError::storage("Failed to delete backup", &e))?;

        info!(filename, "Backup deleted");
        Ok(CommandReport {
            message: format!("Backup '{filename}' deleted successfully"),
            output: String::new(),
        })
    }

    /// Apply the retention policy through the backup script.
    pub async fn cleanup_backups(&self) -> Result<CommandReport, CoreError> {
        let _worlds = self.world_lock.lock().await;

        let spec = CommandSpec::new(&self.layout.scripts.backup)
            .arg("cleanup")
            .with_timeout(BACKUP_TIMEOUT);
        let output = self.runner.run(spec).await;
        if !output.success {
            return Err(CoreError::external("Failed to run cleanup", &output));
        }

        info!("Backup cleanup completed");
        Ok(CommandReport {
            message: "Backup cleanup completed".to_string(),
            output: output.clean_stdout(),
        })
    }

    // -------------------------------------------------------------------------
    // Worlds
    // -------------------------------------------------------------------------

    /// Generate a new world through the world manager script.
    ///
    /// The world file's presence afterwards is the only success criterion;
    /// the script's exit status only picks the error variant.
    pub async fn create_world(&self, request: WorldCreateRequest) -> Result<WorldCreated, CoreError> {
        if request.name.is_empty() {
            return Err(CoreError::Validation("World name is required".to_string()));
        }
        let name = require_world_name(&request.name)?;
        let size = request
            .size
            .filter(|s| (1..=3).contains(s))
            .unwrap_or(DEFAULT_WORLD_SIZE);
        let difficulty = request
            .difficulty
            .filter(|d| (0..=3).contains(d))
            .unwrap_or(DEFAULT_DIFFICULTY);

        let _worlds = self.world_lock.lock().await;
        let world_path = self.layout.dirs.world_file(&name);
        if file_exists(&world_path).await {
            return Err(CoreError::AlreadyExists(format!(
                "World '{name}' already exists"
            )));
        }

        let mut spec = CommandSpec::new(&self.layout.scripts.world_manager)
            .arg("create-auto")
            .env("WORLD_NAME", &name)
            .env("AUTOCREATE", size.to_string())
            .env("DIFFICULTY", difficulty.to_string())
            .with_timeout(WORLD_CREATE_TIMEOUT);
        if let Some(seed) = request.seed.filter(|s| !s.is_empty()) {
            spec = spec.env("WORLD_SEED", seed);
        }

        info!(world = %name, size, difficulty, "Generating world");
        let output = self.runner.run(spec).await;

        match self.inspect(move |i| i.stat(&world_path)).await? {
            Some(info) => {
                info!(world = %name, size = %info.size_human, "World created");
                Ok(WorldCreated {
                    message: format!("World '{name}' created successfully"),
                    name,
                    size: info.size_human,
                    size_code: size,
                    difficulty,
                })
            }
            None if output.success => Err(CoreError::PostconditionMismatch {
                message: "World creation reported success but no world file was written"
                    .to_string(),
                detail: output.diagnostic(),
            }),
            None => Err(CoreError::external("Failed to create world", &output)),
        }
    }

    /// Delete a world and its `.bak` companion.
    ///
    /// `confirm` must equal the sanitized world name. The active world can
    /// only be deleted while the server is down.
    pub async fn delete_world(
        &self,
        raw_name: &str,
        confirm: Option<&str>,
    ) -> Result<WorldDeleted, CoreError> {
        let name = require_world_name(raw_name)?;

        let _process = self.process_lock.lock().await;
        let _worlds = self.world_lock.lock().await;
        let path = self.layout.dirs.world_file(&name);
        ensure_exists(&path, || format!("World '{name}' does not exist")).await?;
        if confirm != Some(name.as_str()) {
            return Err(CoreError::Validation(format!(
                "Add ?confirm={name} to URL to confirm deletion"
            )));
        }
        if name == self.settings.snapshot().world_name && self.probe.is_process_alive().await {
            return Err(CoreError::InvalidState(
                "Stop the server before deleting the active world".to_string(),
            ));
        }

        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| CoreError::storage("Failed to delete world", &e))?;
        let companion = self.layout.dirs.world_backup_file(&name);
        let removed_backup = file_exists(&companion).await;
        if removed_backup {
            tokio::fs::remove_file(&companion)
                .await
                .map_err(|e| CoreError::storage("Failed to delete world backup file", &e))?;
        }

        info!(world = %name, removed_backup, "World deleted");
        Ok(WorldDeleted {
            message: format!("World '{name}' deleted successfully"),
            name,
            removed_backup,
        })
    }

    /// Copy a world (and its `.bak`) under a new name, preserving timestamps.
    pub async fn copy_world(
        &self,
        raw_source: &str,
        destination: Option<&str>,
    ) -> Result<WorldCopied, CoreError> {
        let source = require_world_name(raw_source)?;

        let _worlds = self.world_lock.lock().await;
        let src_path = self.layout.dirs.world_file(&source);
        ensure_exists(&src_path, || {
            format!("Source world '{source}' does not exist")
        })
        .await?;

        let raw_dest = destination
            .filter(|d| !d.is_empty())
            .ok_or_else(|| CoreError::Validation("Destination name is required".to_string()))?;
        let dest = require_world_name(raw_dest)?;
        let dest_path = self.layout.dirs.world_file(&dest);
        if tokio::fs::metadata(&dest_path).await.is_ok() {
            return Err(CoreError::AlreadyExists(format!(
                "Destination world '{dest}' already exists"
            )));
        }

        let mut pairs = vec![(src_path, dest_path.clone())];
        let src_bak = self.layout.dirs.world_backup_file(&source);
        if file_exists(&src_bak).await {
            pairs.push((src_bak, self.layout.dirs.world_backup_file(&dest)));
        }
        let copy_result = tokio::task::spawn_blocking(move || copy_all(&pairs))
            .await
            .map_err(|e| CoreError::Storage {
                message: "Failed to copy world".to_string(),
                detail: e.to_string(),
            })?;
        copy_result.map_err(|e| CoreError::storage("Failed to copy world", &e))?;

        let stat_path = dest_path.clone();
        let info = self
            .inspect(move |i| i.stat(&stat_path))
            .await?
            .ok_or_else(|| CoreError::Storage {
                message: "Failed to copy world".to_string(),
                detail: format!("{} missing after copy", dest_path.display()),
            })?;

        info!(source = %source, destination = %dest, "World copied");
        Ok(WorldCopied {
            message: format!("World '{source}' copied to '{dest}'"),
            name: dest,
            size: info.size_human,
            modified: info.modified,
        })
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    fn supervisorctl(&self, verb: &str) -> CommandSpec {
        let target = &self.layout.supervisor;
        CommandSpec::new(&target.ctl).args([verb, target.program.as_str()])
    }

    /// Run a synchronous inspector scan off the async workers.
    async fn inspect<T, F>(&self, scan: F) -> Result<T, CoreError>
    where
        F: FnOnce(&ArtifactInspector) -> T + Send + 'static,
        T: Send + 'static,
    {
        let inspector = Arc::clone(&self.inspector);
        tokio::task::spawn_blocking(move || scan(&inspector))
            .await
            .map_err(|e| CoreError::Storage {
                message: "Filesystem scan failed".to_string(),
                detail: e.to_string(),
            })
    }

    async fn current_state(&self) -> ManagedProcessState {
        self.probe
            .probe()
            .await
            .state_of(&self.layout.supervisor.program)
    }
}

fn mentions(output: &CommandOutput, phrase: &str) -> bool {
    output.stdout.to_lowercase().contains(phrase)
}

async fn file_exists(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok_and(|m| m.is_file())
}

async fn ensure_exists(path: &Path, message: impl FnOnce() -> String) -> Result<(), CoreError> {
    if file_exists(path).await {
        Ok(())
    } else {
        Err(CoreError::NotFound(message()))
    }
}

/// Copy each `(src, dst)` pair, carrying over access and modification
/// times. On failure, the partial destination and every destination already
/// written are removed.
fn copy_all(pairs: &[(PathBuf, PathBuf)]) -> io::Result<()> {
    copy_all_with(pairs, copy_preserving_times)
}

fn copy_all_with<F>(pairs: &[(PathBuf, PathBuf)], copy: F) -> io::Result<()>
where
    F: Fn(&Path, &Path) -> io::Result<()>,
{
    let mut written: Vec<&Path> = Vec::new();
    for (src, dst) in pairs {
        if let Err(e) = copy(src, dst) {
            warn!(path = %dst.display(), error = %e, "World copy failed, rolling back");
            for path in std::iter::once(dst.as_path()).chain(written) {
                if let Err(cleanup) = fs::remove_file(path) {
                    if cleanup.kind() != io::ErrorKind::NotFound {
                        warn!(path = %path.display(), error = %cleanup, "Failed to remove partial copy");
                    }
                }
            }
            return Err(e);
        }
        written.push(dst);
    }
    Ok(())
}

fn copy_preserving_times(src: &Path, dst: &Path) -> io::Result<()> {
    fs::copy(src, dst)?;
    let meta = fs::metadata(src)?;
    let times = FileTimes::new()
        .set_accessed(meta.accessed()?)
        .set_modified(meta.modified()?);
    File::options().write(true).open(dst)?.set_times(times)
}
