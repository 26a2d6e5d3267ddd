//! Game-server settings snapshots.
//!
//! Settings are immutable values. An update builds a new snapshot from the
//! current one plus a patch and swaps it in; readers holding an older
//! snapshot keep a consistent view. Nothing touches the process environment.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use crate::paths::Directories;
use crate::ports::CoreError;

/// Server and backup-scheduler settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    /// The world the server loads; deleting it is refused while running.
    pub world_name: String,
    pub max_players: u32,
    pub port: u16,
    pub password: String,
    pub motd: String,
    pub difficulty: u8,
    /// World size used when the server autocreates a world.
    pub autocreate: u8,
    pub secure: u8,
    pub backup_enabled: bool,
    /// Minutes between scheduled backups.
    pub backup_interval: u32,
    /// Number of backups kept by cleanup.
    pub backup_retention: u32,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            world_name: "world".to_string(),
            max_players: 8,
            port: 7777,
            password: String::new(),
            motd: "Welcome to the Terraria Server!".to_string(),
            difficulty: 0,
            autocreate: 2,
            secure: 1,
            backup_enabled: true,
            backup_interval: 30,
            backup_retention: 48,
        }
    }
}

/// The closed set of keys accepted by [`SettingsStore::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingKey {
    MaxPlayers,
    Motd,
    Password,
    Difficulty,
    Autocreate,
    Secure,
    BackupEnabled,
    BackupInterval,
    BackupRetention,
}

impl SettingKey {
    pub const ALL: [Self; 9] = [
        Self::MaxPlayers,
        Self::Motd,
        Self::Password,
        Self::Difficulty,
        Self::Autocreate,
        Self::Secure,
        Self::BackupEnabled,
        Self::BackupInterval,
        Self::BackupRetention,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MaxPlayers => "max_players",
            Self::Motd => "motd",
            Self::Password => "password",
            Self::Difficulty => "difficulty",
            Self::Autocreate => "autocreate",
            Self::Secure => "secure",
            Self::BackupEnabled => "backup_enabled",
            Self::BackupInterval => "backup_interval",
            Self::BackupRetention => "backup_retention",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == key)
    }

    /// Game settings only take effect after the server restarts; backup
    /// scheduler settings are picked up on its next cycle.
    pub const fn restart_required(self) -> bool {
        !matches!(
            self,
            Self::BackupEnabled | Self::BackupInterval | Self::BackupRetention
        )
    }
}

/// Result of applying a patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingsUpdateOutcome {
    pub updated: Vec<SettingKey>,
    pub restart_required: bool,
}

/// Apply a JSON patch to a snapshot, returning the new snapshot and the keys
/// that were accepted.
///
/// Keys are applied and reported in the patch's own order. Unknown keys and
/// values of the wrong type are skipped. Integers are
/// clamped to their range and strings truncated to their maximum length.
pub fn apply_patch(
    current: &ServerSettings,
    patch: &Map<String, Value>,
) -> (ServerSettings, Vec<SettingKey>) {
    let mut next = current.clone();
    let mut updated = Vec::new();

    for (raw_key, value) in patch {
        let Some(key) = SettingKey::from_key(raw_key) else {
            continue;
        };
        let applied = match key {
            SettingKey::MaxPlayers => set_clamped(value, 1, 255, &mut next.max_players),
            SettingKey::Motd => set_truncated(value, 500, &mut next.motd),
            SettingKey::Password => set_truncated(value, 64, &mut next.password),
            SettingKey::Difficulty => set_clamped(value, 0, 3, &mut next.difficulty),
            SettingKey::Autocreate => set_clamped(value, 1, 3, &mut next.autocreate),
            SettingKey::Secure => set_clamped(value, 0, 1, &mut next.secure),
            SettingKey::BackupEnabled => as_bool(value)
                .map(|b| next.backup_enabled = b)
                .is_some(),
            SettingKey::BackupInterval => set_clamped(value, 1, 1440, &mut next.backup_interval),
            SettingKey::BackupRetention => {
                set_clamped(value, 1, 1000, &mut next.backup_retention)
            }
        };
        if applied {
            updated.push(key);
        }
    }

    (next, updated)
}

fn set_clamped<T>(value: &Value, min: i64, max: i64, slot: &mut T) -> bool
where
    T: TryFrom<i64>,
{
    let Some(n) = as_int(value) else {
        return false;
    };
    match T::try_from(n.clamp(min, max)) {
        Ok(v) => {
            *slot = v;
            true
        }
        Err(_) => false,
    }
}

fn set_truncated(value: &Value, max_chars: usize, slot: &mut String) -> bool {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return false,
    };
    *slot = text.chars().take(max_chars).collect();
    true
}

#[allow(clippy::cast_possible_truncation)]
fn as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Holds the current settings snapshot.
#[derive(Debug)]
pub struct SettingsStore {
    current: RwLock<Arc<ServerSettings>>,
}

impl SettingsStore {
    pub fn new(initial: ServerSettings) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
        }
    }

    /// The current snapshot. Cheap; callers may hold it across awaits.
    pub fn snapshot(&self) -> Arc<ServerSettings> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Apply a patch and swap in the resulting snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] when no key of the patch was applied;
    /// the stored snapshot is left untouched in that case.
    pub fn update(&self, patch: &Map<String, Value>) -> Result<SettingsUpdateOutcome, CoreError> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let (next, updated) = apply_patch(&guard, patch);
        if updated.is_empty() {
            return Err(CoreError::Validation(
                "No valid configuration options provided".to_string(),
            ));
        }
        *guard = Arc::new(next);
        drop(guard);

        let restart_required = updated.iter().any(|k| k.restart_required());
        tracing::info!(
            updated = ?updated.iter().map(|k| k.as_str()).collect::<Vec<_>>(),
            restart_required,
            "Server settings updated"
        );
        Ok(SettingsUpdateOutcome {
            updated,
            restart_required,
        })
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new(ServerSettings::default())
    }
}

pub const fn difficulty_name(difficulty: u8) -> &'static str {
    match difficulty {
        0 => "Classic",
        1 => "Expert",
        2 => "Master",
        3 => "Journey",
        _ => "Unknown",
    }
}

pub const fn world_size_name(size: u8) -> &'static str {
    match size {
        1 => "Small",
        2 => "Medium",
        3 => "Large",
        _ => "Unknown",
    }
}

/// Read-only presentation of the settings; the password is never exposed.
#[derive(Debug, Clone, Serialize)]
pub struct SettingsView {
    pub server: ServerSection,
    pub backup: BackupSection,
    pub paths: PathsSection,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerSection {
    pub world_name: String,
    pub max_players: u32,
    pub port: u16,
    pub has_password: bool,
    pub motd: String,
    pub difficulty: u8,
    pub difficulty_name: &'static str,
    pub autocreate: u8,
    pub autocreate_name: &'static str,
    pub secure: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct BackupSection {
    pub enabled: bool,
    pub interval: u32,
    pub retention: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PathsSection {
    pub worlds: PathBuf,
    pub backups: PathBuf,
    pub logs: PathBuf,
    pub config: PathBuf,
}

impl SettingsView {
    pub fn new(settings: &ServerSettings, dirs: &Directories) -> Self {
        Self {
            server: ServerSection {
                world_name: settings.world_name.clone(),
                max_players: settings.max_players,
                port: settings.port,
                has_password: !settings.password.is_empty(),
                motd: settings.motd.clone(),
                difficulty: settings.difficulty,
                difficulty_name: difficulty_name(settings.difficulty),
                autocreate: settings.autocreate,
                autocreate_name: world_size_name(settings.autocreate),
                secure: settings.secure,
            },
            backup: BackupSection {
                enabled: settings.backup_enabled,
                interval: settings.backup_interval,
                retention: settings.backup_retention,
            },
            paths: PathsSection {
                worlds: dirs.worlds.clone(),
                backups: dirs.backups.clone(),
                logs: dirs.logs.clone(),
                config: dirs.config.clone(),
            },
        }
    }
}

/// Contents of the generated runtime config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuntimeConfig {
    pub exists: bool,
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Read `<config>/serverconfig-runtime.txt`.
///
/// # Errors
///
/// A missing file is not an error; any other read failure is
/// [`CoreError::Storage`].
pub async fn runtime_config(dirs: &Directories) -> Result<RuntimeConfig, CoreError> {
    let path = dirs.runtime_config_file();
    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok(RuntimeConfig {
            exists: true,
            content: Some(String::from_utf8_lossy(&bytes).into_owned()),
            path,
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(RuntimeConfig {
            exists: false,
            path,
            content: None,
        }),
        Err(e) => Err(CoreError::storage("Failed to read runtime config", &e)),
    }
}
