//! Environment configuration for the web adapter.
//!
//! Everything is read once at startup into an [`AppConfig`] value and handed
//! to [`crate::bootstrap`]. Nothing is written back to the process
//! environment.

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use terractl_core::{Directories, ScriptPaths, ServerLayout, ServerSettings, SupervisorTarget};
use thiserror::Error;

use crate::bootstrap::{CorsConfig, ServerConfig};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_USERNAME: &str = "admin";
pub const DEFAULT_TOKEN_EXPIRY_SECS: u64 = 86_400;
pub const DEFAULT_TERRARIA_DIR: &str = "/terraria";
pub const MIN_PASSWORD_LEN: usize = 8;

/// Startup configuration problems.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Credentials and token lifetime for the single API user.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
    pub token_expiry_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            username: DEFAULT_USERNAME.to_string(),
            password: String::new(),
            token_expiry_secs: DEFAULT_TOKEN_EXPIRY_SECS,
        }
    }
}

/// Complete adapter configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub layout: ServerLayout,
    /// Initial game-server settings; later changes live in the settings store.
    pub settings: ServerSettings,
    pub debug: bool,
}

impl AppConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Malformed numbers fall back to their defaults with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);
        let defaults = ServerSettings::default();

        let root = PathBuf::from(env.string("TERRARIA_DIR", DEFAULT_TERRARIA_DIR));
        let mut dirs = Directories::under(&root);
        env.override_path("WORLD_DIR", &mut dirs.worlds);
        env.override_path("BACKUP_DIR", &mut dirs.backups);
        env.override_path("LOG_DIR", &mut dirs.logs);
        env.override_path("SCRIPTS_DIR", &mut dirs.scripts);
        env.override_path("CONFIG_DIR", &mut dirs.config);

        let target = SupervisorTarget::default();
        let supervisor = SupervisorTarget {
            ctl: env.get("SUPERVISORCTL").map_or(target.ctl, PathBuf::from),
            socket: env.get("SUPERVISOR_SOCKET").map_or(target.socket, PathBuf::from),
            program: env.string("SERVER_PROGRAM", &target.program),
            process_pattern: env.string("SERVER_PROCESS_PATTERN", &target.process_pattern),
        };

        let layout = ServerLayout {
            scripts: ScriptPaths::in_dir(&dirs.scripts),
            dirs,
            supervisor,
        };

        let settings = ServerSettings {
            world_name: env.string("WORLD_NAME", &defaults.world_name),
            max_players: env.parsed("MAX_PLAYERS", defaults.max_players),
            port: env.parsed("SERVER_PORT", defaults.port),
            password: env.string("SERVER_PASSWORD", &defaults.password),
            motd: env.string("MOTD", &defaults.motd),
            difficulty: env.parsed("DIFFICULTY", defaults.difficulty),
            autocreate: env.parsed("AUTOCREATE", defaults.autocreate),
            secure: env.parsed("SECURE", defaults.secure),
            backup_enabled: env.flag("BACKUP_ENABLED", defaults.backup_enabled),
            backup_interval: env.parsed("BACKUP_INTERVAL", defaults.backup_interval),
            backup_retention: env.parsed("BACKUP_RETENTION", defaults.backup_retention),
        };

        let server = ServerConfig {
            host: env.string("API_HOST", DEFAULT_HOST),
            port: env.parsed("API_PORT", DEFAULT_PORT),
            static_dir: env.get("FRONTEND_DIR").map(PathBuf::from),
            cors: CorsConfig::parse(&env.string("CORS_ORIGINS", "*")),
        };

        let auth = AuthConfig {
            username: env.string("API_USERNAME", DEFAULT_USERNAME),
            password: env.string("API_PASSWORD", ""),
            token_expiry_secs: env.parsed("API_TOKEN_EXPIRY", DEFAULT_TOKEN_EXPIRY_SECS),
        };

        Self {
            server,
            auth,
            layout,
            settings,
            debug: env.flag("API_DEBUG", false),
        }
    }

    /// Every problem that should stop the server from starting.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.auth.password.is_empty() {
            problems.push("API_PASSWORD must be set for authentication".to_string());
        } else if self.auth.password.chars().count() < MIN_PASSWORD_LEN {
            problems.push(format!(
                "API_PASSWORD must be at least {MIN_PASSWORD_LEN} characters"
            ));
        }
        if self.auth.username.is_empty() {
            problems.push("API_USERNAME must not be empty".to_string());
        }
        if self.auth.token_expiry_secs == 0 {
            problems.push("API_TOKEN_EXPIRY must be greater than zero".to_string());
        }

        problems
    }

    /// [`Self::validate`] as a `Result`.
    pub fn ensure_valid(&self) -> Result<(), ConfigError> {
        let problems = self.validate();
        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems))
        }
    }
}

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.is_empty())
    }

    fn string(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn override_path(&self, key: &str, slot: &mut PathBuf) {
        if let Some(value) = self.get(key) {
            *slot = PathBuf::from(value);
        }
    }

    fn flag(&self, key: &str, default: bool) -> bool {
        self.get(key)
            .map_or(default, |v| v.trim().eq_ignore_ascii_case("true"))
    }

    fn parsed<T>(&self, key: &str, default: T) -> T
    where
        T: FromStr + Display + Copy,
    {
        let Some(raw) = self.get(key) else {
            return default;
        };
        raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, %default, "Ignoring malformed number");
            default
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = config_from(&[]);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.auth.username, "admin");
        assert_eq!(config.auth.token_expiry_secs, 86_400);
        assert_eq!(config.layout.dirs.worlds, PathBuf::from("/terraria/worlds"));
        assert_eq!(
            config.layout.scripts.backup,
            PathBuf::from("/terraria/scripts/backup.sh")
        );
        assert_eq!(config.layout.supervisor.program, "terraria");
        assert!(matches!(config.server.cors, CorsConfig::AllowAll));
        assert_eq!(config.settings, ServerSettings::default());
        assert!(!config.debug);
    }

    #[test]
    fn directory_overrides_follow_root() {
        let config = config_from(&[
            ("TERRARIA_DIR", "/srv/tr"),
            ("BACKUP_DIR", "/mnt/backups"),
            ("SCRIPTS_DIR", "/opt/scripts"),
        ]);
        assert_eq!(config.layout.dirs.worlds, PathBuf::from("/srv/tr/worlds"));
        assert_eq!(config.layout.dirs.backups, PathBuf::from("/mnt/backups"));
        assert_eq!(
            config.layout.scripts.restore,
            PathBuf::from("/opt/scripts/restore.sh")
        );
    }

    #[test]
    fn malformed_numbers_fall_back() {
        let config = config_from(&[
            ("API_PORT", "eighty"),
            ("MAX_PLAYERS", "16"),
            ("BACKUP_RETENTION", "-3"),
        ]);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.settings.max_players, 16);
        assert_eq!(config.settings.backup_retention, 48);
    }

    #[test]
    fn flags_and_origins() {
        let config = config_from(&[
            ("API_DEBUG", "TRUE"),
            ("BACKUP_ENABLED", "false"),
            ("CORS_ORIGINS", "http://a.example, http://b.example"),
        ]);
        assert!(config.debug);
        assert!(!config.settings.backup_enabled);
        match config.server.cors {
            CorsConfig::AllowOrigins(origins) => {
                assert_eq!(origins, vec!["http://a.example", "http://b.example"]);
            }
            CorsConfig::AllowAll => panic!("expected explicit origins"),
        }
    }

    #[test]
    fn validate_reports_every_problem() {
        let config = config_from(&[("API_USERNAME", ""), ("API_TOKEN_EXPIRY", "0")]);
        // An empty API_USERNAME falls back to the default user.
        assert_eq!(config.auth.username, "admin");
        let problems = config.validate();
        assert_eq!(problems.len(), 2);
        assert!(problems[0].contains("API_PASSWORD must be set"));
        assert!(problems[1].contains("API_TOKEN_EXPIRY"));
    }

    #[test]
    fn short_password_rejected() {
        let config = config_from(&[("API_PASSWORD", "short")]);
        let err = config.ensure_valid().unwrap_err();
        assert!(err.to_string().contains("at least 8 characters"));

        let config = config_from(&[("API_PASSWORD", "long-enough")]);
        assert!(config.ensure_valid().is_ok());
    }
}
