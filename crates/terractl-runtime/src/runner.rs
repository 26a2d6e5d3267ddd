//! External command runner backed by `tokio::process`.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

use terractl_core::ports::{CommandOutput, CommandRunner, CommandSpec};

/// Runs scripts and CLI tools with captured output and a hard timeout.
///
/// Children inherit the environment plus `TERM=dumb` and the spec's extra
/// variables, with stdin closed.
///
/// # Timeouts
///
/// When the timeout elapses the call returns a failure and the child is
/// killed. Processes the child spawned itself are not tracked.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptRunner;

impl ScriptRunner {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for ScriptRunner {
    async fn run(&self, spec: CommandSpec) -> CommandOutput {
        let is_script = is_path(&spec.program);
        let missing = is_script && !tokio::fs::try_exists(&spec.program).await.unwrap_or(false);
        if missing {
            return CommandOutput::failure(format!(
                "Script not found: {}",
                spec.program.display()
            ));
        }

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .env("TERM", "dumb")
            .envs(spec.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(
            program = %spec.program.display(),
            args = ?spec.args,
            timeout_secs = spec.timeout.as_secs(),
            "Running external command"
        );

        match tokio::time::timeout(spec.timeout, cmd.output()).await {
            Err(_) => {
                let kind = if is_script { "Script" } else { "Command" };
                warn!(program = %spec.program.display(), "External command timed out");
                CommandOutput::failure(format!(
                    "{kind} timed out after {} seconds",
                    spec.timeout.as_secs()
                ))
            }
            Ok(Err(e)) => {
                warn!(program = %spec.program.display(), error = %e, "Failed to launch command");
                CommandOutput::failure(e.to_string())
            }
            Ok(Ok(output)) => {
                let result = CommandOutput {
                    success: output.status.success(),
                    exit_code: output.status.code(),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                };
                debug!(
                    program = %spec.program.display(),
                    success = result.success,
                    exit_code = ?result.exit_code,
                    "External command finished"
                );
                result
            }
        }
    }
}

/// A program given with a directory component is a script path; a bare
/// name is resolved through `PATH`.
fn is_path(program: &Path) -> bool {
    program.components().count() > 1 || program.is_absolute()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_names_are_not_paths() {
        assert!(!is_path(Path::new("supervisorctl")));
        assert!(is_path(Path::new("/terraria/scripts/backup.sh")));
        assert!(is_path(Path::new("scripts/backup.sh")));
    }
}
