//! External command runner port.
//!
//! Scripts and the supervisor CLI are opaque collaborators: the core hands
//! over a program, arguments, extra environment and a timeout, and gets back
//! exit status plus captured output.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::utils::strip_ansi_codes;

/// Timeout applied when an operation does not ask for a longer one.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// A single external invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Executable name (looked up on `PATH`) or path to a script.
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Extra environment on top of the inherited one.
    pub envs: Vec<(String, String)>,
    pub timeout: Duration,
}

impl CommandSpec {
    /// Create a spec with no arguments and the default timeout.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
            timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    /// Append one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Add an environment variable for the child.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Override the timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Captured result of an external invocation.
///
/// Non-zero exit, timeout and launch failure all surface as
/// `success == false` with a diagnostic in `stderr`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutput {
    pub success: bool,
    /// `None` when the process never exited normally (timeout, signal, launch failure).
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// A failed invocation that never produced output.
    pub fn failure(diagnostic: impl Into<String>) -> Self {
        Self {
            success: false,
            exit_code: None,
            stdout: String::new(),
            stderr: diagnostic.into(),
        }
    }

    /// User-facing stdout with escape sequences removed.
    pub fn clean_stdout(&self) -> String {
        strip_ansi_codes(&self.stdout)
    }

    /// The most useful error text: stderr if present, otherwise stdout.
    pub fn diagnostic(&self) -> String {
        let raw = if self.stderr.trim().is_empty() {
            &self.stdout
        } else {
            &self.stderr
        };
        strip_ansi_codes(raw)
    }
}

/// Runs external commands with a timeout.
///
/// Implementations must never panic or return early without output: every
/// failure mode is folded into a [`CommandOutput`] with `success == false`.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, spec: CommandSpec) -> CommandOutput;
}
