//! Recording mock ports shared by the core integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use terractl_core::{
    AppCore, CommandOutput, CommandRunner, CommandSpec, CorePorts, DiskProbe, DiskUsage,
    NoopArchiveLister, ProbeReport, ServerLayout, ServerSettings, StateProbe,
};

/// Side effect a scripted command performs before "returning".
pub type Effect = Box<dyn Fn(&CommandSpec) + Send + Sync>;

/// Records every command and replies from a queue (default: success).
#[derive(Default)]
pub struct MockRunner {
    calls: Mutex<Vec<CommandSpec>>,
    replies: Mutex<VecDeque<(CommandOutput, Option<Effect>)>>,
}

impl MockRunner {
    pub fn reply(&self, output: CommandOutput) {
        self.replies.lock().unwrap().push_back((output, None));
    }

    pub fn reply_with(&self, output: CommandOutput, effect: Effect) {
        self.replies.lock().unwrap().push_back((output, Some(effect)));
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(&self, spec: CommandSpec) -> CommandOutput {
        self.calls.lock().unwrap().push(spec.clone());
        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some((output, effect)) => {
                if let Some(effect) = effect {
                    effect(&spec);
                }
                output
            }
            None => ok(""),
        }
    }
}

/// Probe whose answers are toggled by the test.
#[derive(Default)]
pub struct MockProbe {
    pub alive: AtomicBool,
    pub daemon_up: AtomicBool,
    pub scheduler_running: AtomicBool,
    pub status_output: Mutex<String>,
}

impl MockProbe {
    pub fn set_alive(&self, alive: bool) {
        self.alive.store(alive, Ordering::SeqCst);
    }
}

#[async_trait]
impl StateProbe for MockProbe {
    async fn probe(&self) -> ProbeReport {
        let daemon_up = self.daemon_up.load(Ordering::SeqCst);
        ProbeReport {
            daemon_up,
            process_alive: self.alive.load(Ordering::SeqCst),
            programs: if daemon_up {
                terractl_core::parse_supervisor_status(&self.status_output.lock().unwrap())
            } else {
                Default::default()
            },
        }
    }

    async fn is_process_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    async fn is_pattern_running(&self, _pattern: &str) -> bool {
        self.scheduler_running.load(Ordering::SeqCst)
    }
}

/// Disk probe with fixed totals, or a fixed error.
pub struct MockDisk {
    pub result: Result<(u64, u64), String>,
}

impl DiskProbe for MockDisk {
    fn usage(&self, _path: &Path) -> Result<DiskUsage, String> {
        self.result
            .clone()
            .map(|(total, free)| DiskUsage::from_totals(total, free))
    }
}

pub fn ok(stdout: &str) -> CommandOutput {
    CommandOutput {
        success: true,
        exit_code: Some(0),
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

pub fn failed(stdout: &str, stderr: &str) -> CommandOutput {
    CommandOutput {
        success: false,
        exit_code: Some(1),
        stdout: stdout.to_string(),
        stderr: stderr.to_string(),
    }
}

pub struct Harness {
    pub tmp: TempDir,
    pub runner: Arc<MockRunner>,
    pub probe: Arc<MockProbe>,
    pub core: AppCore,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_disk(Ok((100 * 1024 * 1024 * 1024, 50 * 1024 * 1024 * 1024)))
    }

    pub fn with_disk(disk: Result<(u64, u64), String>) -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let layout = ServerLayout::under(tmp.path());
        for dir in [
            &layout.dirs.worlds,
            &layout.dirs.backups,
            &layout.dirs.logs,
            &layout.dirs.config,
        ] {
            std::fs::create_dir_all(dir).unwrap();
        }

        let runner = Arc::new(MockRunner::default());
        let probe = Arc::new(MockProbe::default());
        let ports = CorePorts {
            runner: runner.clone(),
            probe: probe.clone(),
            disk: Arc::new(MockDisk { result: disk }),
            archives: Arc::new(NoopArchiveLister),
        };
        let settings = ServerSettings {
            world_name: "Alpha".to_string(),
            ..ServerSettings::default()
        };
        let core = AppCore::new(layout, settings, ports);

        Self {
            tmp,
            runner,
            probe,
            core,
        }
    }

    pub fn world(&self, name: &str) {
        std::fs::write(self.core.layout().dirs.world_file(name), b"world-data").unwrap();
    }

    pub fn backup(&self, filename: &str) {
        std::fs::write(self.core.layout().dirs.backup_file(filename), b"archive").unwrap();
    }
}
