/// Test doubles: a throwaway analyzer script and a recording executor
use crate::{AnalysisExecutor, CommandLine, ExecutionOutcome, Launcher};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Shell script standing in for `exfat_dump.py`, removed on drop
pub struct StubAnalyzer {
    dir: TempDir,
    script: PathBuf,
}

impl StubAnalyzer {
    pub fn new(body: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("exfat_dump.sh");
        std::fs::write(&script, format!("#!/bin/sh\n{}", body)).unwrap();
        Self { dir, script }
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn script(&self) -> &Path {
        &self.script
    }

    /// Runs the stub through `sh` so it needs no exec bit.
    pub fn launcher(&self) -> Launcher {
        Launcher::new("sh", &self.script)
    }
}

/// Executor that never spawns anything
pub struct RecordingExecutor {
    outcome: ExecutionOutcome,
    calls: Arc<Mutex<Vec<CommandLine>>>,
}

impl RecordingExecutor {
    pub fn returning(outcome: ExecutionOutcome) -> Self {
        Self {
            outcome,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_call(&self) -> Option<CommandLine> {
        self.calls.lock().unwrap().last().cloned()
    }
}

#[async_trait::async_trait]
impl AnalysisExecutor for RecordingExecutor {
    async fn execute(&self, command_line: &CommandLine) -> ExecutionOutcome {
        self.calls.lock().unwrap().push(command_line.clone());
        self.outcome.clone()
    }
}
