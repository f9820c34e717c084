//! Runs a built command line as a child process.
//!
//! Every failure is folded into an [`ExecutionOutcome`]; nothing here returns
//! an error to the caller.

use crate::CommandLine;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    Success {
        stdout: String,
    },
    ProcessError {
        /// `None` when the analyzer was ended by a signal.
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },
    Timeout {
        elapsed_limit: Duration,
    },
    ExecutableNotFound {
        program: String,
    },
    UnexpectedFailure {
        message: String,
    },
}

impl ExecutionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionOutcome::Success { .. })
    }
}

#[async_trait]
pub trait AnalysisExecutor: Send + Sync {
    async fn execute(&self, command_line: &CommandLine) -> ExecutionOutcome;
}

/// Spawns the analyzer with tokio and waits for it under a deadline.
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    timeout: Duration,
    working_directory: Option<PathBuf>,
    environment: HashMap<String, String>,
}

impl ProcessExecutor {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            working_directory: None,
            environment: HashMap::new(),
        }
    }

    pub fn with_working_directory(mut self, dir: Option<PathBuf>) -> Self {
        self.working_directory = dir;
        self
    }

    pub fn with_environment(mut self, environment: HashMap<String, String>) -> Self {
        self.environment = environment;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Name of the interpreter or script that cannot be found, if any.
    ///
    /// The interpreter is looked up the way the child will see it: through a
    /// configured `PATH` when there is one, relative to the working directory.
    fn missing_program(&self, command_line: &CommandLine) -> Option<String> {
        let program = command_line.program();
        let cwd = match &self.working_directory {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        };
        let found = match self.environment.get("PATH") {
            Some(path) => which::which_in(program, Some(path), &cwd).is_ok(),
            None => which::which_in(program, std::env::var_os("PATH"), &cwd).is_ok(),
        };
        if !found {
            return Some(program.to_string());
        }

        let script = Path::new(command_line.script());
        let resolved = match &self.working_directory {
            Some(dir) if script.is_relative() => dir.join(script),
            _ => script.to_path_buf(),
        };
        if !resolved.is_file() {
            return Some(command_line.script().to_string());
        }

        None
    }

    fn command(&self, command_line: &CommandLine) -> Command {
        let mut cmd = Command::new(command_line.program());
        cmd.args(command_line.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        for (key, value) in &self.environment {
            cmd.env(key, value);
        }

        if let Some(ref dir) = self.working_directory {
            cmd.current_dir(dir);
        }

        cmd
    }
}

impl Default for ProcessExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

#[async_trait]
impl AnalysisExecutor for ProcessExecutor {
    async fn execute(&self, command_line: &CommandLine) -> ExecutionOutcome {
        if let Some(ref dir) = self.working_directory {
            if !dir.is_dir() {
                warn!(dir = %dir.display(), "working directory not found");
                return ExecutionOutcome::UnexpectedFailure {
                    message: format!("Working directory not found: {}", dir.display()),
                };
            }
        }

        if let Some(program) = self.missing_program(command_line) {
            warn!(%program, "analyzer interpreter or script not found");
            return ExecutionOutcome::ExecutableNotFound { program };
        }

        let start = Instant::now();
        let mut child = match self.command(command_line).spawn() {
            Ok(child) => child,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(program = command_line.program(), "spawn failed: {}", e);
                return ExecutionOutcome::ExecutableNotFound {
                    program: command_line.program().to_string(),
                };
            }
            Err(e) => {
                return ExecutionOutcome::UnexpectedFailure {
                    message: format!("Failed to start {}: {}", command_line.program(), e),
                };
            }
        };
        debug!(pid = ?child.id(), "analyzer started");

        let (mut stdout_task, mut stderr_task) = match spawn_readers(&mut child) {
            Ok(tasks) => tasks,
            Err(e) => {
                terminate(&mut child).await;
                return ExecutionOutcome::UnexpectedFailure { message: e.to_string() };
            }
        };

        let waited = tokio::time::timeout(
            self.timeout,
            wait_and_collect(&mut child, &mut stdout_task, &mut stderr_task),
        )
        .await;

        match waited {
            Ok(Ok((status, stdout, stderr))) => {
                info!(
                    code = ?status.code(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "analyzer finished"
                );
                classify(status, stdout, stderr)
            }
            Ok(Err(e)) => {
                stdout_task.abort();
                stderr_task.abort();
                terminate(&mut child).await;
                ExecutionOutcome::UnexpectedFailure {
                    message: format!("Failed to collect analyzer output: {}", e),
                }
            }
            Err(_) => {
                warn!(limit_secs = self.timeout.as_secs_f64(), "analyzer timed out, killing it");
                stdout_task.abort();
                stderr_task.abort();
                terminate(&mut child).await;
                ExecutionOutcome::Timeout {
                    elapsed_limit: self.timeout,
                }
            }
        }
    }
}

type Reader = JoinHandle<io::Result<Vec<u8>>>;

fn spawn_readers(child: &mut Child) -> io::Result<(Reader, Reader)> {
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "Failed to open stdout"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "Failed to open stderr"))?;

    Ok((tokio::spawn(read_stream(stdout)), tokio::spawn(read_stream(stderr))))
}

async fn read_stream<R: AsyncRead + Unpin>(mut stream: R) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await?;
    Ok(buf)
}

async fn wait_and_collect(
    child: &mut Child,
    stdout: &mut Reader,
    stderr: &mut Reader,
) -> io::Result<(ExitStatus, Vec<u8>, Vec<u8>)> {
    let status = child.wait().await?;
    let stdout = join_reader(stdout).await?;
    let stderr = join_reader(stderr).await?;
    Ok((status, stdout, stderr))
}

async fn join_reader(reader: &mut Reader) -> io::Result<Vec<u8>> {
    reader
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
}

/// Kill and reap so no analyzer outlives the call.
async fn terminate(child: &mut Child) {
    if let Err(e) = child.kill().await {
        warn!("Failed to kill analyzer: {}", e);
    }
}

fn classify(status: ExitStatus, stdout: Vec<u8>, stderr: Vec<u8>) -> ExecutionOutcome {
    let stdout = String::from_utf8_lossy(&stdout).into_owned();
    let stderr = String::from_utf8_lossy(&stderr).into_owned();

    if status.success() {
        if !stderr.is_empty() {
            debug!("analyzer stderr:\n{}", stderr);
        }
        ExecutionOutcome::Success { stdout }
    } else {
        ExecutionOutcome::ProcessError {
            exit_code: status.code(),
            stdout,
            stderr,
        }
    }
}
