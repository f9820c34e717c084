use crate::{
    AnalysisExecutor, AnalysisRequest, CommandBuilder, CommandLine, ExecutionOutcome, ExdumpConfig,
    Launcher, ProcessExecutor, ValidationError,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// One finished analyzer invocation.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRun {
    pub command_line: CommandLine,
    pub outcome: ExecutionOutcome,
}

pub struct AnalysisManager {
    builder: CommandBuilder,
    executor: Arc<dyn AnalysisExecutor>,
}

impl AnalysisManager {
    pub fn new(launcher: Launcher, executor: Arc<dyn AnalysisExecutor>) -> Self {
        Self {
            builder: CommandBuilder::new(launcher),
            executor,
        }
    }

    /// Manager backed by a real [`ProcessExecutor`] configured from `config`.
    pub fn from_config(config: &ExdumpConfig) -> Self {
        let executor = ProcessExecutor::new(config.timeout())
            .with_working_directory(config.working_directory.clone())
            .with_environment(config.environment.clone());
        Self::new(config.launcher(), Arc::new(executor))
    }

    pub fn launcher(&self) -> &Launcher {
        self.builder.launcher()
    }

    pub fn preview(&self, request: &AnalysisRequest) -> Result<CommandLine, ValidationError> {
        self.builder.build(request)
    }

    /// Builds and runs. Validation failures return before anything is spawned.
    pub async fn run(&self, request: &AnalysisRequest) -> Result<AnalysisRun, ValidationError> {
        let command_line = self.builder.build(request)?;
        info!(command = %command_line, "running analyzer");

        let outcome = self.executor.execute(&command_line).await;
        Ok(AnalysisRun {
            command_line,
            outcome,
        })
    }
}
