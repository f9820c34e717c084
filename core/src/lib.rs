pub mod analysis;
pub mod builder;
pub mod config;
pub mod error;
pub mod executor;
pub mod policy;
pub mod request;

#[cfg(test)]
pub(crate) mod test_utils;

pub use analysis::{AnalysisManager, AnalysisRun};
pub use builder::{CommandBuilder, CommandLine, Launcher};
pub use config::{ConfigOverrides, ConfigSource, ExdumpConfig};
pub use error::{ExdumpError, ValidationError};
pub use executor::{AnalysisExecutor, ExecutionOutcome, ProcessExecutor, DEFAULT_TIMEOUT};
pub use policy::{FieldPolicy, FieldState};
pub use request::{AnalysisCommand, AnalysisRequest};
