//! Process exit codes for `exdump`.
//!
//! Scripts driving a batch of images can tell an analyzer failure from a
//! bad invocation without parsing output.

use exdump_core::ExecutionOutcome;
use std::process::{ExitCode, Termination};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExdumpExit {
    /// Analyzer exited 0, or nothing needed running.
    Success = 0,
    /// Configuration, IO or an unexpected execution failure.
    Error = 1,
    /// The request failed validation; nothing was spawned.
    InvalidInput = 2,
    /// The analyzer exited non-zero.
    AnalyzerFailed = 3,
    /// The analyzer was killed at the deadline.
    TimedOut = 4,
    /// Interpreter or script missing.
    NotFound = 5,
}

impl ExdumpExit {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl From<&ExecutionOutcome> for ExdumpExit {
    fn from(outcome: &ExecutionOutcome) -> Self {
        match outcome {
            ExecutionOutcome::Success { .. } => Self::Success,
            ExecutionOutcome::ProcessError { .. } => Self::AnalyzerFailed,
            ExecutionOutcome::Timeout { .. } => Self::TimedOut,
            ExecutionOutcome::ExecutableNotFound { .. } => Self::NotFound,
            ExecutionOutcome::UnexpectedFailure { .. } => Self::Error,
        }
    }
}

impl Termination for ExdumpExit {
    fn report(self) -> ExitCode {
        ExitCode::from(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_each_outcome_maps_to_its_code() {
        let cases = [
            (ExecutionOutcome::Success { stdout: String::new() }, ExdumpExit::Success),
            (
                ExecutionOutcome::ProcessError { exit_code: Some(1), stdout: String::new(), stderr: String::new() },
                ExdumpExit::AnalyzerFailed,
            ),
            (ExecutionOutcome::Timeout { elapsed_limit: Duration::from_secs(1) }, ExdumpExit::TimedOut),
            (ExecutionOutcome::ExecutableNotFound { program: "python".to_string() }, ExdumpExit::NotFound),
            (
                ExecutionOutcome::UnexpectedFailure { message: "Exec format error".to_string() },
                ExdumpExit::Error,
            ),
        ];
        for (outcome, expected) in &cases {
            assert_eq!(ExdumpExit::from(outcome), *expected, "{:?}", outcome);
        }
    }

    #[test]
    fn test_codes_are_distinct() {
        let all = [
            ExdumpExit::Success,
            ExdumpExit::Error,
            ExdumpExit::InvalidInput,
            ExdumpExit::AnalyzerFailed,
            ExdumpExit::TimedOut,
            ExdumpExit::NotFound,
        ];
        let mut codes: Vec<u8> = all.iter().map(|e| e.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes, vec![0, 1, 2, 3, 4, 5]);
    }
}
