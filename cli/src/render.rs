//! Text rendering of analyzer outcomes and the field table.

use exdump_core::{AnalysisRun, CommandLine, ExecutionOutcome, FieldPolicy, Launcher};
use std::time::Duration;

/// Shown before the analyzer starts; a run can take minutes.
pub fn executing_banner(command_line: &CommandLine) -> String {
    format!("Executing: {}\n\nProcessing...\n", command_line)
}

pub fn render_run(run: &AnalysisRun, launcher: &Launcher) -> String {
    match &run.outcome {
        ExecutionOutcome::Success { stdout } => {
            format!("--- COMMAND EXECUTED SUCCESSFULLY ---\n\n{}", stdout)
        }
        ExecutionOutcome::ProcessError {
            exit_code,
            stdout,
            stderr,
        } => {
            let code = match exit_code {
                Some(code) => code.to_string(),
                None => "terminated by signal".to_string(),
            };
            format!(
                "--- ERROR EXECUTING COMMAND (Return Code: {})---\nCommand: {}\n\nSTDERR:\n{}\n\nSTDOUT (Partial):\n{}\n",
                code,
                run.command_line,
                stderr.trim(),
                stdout.trim()
            )
        }
        ExecutionOutcome::Timeout { elapsed_limit } => {
            format!("ERROR: Command timed out after {}.\n", describe_duration(*elapsed_limit))
        }
        ExecutionOutcome::ExecutableNotFound { program } => format!(
            "FATAL ERROR: Could not find Python interpreter or the script ({}).\nCheck if '{}' is in your PATH or if '{}' exists in the correct location.\n",
            program,
            launcher.interpreter,
            launcher.script_path.display()
        ),
        ExecutionOutcome::UnexpectedFailure { message } => {
            format!("UNEXPECTED ERROR:\n{}\n", message)
        }
    }
}

fn describe_duration(limit: Duration) -> String {
    let secs = limit.as_secs();
    if secs >= 60 && secs % 60 == 0 {
        let minutes = secs / 60;
        format!("{} minute{}", minutes, if minutes == 1 { "" } else { "s" })
    } else if secs > 0 && limit.subsec_nanos() == 0 {
        format!("{} second{}", secs, if secs == 1 { "" } else { "s" })
    } else {
        format!("{:.1} seconds", limit.as_secs_f64())
    }
}

pub fn render_field_table(rows: &[FieldPolicy]) -> String {
    let yes_no = |allowed: bool| if allowed { "yes" } else { "no" };

    let mut out = format!("{:<8} {:<4} {:<6} {:<4} {}\n", "COMMAND", "-o", "-l/-r", "-h", "ENTRY/OFFSET");
    for row in rows {
        out.push_str(&format!(
            "{:<8} {:<4} {:<6} {:<4} {}\n",
            row.command.name(),
            yes_no(row.offset_flag),
            yes_no(row.long_listing && row.recursive),
            yes_no(row.compute_hash),
            row.entry_field
        ));
    }
    out
}
