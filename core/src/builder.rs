//! Argument assembly for the analyzer script.
//!
//! Token order is fixed: launcher, command, `-d`, `-o`, `-l`, `-r`, `-h`,
//! image, then the optional entry number. The analyzer's argument parser
//! depends on it.

use crate::{AnalysisCommand, AnalysisRequest, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_INTERPRETER: &str = "python";
pub const DEFAULT_SCRIPT: &str = "exfat_dump.py";

/// The interpreter and script that prefix every command line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Launcher {
    pub interpreter: String,
    pub script_path: PathBuf,
}

impl Launcher {
    pub fn new(interpreter: impl Into<String>, script_path: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.into(),
            script_path: script_path.into(),
        }
    }
}

impl Default for Launcher {
    fn default() -> Self {
        Self::new(DEFAULT_INTERPRETER, DEFAULT_SCRIPT)
    }
}

/// A finished argv. Only the builder creates one.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CommandLine {
    tokens: Vec<String>,
}

impl CommandLine {
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn program(&self) -> &str {
        &self.tokens[0]
    }

    pub fn args(&self) -> &[String] {
        &self.tokens[1..]
    }

    /// The script token, always second.
    pub fn script(&self) -> &str {
        &self.tokens[1]
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&shell_words::join(&self.tokens))
    }
}

pub struct CommandBuilder {
    launcher: Launcher,
}

impl CommandBuilder {
    pub fn new(launcher: Launcher) -> Self {
        Self { launcher }
    }

    pub fn launcher(&self) -> &Launcher {
        &self.launcher
    }

    pub fn build(&self, request: &AnalysisRequest) -> Result<CommandLine, ValidationError> {
        let image = request.image().ok_or(ValidationError::MissingImage)?;

        if request.debug_level > 2 {
            return Err(ValidationError::DebugLevelOutOfRange(request.debug_level));
        }

        let command = request.command;
        let mut tokens = vec![
            self.launcher.interpreter.clone(),
            self.launcher.script_path.to_string_lossy().into_owned(),
            command.name().to_string(),
        ];

        if request.debug_level > 0 {
            tokens.push("-d".to_string());
            tokens.push(request.debug_level.to_string());
        }

        let offset_in_effect = request.offset_in_effect();
        if offset_in_effect {
            let offset = request.numeric_value().ok_or(ValidationError::OffsetNotNumeric)?;
            tokens.push("-o".to_string());
            tokens.push(offset.to_string());
        }

        if request.long_listing && command.allows_listing_flags() {
            tokens.push("-l".to_string());
        }
        if request.recursive && command.allows_listing_flags() {
            tokens.push("-r".to_string());
        }
        if request.compute_hash && command.allows_hash() {
            tokens.push("-h".to_string());
        }

        tokens.push(image.to_string());

        // The value field is either the -o offset or a trailing entry, never both.
        if !offset_in_effect {
            if command.requires_entry() {
                let entry = request.numeric_value().ok_or(ValidationError::EntryRequired)?;
                tokens.push(entry.to_string());
            } else if command == AnalysisCommand::Fls {
                if let Some(entry) = request.numeric_value() {
                    tokens.push(entry.to_string());
                }
            }
        }

        Ok(CommandLine { tokens })
    }
}

impl Default for CommandBuilder {
    fn default() -> Self {
        Self::new(Launcher::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLAGS: [&str; 5] = ["-d", "-o", "-l", "-r", "-h"];

    fn build(request: &AnalysisRequest) -> Result<CommandLine, ValidationError> {
        CommandBuilder::default().build(request)
    }

    fn tokens(line: &CommandLine) -> Vec<&str> {
        line.tokens().iter().map(String::as_str).collect()
    }

    #[test]
    fn test_no_trailing_value_without_entry_for_optional_commands() {
        for cmd in [AnalysisCommand::Mmls, AnalysisCommand::Fls, AnalysisCommand::Fsstat] {
            let line = build(&AnalysisRequest::new(cmd, "disk.img")).unwrap();
            assert_eq!(tokens(&line), vec!["python", "exfat_dump.py", cmd.name(), "disk.img"]);
        }
    }

    #[test]
    fn test_mmls_never_emits_offset() {
        let request = AnalysisRequest::new(AnalysisCommand::Mmls, "disk.img")
            .with_offset_flag(true)
            .with_value("2048");
        let line = build(&request).unwrap();
        assert!(!line.contains("-o"));
        assert!(!line.contains("2048"));
    }

    #[test]
    fn test_mmls_offset_without_value_is_not_an_error() {
        let request = AnalysisRequest::new(AnalysisCommand::Mmls, "disk.img").with_offset_flag(true);
        assert!(build(&request).is_ok());
    }

    #[test]
    fn test_icat_requires_entry() {
        let request = AnalysisRequest::new(AnalysisCommand::Icat, "disk.img").with_value("");
        assert_eq!(build(&request).unwrap_err(), ValidationError::EntryRequired);

        let request = AnalysisRequest::new(AnalysisCommand::Icat, "disk.img");
        assert_eq!(build(&request).unwrap_err(), ValidationError::EntryRequired);
    }

    #[test]
    fn test_istat_rejects_non_numeric_entry() {
        let request = AnalysisRequest::new(AnalysisCommand::Istat, "disk.img").with_value("abc");
        assert_eq!(build(&request).unwrap_err(), ValidationError::EntryRequired);
    }

    #[test]
    fn test_fls_offset_consumes_value() {
        let request = AnalysisRequest::new(AnalysisCommand::Fls, "disk.img")
            .with_offset_flag(true)
            .with_value("512");
        let line = build(&request).unwrap();
        assert_eq!(
            tokens(&line),
            vec!["python", "exfat_dump.py", "fls", "-o", "512", "disk.img"]
        );
        assert_eq!(line.tokens().last().map(String::as_str), Some("disk.img"));
    }

    #[test]
    fn test_istat_plain_entry() {
        let request = AnalysisRequest::new(AnalysisCommand::Istat, "disk.img").with_value("42");
        let line = build(&request).unwrap();
        assert_eq!(
            tokens(&line),
            vec!["python", "exfat_dump.py", "istat", "disk.img", "42"]
        );
        for flag in FLAGS {
            assert!(!line.contains(flag), "unexpected {}", flag);
        }
    }

    #[test]
    fn test_offset_requires_numeric_value() {
        for value in [None, Some(""), Some("12k")] {
            let mut request = AnalysisRequest::new(AnalysisCommand::Fsstat, "disk.img").with_offset_flag(true);
            request.entry_or_offset = value.map(String::from);
            assert_eq!(build(&request).unwrap_err(), ValidationError::OffsetNotNumeric);
        }
    }

    #[test]
    fn test_missing_image_rejected_first() {
        let request = AnalysisRequest::new(AnalysisCommand::Icat, "  ");
        assert_eq!(build(&request).unwrap_err(), ValidationError::MissingImage);
    }

    #[test]
    fn test_debug_level_out_of_range() {
        let request = AnalysisRequest::new(AnalysisCommand::Mmls, "disk.img").with_debug_level(3);
        assert_eq!(build(&request).unwrap_err(), ValidationError::DebugLevelOutOfRange(3));
    }

    #[test]
    fn test_full_flag_order_for_fls() {
        let request = AnalysisRequest::new(AnalysisCommand::Fls, "disk.img")
            .with_debug_level(2)
            .with_offset_flag(true)
            .with_value("128")
            .with_long_listing(true)
            .with_recursive(true)
            .with_hash(true);
        let line = build(&request).unwrap();
        assert_eq!(
            tokens(&line),
            vec!["python", "exfat_dump.py", "fls", "-d", "2", "-o", "128", "-l", "-r", "disk.img"]
        );
    }

    #[test]
    fn test_icat_hash_and_entry() {
        let request = AnalysisRequest::new(AnalysisCommand::Icat, "disk.img")
            .with_value("7")
            .with_hash(true)
            .with_long_listing(true)
            .with_debug_level(1);
        let line = build(&request).unwrap();
        assert_eq!(
            tokens(&line),
            vec!["python", "exfat_dump.py", "icat", "-d", "1", "-h", "disk.img", "7"]
        );
    }

    #[test]
    fn test_icat_with_offset_skips_entry() {
        let request = AnalysisRequest::new(AnalysisCommand::Icat, "disk.img")
            .with_offset_flag(true)
            .with_value("4096");
        let line = build(&request).unwrap();
        assert_eq!(
            tokens(&line),
            vec!["python", "exfat_dump.py", "icat", "-o", "4096", "disk.img"]
        );
    }

    #[test]
    fn test_fls_optional_entry_appended_when_numeric() {
        let request = AnalysisRequest::new(AnalysisCommand::Fls, "disk.img").with_value("5");
        let line = build(&request).unwrap();
        assert_eq!(line.tokens().last().map(String::as_str), Some("5"));

        let request = AnalysisRequest::new(AnalysisCommand::Fls, "disk.img").with_value("root");
        let line = build(&request).unwrap();
        assert_eq!(line.tokens().last().map(String::as_str), Some("disk.img"));
    }

    #[test]
    fn test_fsstat_ignores_value_without_offset() {
        let request = AnalysisRequest::new(AnalysisCommand::Fsstat, "disk.img").with_value("99");
        let line = build(&request).unwrap();
        assert!(!line.contains("99"));
    }

    #[test]
    fn test_custom_launcher_and_trimmed_inputs() {
        let builder = CommandBuilder::new(Launcher::new("python3", "/opt/tools/exfat_dump.py"));
        let request = AnalysisRequest::new(AnalysisCommand::Istat, "  C:\\cases\\exfat12.001 ").with_value(" 3 ");
        let line = builder.build(&request).unwrap();
        assert_eq!(line.program(), "python3");
        assert_eq!(line.script(), "/opt/tools/exfat_dump.py");
        assert_eq!(line.args().last().map(String::as_str), Some("3"));
        assert!(line.contains("C:\\cases\\exfat12.001"));
    }

    #[test]
    fn test_display_quotes_tokens_with_spaces() {
        let request = AnalysisRequest::new(AnalysisCommand::Mmls, "my disk.img");
        let line = build(&request).unwrap();
        assert_eq!(line.to_string(), "python exfat_dump.py mmls 'my disk.img'");
    }
}
