use crate::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Analyzer subcommands, named after their Sleuth Kit counterparts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisCommand {
    /// Partition layout
    Mmls,
    /// File and directory listing
    Fls,
    /// Filesystem statistics
    Fsstat,
    /// File content by entry number
    Icat,
    /// Entry metadata by entry number
    Istat,
}

impl AnalysisCommand {
    pub const ALL: [AnalysisCommand; 5] = [
        AnalysisCommand::Mmls,
        AnalysisCommand::Fls,
        AnalysisCommand::Fsstat,
        AnalysisCommand::Icat,
        AnalysisCommand::Istat,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AnalysisCommand::Mmls => "mmls",
            AnalysisCommand::Fls => "fls",
            AnalysisCommand::Fsstat => "fsstat",
            AnalysisCommand::Icat => "icat",
            AnalysisCommand::Istat => "istat",
        }
    }

    /// Whether `-o` may be emitted for this command.
    pub fn allows_offset(self) -> bool {
        self != AnalysisCommand::Mmls
    }

    /// Whether `-l` and `-r` may be emitted for this command.
    pub fn allows_listing_flags(self) -> bool {
        self == AnalysisCommand::Fls
    }

    /// Whether `-h` may be emitted for this command.
    pub fn allows_hash(self) -> bool {
        self == AnalysisCommand::Icat
    }

    /// Commands that address a single directory entry and cannot run without one.
    pub fn requires_entry(self) -> bool {
        matches!(self, AnalysisCommand::Icat | AnalysisCommand::Istat)
    }
}

impl fmt::Display for AnalysisCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AnalysisCommand {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        AnalysisCommand::ALL
            .into_iter()
            .find(|cmd| cmd.name() == wanted)
            .ok_or_else(|| ValidationError::UnknownCommand(s.to_string()))
    }
}

/// Field values captured for a single analyzer run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub image_path: String,
    pub command: AnalysisCommand,
    /// Entry number or partition offset, depending on `use_offset_flag`.
    pub entry_or_offset: Option<String>,
    pub use_offset_flag: bool,
    pub long_listing: bool,
    pub recursive: bool,
    pub compute_hash: bool,
    pub debug_level: u8,
}

impl AnalysisRequest {
    pub fn new(command: AnalysisCommand, image_path: impl Into<String>) -> Self {
        Self {
            image_path: image_path.into(),
            command,
            entry_or_offset: None,
            use_offset_flag: false,
            long_listing: false,
            recursive: false,
            compute_hash: false,
            debug_level: 0,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.entry_or_offset = Some(value.into());
        self
    }

    pub fn with_offset_flag(mut self, enabled: bool) -> Self {
        self.use_offset_flag = enabled;
        self
    }

    pub fn with_long_listing(mut self, enabled: bool) -> Self {
        self.long_listing = enabled;
        self
    }

    pub fn with_recursive(mut self, enabled: bool) -> Self {
        self.recursive = enabled;
        self
    }

    pub fn with_hash(mut self, enabled: bool) -> Self {
        self.compute_hash = enabled;
        self
    }

    pub fn with_debug_level(mut self, level: u8) -> Self {
        self.debug_level = level;
        self
    }

    /// Trimmed image path, `None` when blank.
    pub fn image(&self) -> Option<&str> {
        let image = self.image_path.trim();
        (!image.is_empty()).then_some(image)
    }

    /// Trimmed entry/offset value if it is a non-negative integer string.
    pub fn numeric_value(&self) -> Option<&str> {
        self.entry_or_offset
            .as_deref()
            .map(str::trim)
            .filter(|value| is_unsigned_integer(value))
    }

    /// True when `-o` is both requested and allowed for the command.
    pub fn offset_in_effect(&self) -> bool {
        self.use_offset_flag && self.command.allows_offset()
    }
}

/// One or more ASCII digits, nothing else.
pub fn is_unsigned_integer(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}
