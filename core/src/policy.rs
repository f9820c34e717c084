//! Which request fields a front-end should offer for a given command.
//!
//! The builder ignores disabled flags on its own; this table only tells a
//! presentation layer what to grey out.

use crate::AnalysisCommand;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldState {
    Disabled,
    Optional,
    Required,
}

impl FieldState {
    pub fn is_enabled(self) -> bool {
        self != FieldState::Disabled
    }
}

impl fmt::Display for FieldState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldState::Disabled => "disabled",
            FieldState::Optional => "optional",
            FieldState::Required => "required",
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldPolicy {
    pub command: AnalysisCommand,
    pub offset_flag: bool,
    pub long_listing: bool,
    pub recursive: bool,
    pub compute_hash: bool,
    pub entry_field: FieldState,
}

impl FieldPolicy {
    /// Enablement for `command`, given whether the `-o` box is currently checked.
    pub fn for_command(command: AnalysisCommand, offset_checked: bool) -> Self {
        let offset_active = offset_checked && command.allows_offset();

        let entry_field = if command.requires_entry() || offset_active {
            FieldState::Required
        } else if command == AnalysisCommand::Fls {
            FieldState::Optional
        } else {
            FieldState::Disabled
        };

        Self {
            command,
            offset_flag: command.allows_offset(),
            long_listing: command.allows_listing_flags(),
            recursive: command.allows_listing_flags(),
            compute_hash: command.allows_hash(),
            entry_field,
        }
    }

    /// Policy rows for every command, in menu order.
    pub fn table(offset_checked: bool) -> Vec<FieldPolicy> {
        AnalysisCommand::ALL
            .into_iter()
            .map(|cmd| FieldPolicy::for_command(cmd, offset_checked))
            .collect()
    }
}
