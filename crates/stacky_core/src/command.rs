//! Chat slash-commands selecting which context a turn carries.

use std::str::FromStr;

use crate::error::StackyError;

/// `/c` debug context, `/h` history, `/ch` or `/hc` both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatCommand {
    pub debug_context: bool,
    pub history: bool,
}

impl ChatCommand {
    pub const VALID: [&'static str; 4] = ["c", "h", "ch", "hc"];

    pub fn as_str(&self) -> &'static str {
        match (self.debug_context, self.history) {
            (true, true) => "ch",
            (true, false) => "c",
            _ => "h",
        }
    }
}

impl FromStr for ChatCommand {
    type Err = StackyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().trim_start_matches('/');
        if !Self::VALID.contains(&name) {
            return Err(StackyError::InvalidCommand(s.to_string()));
        }
        Ok(Self {
            debug_context: name.contains('c'),
            history: name.contains('h'),
        })
    }
}

impl std::fmt::Display for ChatCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}", self.as_str())
    }
}
