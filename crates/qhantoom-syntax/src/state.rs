//! Scanner states.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::SyntaxError;

/// A scanning mode, each with its own rule list.
///
/// `Start` is both the initial state and the state every multi-line
/// construct returns to once it closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    #[default]
    Start,
    String,
    StringRaw,
    StringRawHash,
    Comment,
}

impl State {
    /// Every state, in declaration order.
    pub const ALL: [State; 5] = [
        State::Start,
        State::String,
        State::StringRaw,
        State::StringRawHash,
        State::Comment,
    ];

    /// Returns the name the state is known by in rule tables.
    pub fn as_str(&self) -> &'static str {
        match self {
            State::Start => "start",
            State::String => "string",
            State::StringRaw => "string_raw",
            State::StringRawHash => "string_raw_hash",
            State::Comment => "comment",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for State {
    type Err = SyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| SyntaxError::UnknownState(s.to_string()))
    }
}
