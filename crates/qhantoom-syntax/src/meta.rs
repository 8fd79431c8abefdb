//! Language metadata consumed by editor integrations.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::State;

/// How an editor computes foldable regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FoldStrategy {
    /// Regions between matching `{}` or `[]` pairs
    Brace,
}

impl FoldStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FoldStrategy::Brace => "brace",
        }
    }
}

/// Immutable per-language constants.
#[derive(Debug, Clone)]
pub struct Meta {
    /// States in which automatic indentation leaves lines alone
    pub dont_indent_states: &'static [State],
    /// Line comment marker, used by toggle-comment commands
    pub line_comment: &'static str,
    /// Block comment opener
    pub block_comment_start: &'static str,
    /// Block comment closer
    pub block_comment_end: &'static str,
    /// Input after which the current line is re-indented
    pub electric_input: &'static Regex,
    /// Folding strategy name
    pub fold: FoldStrategy,
}

lazy_static! {
    static ref LONE_CLOSING_BRACE: Regex = Regex::new(r"^\s*\}$").unwrap();
}

impl Meta {
    /// Returns the Qhantoom metadata.
    pub fn qhantoom() -> Self {
        Self {
            dont_indent_states: &[State::Comment],
            line_comment: "//",
            block_comment_start: "/*",
            block_comment_end: "*/",
            electric_input: &LONE_CLOSING_BRACE,
            fold: FoldStrategy::Brace,
        }
    }

    /// Returns true if typing produced a line that should be re-indented.
    pub fn is_electric(&self, line: &str) -> bool {
        self.electric_input.is_match(line)
    }

    /// Returns true if lines starting in `state` take part in auto-indent.
    pub fn indents_in(&self, state: State) -> bool {
        !self.dont_indent_states.contains(&state)
    }

    /// Prefixes `line` with the line comment marker.
    pub fn comment_line(&self, line: &str) -> String {
        let body = line.trim_start();
        let indent = &line[..line.len() - body.len()];
        format!("{indent}{} {body}", self.line_comment)
    }

    /// Removes a leading line comment marker, if present.
    pub fn uncomment_line(&self, line: &str) -> Option<String> {
        let body = line.trim_start();
        let indent = &line[..line.len() - body.len()];
        let rest = body.strip_prefix(self.line_comment)?;
        let rest = rest.strip_prefix(' ').unwrap_or(rest);
        Some(format!("{indent}{rest}"))
    }

    /// Wraps `text` in block comment markers.
    pub fn wrap_block_comment(&self, text: &str) -> String {
        format!("{}{text}{}", self.block_comment_start, self.block_comment_end)
    }
}

impl Default for Meta {
    fn default() -> Self {
        Self::qhantoom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_electric_input() {
        let meta = Meta::qhantoom();
        assert!(meta.is_electric("}"));
        assert!(meta.is_electric("\t  }"));
        assert!(!meta.is_electric("} else {"));
        assert!(!meta.is_electric("x }"));
    }

    #[test]
    fn test_comment_state_is_not_indented() {
        let meta = Meta::qhantoom();
        assert!(!meta.indents_in(State::Comment));
        assert!(meta.indents_in(State::Start));
        assert!(meta.indents_in(State::String));
    }

    #[test]
    fn test_toggle_line_comment() {
        let meta = Meta::qhantoom();
        let commented = meta.comment_line("\tval x = 1;");
        assert_eq!(commented, "\t// val x = 1;");
        assert_eq!(meta.uncomment_line(&commented).unwrap(), "\tval x = 1;");
        assert!(meta.uncomment_line("val x = 1;").is_none());
    }

    #[test]
    fn test_block_comment_markers() {
        let meta = Meta::qhantoom();
        assert_eq!(meta.wrap_block_comment(" note "), "/* note */");
        assert_eq!(meta.fold.as_str(), "brace");
    }
}
