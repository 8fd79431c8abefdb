//! Token classifications.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The classification attached to a highlighted token.
///
/// Names follow the style classes an editor theme keys on
/// (`string-2`, `variable-3`, ...). Structural text such as whitespace and
/// brackets carries no label at all (`Option<Label>::None`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Label {
    String,
    #[serde(rename = "string-2")]
    String2,
    Number,
    Keyword,
    Atom,
    Builtin,
    Def,
    Meta,
    Comment,
    Operator,
    Variable,
    #[serde(rename = "variable-3")]
    Variable3,
}

impl Label {
    /// Every label, in declaration order.
    pub const ALL: [Label; 12] = [
        Label::String,
        Label::String2,
        Label::Number,
        Label::Keyword,
        Label::Atom,
        Label::Builtin,
        Label::Def,
        Label::Meta,
        Label::Comment,
        Label::Operator,
        Label::Variable,
        Label::Variable3,
    ];

    /// Returns the style class name for this label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::String => "string",
            Label::String2 => "string-2",
            Label::Number => "number",
            Label::Keyword => "keyword",
            Label::Atom => "atom",
            Label::Builtin => "builtin",
            Label::Def => "def",
            Label::Meta => "meta",
            Label::Comment => "comment",
            Label::Operator => "operator",
            Label::Variable => "variable",
            Label::Variable3 => "variable-3",
        }
    }

    /// Looks a label up by its style class name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|label| label.as_str() == name)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
