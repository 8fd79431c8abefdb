//! # Qhantoom Syntax
//!
//! Rule-driven syntax highlighting for the Qhantoom language.
//!
//! ## How It Works
//!
//! A [`RuleTable`] maps every scanning [`State`] to an ordered list of
//! [`Rule`]s. The [`Scanner`] walks a buffer, tries the rules of the current
//! state in order and commits to the **first** one that matches:
//! - **First match wins**: rule order is part of the language definition
//! - **Line oriented**: patterns see the rest of the current line only
//! - **Total**: input no rule matches is skipped one character at a time
//!
//! ```
//! use qhantoom_syntax::{Label, Scanner, State};
//!
//! let scanner = Scanner::qhantoom();
//! let kinds: Vec<_> = scanner
//!     .scan("val x", State::Start)
//!     .map(|token| token.kind)
//!     .collect();
//!
//! assert_eq!(kinds, vec![Some(Label::Keyword), None, Some(Label::Def)]);
//! ```
//!
//! ## Learning: Lifetimes in Iterators
//!
//! Tokens borrow their text from the scanned buffer (`Token<'a>`), so
//! scanning never copies source text. The borrow checker guarantees the
//! buffer outlives every token handed out by [`Tokens`].

pub mod fold;
pub mod indent;
mod label;
pub mod meta;
pub mod registry;
pub mod rules;
pub mod scanner;
mod state;

pub use fold::{FoldRange, fold_at_line, fold_ranges};
pub use indent::{IndentOptions, LineIndent, line_indents};
pub use label::Label;
pub use meta::{FoldStrategy, Meta};
pub use registry::{LanguageRegistry, Mode, detect_language};
pub use rules::{Pattern, Rule, RuleTable, TokenSpec};
pub use scanner::{Effect, Highlight, ScanCursor, Scanner, Step, Token, Tokens, split_lines};
pub use state::State;

/// Result type for syntax operations
pub type SyntaxResult<T> = Result<T, SyntaxError>;

/// Errors that can occur while configuring highlighting.
///
/// Scanning itself never fails; these cover lookups and table construction.
#[derive(Debug, thiserror::Error)]
pub enum SyntaxError {
    #[error("Unknown language: {0}")]
    UnknownLanguage(String),

    #[error("Unknown scanner state: {0}")]
    UnknownState(String),

    #[error("Invalid pattern for rule {index} in state {state}: {source}")]
    InvalidPattern {
        state: State,
        index: usize,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid rule table: {0}")]
    InvalidTable(String),
}
