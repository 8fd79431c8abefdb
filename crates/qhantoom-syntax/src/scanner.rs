//! The scanning engine.
//!
//! ## Learning: Pull-Based Iteration
//!
//! [`Scanner::scan`] does no work up front. Each call to `next()` on the
//! returned [`Tokens`] runs at most one rule application, so a caller that
//! only needs the visible part of a buffer simply stops pulling. There is no
//! cancellation protocol: dropping the iterator is enough.

use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};
use std::iter::FusedIterator;
use std::ops::Range;

use crate::rules::RuleTable;
use crate::{Label, State};

/// Indentation bookkeeping requested by the rule that produced a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    #[default]
    None,
    Indent,
    Dedent,
}

/// A classified span of source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token<'a> {
    /// Classification, `None` for unlabeled text
    pub kind: Option<Label>,
    /// The covered source text
    pub text: &'a str,
    /// Start byte offset
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
    /// Scanner state once this token has been consumed
    pub state_after: State,
    /// Indent or dedent flag of the matching rule
    pub effect: Effect,
}

impl Token<'_> {
    /// Returns the byte range covered by the token.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Returns true for the tokens emitted at line ends.
    pub fn is_line_break(&self) -> bool {
        matches!(self.text, "\n" | "\r\n" | "\r")
    }
}

/// Scan position plus the state the next rule lookup uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanCursor {
    pub offset: usize,
    pub state: State,
}

impl ScanCursor {
    pub fn new(offset: usize, state: State) -> Self {
        Self { offset, state }
    }
}

/// The outcome of one rule application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step<'a> {
    /// One token, or one per capture group for splitting rules
    pub tokens: SmallVec<[Token<'a>; 3]>,
    /// Where the next step starts
    pub cursor: ScanCursor,
}

/// Drives a [`RuleTable`] over text.
///
/// # Thread Safety
///
/// A `Scanner` only holds a shared reference to an immutable table. It is
/// `Copy`, and any number of scans over different buffers may run on
/// different threads at once.
#[derive(Debug, Clone, Copy)]
pub struct Scanner<'t> {
    table: &'t RuleTable,
}

impl Scanner<'static> {
    /// Returns a scanner over the shared Qhantoom rule table.
    pub fn qhantoom() -> Self {
        Self::new(RuleTable::shared())
    }
}

impl<'t> Scanner<'t> {
    /// Creates a scanner over a rule table.
    pub fn new(table: &'t RuleTable) -> Self {
        Self { table }
    }

    /// Returns the rule table this scanner runs.
    pub fn table(&self) -> &'t RuleTable {
        self.table
    }

    /// Runs one rule application at `cursor`.
    ///
    /// Returns `None` once the cursor has reached the end of `text` (or does
    /// not point at a character boundary inside it).
    pub fn step<'a>(&self, text: &'a str, cursor: ScanCursor) -> Option<Step<'a>> {
        let ScanCursor { offset, state } = cursor;
        let rest = text.get(offset..).filter(|rest| !rest.is_empty())?;

        let break_len = line_break_len(rest);
        if break_len > 0 {
            let token = Token {
                kind: None,
                text: &rest[..break_len],
                start: offset,
                end: offset + break_len,
                state_after: state,
                effect: Effect::None,
            };
            return Some(Step {
                tokens: smallvec![token],
                cursor: ScanCursor::new(offset + break_len, state),
            });
        }

        let line = current_line(rest);
        for rule in self.table.rules(state) {
            let Some(hit) = rule.apply(line) else { continue };

            let state_after = rule.next.unwrap_or(state);
            let effect = if rule.indent {
                Effect::Indent
            } else if rule.dedent {
                Effect::Dedent
            } else {
                Effect::None
            };

            let tokens = hit
                .parts
                .into_iter()
                .enumerate()
                .map(|(i, (range, kind))| Token {
                    kind,
                    text: &line[range.clone()],
                    start: offset + range.start,
                    end: offset + range.end,
                    state_after,
                    effect: if i == 0 { effect } else { Effect::None },
                })
                .collect();

            return Some(Step {
                tokens,
                cursor: ScanCursor::new(offset + hit.len, state_after),
            });
        }

        // Nothing matched: skip one character and stay put.
        let skip = line.chars().next().map_or(1, char::len_utf8);
        tracing::trace!(offset, %state, "no rule matched, skipping one character");
        let token = Token {
            kind: None,
            text: &line[..skip],
            start: offset,
            end: offset + skip,
            state_after: state,
            effect: Effect::None,
        };
        Some(Step {
            tokens: smallvec![token],
            cursor: ScanCursor::new(offset + skip, state),
        })
    }

    /// Lazily tokenizes `text`, starting in `state`.
    pub fn scan<'a>(&self, text: &'a str, state: State) -> Tokens<'t, 'a> {
        Tokens {
            scanner: *self,
            text,
            cursor: ScanCursor::new(0, state),
            pending: SmallVec::new().into_iter(),
        }
    }

    /// Returns the state at the start of every line of `text`.
    ///
    /// This is what an editor persists per line to restart scanning
    /// mid-buffer.
    pub fn line_states(&self, text: &str, state: State) -> Vec<State> {
        let mut states = vec![state];
        states.extend(
            self.scan(text, state)
                .filter(Token::is_line_break)
                .map(|token| token.state_after),
        );
        states
    }

    /// Tokenizes the whole of `text` and collects per-line data.
    pub fn highlight<'a>(&self, text: &'a str, state: State) -> Highlight<'a> {
        let mut tokens = Vec::new();
        let mut line_states = vec![state];
        let mut end_state = state;

        for token in self.scan(text, state) {
            if token.is_line_break() {
                line_states.push(token.state_after);
            }
            end_state = token.state_after;
            tokens.push(token);
        }

        tracing::trace!(
            tokens = tokens.len(),
            lines = line_states.len(),
            %end_state,
            "highlighted buffer"
        );

        Highlight {
            tokens,
            line_states,
            end_state,
        }
    }
}

/// Tokens of a whole buffer plus the states an editor keeps per line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Highlight<'a> {
    pub tokens: Vec<Token<'a>>,
    /// State at the start of each line
    pub line_states: Vec<State>,
    /// State after the last token
    pub end_state: State,
}

impl Highlight<'_> {
    /// Joins adjacent tokens of the same kind into `(kind, range)` runs.
    ///
    /// Runs never cross a line break; line breaks are runs of their own.
    pub fn runs(&self) -> Vec<(Option<Label>, Range<usize>)> {
        let mut runs: Vec<(Option<Label>, Range<usize>)> = Vec::new();
        let mut joinable = false;
        for token in &self.tokens {
            let is_break = token.is_line_break();
            match runs.last_mut() {
                Some((kind, range)) if joinable && !is_break && *kind == token.kind => {
                    range.end = token.end;
                }
                _ => runs.push((token.kind, token.range())),
            }
            joinable = !is_break;
        }
        runs
    }
}

/// Lazy token sequence returned by [`Scanner::scan`].
#[derive(Debug)]
pub struct Tokens<'t, 'a> {
    scanner: Scanner<'t>,
    text: &'a str,
    cursor: ScanCursor,
    pending: smallvec::IntoIter<[Token<'a>; 3]>,
}

impl Tokens<'_, '_> {
    /// Returns the cursor after the last completed rule application.
    pub fn cursor(&self) -> ScanCursor {
        self.cursor
    }
}

impl<'a> Iterator for Tokens<'_, 'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(token) = self.pending.next() {
            return Some(token);
        }

        let step = self.scanner.step(self.text, self.cursor)?;
        self.cursor = step.cursor;
        self.pending = step.tokens.into_iter();
        self.pending.next()
    }
}

impl FusedIterator for Tokens<'_, '_> {}

/// Length of the line break at the start of `text`, or 0.
///
/// `\r\n`, `\n` and a lone `\r` all end a line.
fn line_break_len(text: &str) -> usize {
    if text.starts_with("\r\n") {
        2
    } else if text.starts_with(['\n', '\r']) {
        1
    } else {
        0
    }
}

/// The part of `text` before the next line break.
fn current_line(text: &str) -> &str {
    let end = text.find(['\n', '\r']).unwrap_or(text.len());
    &text[..end]
}

/// Splits `text` into `(line, terminator)` pairs at the same breaks the
/// scanner uses. The last line has an empty terminator, so `""` is one line.
pub fn split_lines(text: &str) -> impl Iterator<Item = (&str, &str)> {
    let mut rest = Some(text);
    std::iter::from_fn(move || {
        let current = rest?;
        let line = current_line(current);
        let tail = &current[line.len()..];
        if tail.is_empty() {
            rest = None;
            return Some((line, tail));
        }
        let (terminator, next) = tail.split_at(line_break_len(tail));
        rest = Some(next);
        Some((line, terminator))
    })
}
