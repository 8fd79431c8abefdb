//! Bracket-driven indentation hints.
//!
//! Every token produced by an `indent` rule pushes a level, every `dedent`
//! token pops one. A level remembers the column it asks for: the
//! indentation of the line the bracket opened on plus one indent unit.
//! The suggested indentation of a line is the innermost open level, minus
//! one level for every closing bracket the line starts with.

use serde::{Deserialize, Serialize};

use crate::rules::RuleTable;
use crate::scanner::split_lines;
use crate::{Effect, Meta, Scanner, State};

/// Indentation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndentOptions {
    /// Columns added per open bracket
    pub indent_unit: usize,
    /// Columns a tab advances to
    pub tab_size: usize,
    /// Write indentation with tabs instead of spaces
    pub use_tabs: bool,
}

impl Default for IndentOptions {
    fn default() -> Self {
        Self {
            indent_unit: 2,
            tab_size: 2,
            use_tabs: true,
        }
    }
}

/// Indentation data for one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineIndent {
    /// Zero-based line number
    pub line: usize,
    /// Scanner state at the start of the line
    pub start_state: State,
    /// Open brackets before the line
    pub depth: usize,
    /// Change in open brackets across the line
    pub delta: isize,
    /// Suggested indentation column, `None` to leave the line as is
    pub indent: Option<usize>,
}

/// Computes indentation data for every line of `text`.
pub fn line_indents(
    scanner: &Scanner<'_>,
    meta: &Meta,
    text: &str,
    state: State,
    options: IndentOptions,
) -> Vec<LineIndent> {
    let mut levels: Vec<usize> = Vec::new();
    let mut tokens = scanner.scan(text, state);
    let mut line_state = state;
    let mut out = Vec::new();

    for (line, (content, _)) in split_lines(text).enumerate() {
        let depth = levels.len();
        let indent = suggest(
            scanner.table(),
            meta,
            line_state,
            &levels,
            content.trim_start(),
        );
        let column = indentation(content, options.tab_size);

        let mut next_state = line_state;
        for token in tokens.by_ref() {
            if token.is_line_break() {
                next_state = token.state_after;
                break;
            }
            match token.effect {
                Effect::Indent => levels.push(column + options.indent_unit),
                Effect::Dedent => {
                    levels.pop();
                }
                Effect::None => {}
            }
        }

        out.push(LineIndent {
            line,
            start_state: line_state,
            depth,
            delta: levels.len() as isize - depth as isize,
            indent,
        });
        line_state = next_state;
    }

    out
}

/// Suggested column for a line starting with `text_after`.
fn suggest(
    table: &RuleTable,
    meta: &Meta,
    state: State,
    levels: &[usize],
    text_after: &str,
) -> Option<usize> {
    if !meta.indents_in(state) {
        return None;
    }

    let mut pos = levels.len() as isize - 1;
    let mut rules = table.rules(state);
    let mut rest = text_after;
    'scan: loop {
        for rule in rules.iter().filter(|rule| rule.dedent) {
            if let Some(hit) = rule.apply(rest) {
                pos -= 1;
                if let Some(next) = rule.next {
                    rules = table.rules(next);
                }
                rest = &rest[hit.len..];
                continue 'scan;
            }
        }
        break;
    }

    Some(if pos < 0 { 0 } else { levels[pos as usize] })
}

/// Measures the leading whitespace of `line` in columns.
pub fn indentation(line: &str, tab_size: usize) -> usize {
    let tab_size = tab_size.max(1);
    line.chars()
        .take_while(|c| c.is_whitespace())
        .fold(0, |column, c| {
            if c == '\t' {
                column + tab_size - column % tab_size
            } else {
                column + 1
            }
        })
}

/// Replaces the leading whitespace of `line` with `column` columns.
pub fn reindent(line: &str, column: usize, options: IndentOptions) -> String {
    let body = line.trim_start();
    let mut out = String::with_capacity(column + body.len());
    if options.use_tabs && options.tab_size > 0 {
        out.extend(std::iter::repeat_n('\t', column / options.tab_size));
        out.extend(std::iter::repeat_n(' ', column % options.tab_size));
    } else {
        out.extend(std::iter::repeat_n(' ', column));
    }
    out.push_str(body);
    out
}


#[cfg(test)]
mod tests {
    use super::*;

    fn indents(text: &str) -> Vec<LineIndent> {
        line_indents(
            &Scanner::qhantoom(),
            &Meta::qhantoom(),
            text,
            State::Start,
            IndentOptions::default(),
        )
    }

    #[test]
    fn test_balanced_brackets_on_one_line() {
        let lines = indents("{ { } }");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].depth, 0);
        assert_eq!(lines[0].delta, 0);

        let mut depth = 0isize;
        for token in Scanner::qhantoom().scan("{ { } }", State::Start) {
            depth += match token.effect {
                Effect::Indent => 1,
                Effect::Dedent => -1,
                Effect::None => 0,
            };
            assert!(depth >= 0);
        }
        assert_eq!(depth, 0);
    }

    #[test]
    fn test_nested_block_deltas() {
        let text = "fun main := () {\n  if x {\n    1\n  }\n}";
        let deltas: Vec<_> = indents(text).iter().map(|l| l.delta).collect();
        assert_eq!(deltas, vec![1, 1, 0, -1, -1]);

        let depths: Vec<_> = indents(text).iter().map(|l| l.depth).collect();
        assert_eq!(depths, vec![0, 1, 2, 2, 1]);
        assert_eq!(deltas.iter().sum::<isize>(), 0);
    }

    #[test]
    fn test_suggested_columns() {
        let text = "fun main := () {\n  if x {\n    1\n  }\n}";
        let columns: Vec<_> = indents(text).iter().map(|l| l.indent).collect();
        assert_eq!(columns, vec![Some(0), Some(2), Some(4), Some(2), Some(0)]);
    }

    #[test]
    fn test_suggestion_ignores_current_indentation() {
        let text = "{\nx\n        }";
        let columns: Vec<_> = indents(text).iter().map(|l| l.indent).collect();
        assert_eq!(columns, vec![Some(0), Some(2), Some(0)]);
    }

    #[test]
    fn test_leading_closers_each_pop_a_level() {
        let text = "[{\n}]";
        let columns: Vec<_> = indents(text).iter().map(|l| l.indent).collect();
        assert_eq!(columns, vec![Some(0), Some(0)]);
    }

    #[test]
    fn test_comment_lines_are_left_alone() {
        let text = "{\n/* a\n b */\n}";
        let lines = indents(text);
        assert_eq!(lines[1].indent, Some(2));
        assert_eq!(lines[2].start_state, State::Comment);
        assert_eq!(lines[2].indent, None);
        assert_eq!(lines[3].indent, Some(0));
    }

    #[test]
    fn test_brackets_in_strings_do_not_count() {
        let lines = indents("val s = \"{[(\";\nx");
        assert_eq!(lines[0].delta, 0);
        assert_eq!(lines[1].depth, 0);
    }

    #[test]
    fn test_stray_closer_never_goes_negative() {
        let lines = indents("}\n}\n{");
        assert_eq!(lines[0].delta, 0);
        assert_eq!(lines[1].depth, 0);
        assert_eq!(lines[2].delta, 1);
        assert!(lines.iter().all(|l| l.indent == Some(0)));
    }

    #[test]
    fn test_indentation_expands_tabs() {
        assert_eq!(indentation("\tx", 2), 2);
        assert_eq!(indentation(" \tx", 4), 4);
        assert_eq!(indentation("    x", 2), 4);
        assert_eq!(indentation("x", 2), 0);
    }

    #[test]
    fn test_tab_indented_levels() {
        let text = "{\n\t{\n\t\tx";
        let columns: Vec<_> = indents(text).iter().map(|l| l.indent).collect();
        assert_eq!(columns, vec![Some(0), Some(2), Some(4)]);
    }

    #[test]
    fn test_reindent() {
        let tabs = IndentOptions::default();
        assert_eq!(reindent("   x;", 4, tabs), "\t\tx;");
        assert_eq!(reindent("x;", 3, tabs), "\t x;");

        let spaces = IndentOptions {
            use_tabs: false,
            ..IndentOptions::default()
        };
        assert_eq!(reindent("\tx;", 4, spaces), "    x;");
    }
}
