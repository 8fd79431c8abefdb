//! Brace-based code folding.

use serde::Serialize;

use crate::{Effect, Token};

/// A foldable region between a matched pair of brackets.
///
/// `open..close` is the text strictly between the brackets, which is what an
/// editor hides when the region is collapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FoldRange {
    /// Byte offset just after the opening bracket
    pub open: usize,
    /// Byte offset of the closing bracket
    pub close: usize,
    /// Line of the opening bracket
    pub start_line: usize,
    /// Line of the closing bracket
    pub end_line: usize,
}

/// Finds the fold ranges of a scanned buffer.
///
/// Only bracket tokens produced by indent and dedent rules count, so brackets
/// inside strings and comments never open a region. `{}` and `[]` are
/// matched independently; unmatched brackets are ignored, and so are pairs
/// that open and close on the same line.
pub fn fold_ranges(tokens: &[Token<'_>]) -> Vec<FoldRange> {
    let mut braces: Vec<(usize, usize)> = Vec::new();
    let mut brackets: Vec<(usize, usize)> = Vec::new();
    let mut ranges = Vec::new();
    let mut line = 0;

    for token in tokens {
        if token.is_line_break() {
            line += 1;
            continue;
        }

        match (token.effect, token.text) {
            (Effect::Indent, "{") => braces.push((token.end, line)),
            (Effect::Indent, "[") => brackets.push((token.end, line)),
            (Effect::Dedent, "}") | (Effect::Dedent, "]") => {
                let stack = if token.text == "}" {
                    &mut braces
                } else {
                    &mut brackets
                };
                if let Some((open, start_line)) = stack.pop() {
                    if line > start_line {
                        ranges.push(FoldRange {
                            open,
                            close: token.start,
                            start_line,
                            end_line: line,
                        });
                    }
                }
            }
            _ => {}
        }
    }

    ranges.sort_by_key(|range| range.open);
    ranges
}

/// Returns the outermost range that starts on `line`.
pub fn fold_at_line(ranges: &[FoldRange], line: usize) -> Option<&FoldRange> {
    ranges.iter().find(|range| range.start_line == line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Scanner, State};

    fn folds(text: &str) -> Vec<FoldRange> {
        let tokens: Vec<_> = Scanner::qhantoom().scan(text, State::Start).collect();
        fold_ranges(&tokens)
    }

    #[test]
    fn test_multi_line_block_folds() {
        let text = "fun main := () {\n  1\n}";
        let ranges = folds(text);
        assert_eq!(ranges.len(), 1);

        let range = ranges[0];
        assert_eq!(range.start_line, 0);
        assert_eq!(range.end_line, 2);
        assert_eq!(&text[range.open..range.close], "\n  1\n");
    }

    #[test]
    fn test_single_line_pairs_do_not_fold() {
        assert!(folds("if true { 1 } else { [0] }").is_empty());
    }

    #[test]
    fn test_nested_ranges_sorted_by_start() {
        let text = "enum Binop {\n  Add,\n}\nfun f := () {\n  val a = [\n    1,\n  ];\n}";
        let lines: Vec<_> = folds(text)
            .iter()
            .map(|r| (r.start_line, r.end_line))
            .collect();
        assert_eq!(lines, vec![(0, 2), (3, 7), (4, 6)]);
    }

    #[test]
    fn test_brackets_in_comments_and_strings_are_ignored() {
        let text = "/* {\n */ \"{\n\" x";
        assert!(folds(text).is_empty());
    }

    #[test]
    fn test_parens_and_mismatches() {
        assert!(folds("(\n)").is_empty());
        assert!(folds("}\n{").is_empty());

        let ranges = folds("{ [\n}\n]");
        let lines: Vec<_> = ranges.iter().map(|r| (r.start_line, r.end_line)).collect();
        assert_eq!(lines, vec![(0, 1), (0, 2)]);
    }

    #[test]
    fn test_fold_at_line() {
        let text = "{\n  {\n  }\n}";
        let ranges = folds(text);
        assert_eq!(fold_at_line(&ranges, 0).unwrap().end_line, 3);
        assert_eq!(fold_at_line(&ranges, 1).unwrap().end_line, 2);
        assert!(fold_at_line(&ranges, 2).is_none());
    }
}
