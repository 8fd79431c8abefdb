//! Documents: a source text plus everything derived from scanning it.
//!
//! ## Learning: Lazy Caches with `OnceCell`
//!
//! Line states, indentation hints and fold ranges are only computed when
//! first asked for, then kept until the text changes. `OnceCell` gives
//! `&self` methods write-once interior mutability without a lock, since a
//! `Document` is owned by one thread at a time.

use std::cell::OnceCell;
use std::path::{Path, PathBuf};

use qhantoom_syntax::indent::reindent;
use qhantoom_syntax::registry::QHANTOOM;
use qhantoom_syntax::{
    FoldRange, Highlight, IndentOptions, LanguageRegistry, LineIndent, Mode, State, Token,
    detect_language, fold_at_line, fold_ranges, line_indents, split_lines,
};

use crate::CoreResult;

/// A source buffer being highlighted.
#[derive(Debug, Clone)]
pub struct Document {
    /// Source text
    text: String,

    /// File path (None for buffers read from elsewhere)
    path: Option<PathBuf>,

    /// Display name
    name: String,

    /// Highlighting mode
    mode: Mode,

    /// State the first line starts in
    start_state: State,

    /// Indentation settings
    options: IndentOptions,

    line_states: OnceCell<Vec<State>>,
    indents: OnceCell<Vec<LineIndent>>,
    folds: OnceCell<Vec<FoldRange>>,
}

impl Document {
    /// Creates a Qhantoom document from text.
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_mode(text, Mode::qhantoom())
    }

    /// Creates a document highlighted by `mode`.
    pub fn with_mode(text: impl Into<String>, mode: Mode) -> Self {
        Self {
            text: text.into(),
            path: None,
            name: "Untitled".to_string(),
            mode,
            start_state: State::Start,
            options: IndentOptions::default(),
            line_states: OnceCell::new(),
            indents: OnceCell::new(),
            folds: OnceCell::new(),
        }
    }

    /// Opens a document from a file.
    ///
    /// The mode comes from the file extension; unknown extensions are
    /// highlighted as Qhantoom.
    pub fn from_file(path: impl AsRef<Path>, registry: &LanguageRegistry) -> CoreResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;

        let language = detect_language(path).unwrap_or_else(|| {
            tracing::debug!(path = %path.display(), "no mode for extension, using qhantoom");
            QHANTOOM
        });
        let mode = registry.get(language)?.clone();

        let mut doc = Self::with_mode(text, mode);
        doc.name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("Unknown")
            .to_string();
        doc.path = Some(path.to_path_buf());
        Ok(doc)
    }

    /// Sets the state the first line starts in.
    pub fn with_start_state(mut self, state: State) -> Self {
        self.start_state = state;
        self.invalidate();
        self
    }

    /// Sets the indentation settings.
    pub fn with_options(mut self, options: IndentOptions) -> Self {
        self.options = options;
        self.indents.take();
        self
    }

    // ==================== Getters ====================

    /// Returns all text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the file path.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the highlighting mode.
    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// Returns the indentation settings.
    pub fn options(&self) -> IndentOptions {
        self.options
    }

    /// Returns the line count. An empty document has one line.
    pub fn line_count(&self) -> usize {
        split_lines(&self.text).count()
    }

    // ==================== Editing ====================

    /// Replaces the whole text. Derived data is recomputed on next use.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.line_states.take();
        self.indents.take();
        self.folds.take();
    }

    // ==================== Scan Results ====================

    /// Tokenizes the text.
    pub fn tokens(&self) -> Vec<Token<'_>> {
        self.mode
            .scanner()
            .scan(&self.text, self.start_state)
            .collect()
    }

    /// Tokenizes the text and collects per-line states.
    pub fn highlight(&self) -> Highlight<'_> {
        self.mode.scanner().highlight(&self.text, self.start_state)
    }

    /// Returns the scanner state at the start of every line.
    pub fn line_states(&self) -> &[State] {
        self.line_states.get_or_init(|| {
            self.mode
                .scanner()
                .line_states(&self.text, self.start_state)
        })
    }

    /// Returns indentation data for every line.
    pub fn indents(&self) -> &[LineIndent] {
        self.indents.get_or_init(|| {
            line_indents(
                &self.mode.scanner(),
                &self.mode.meta,
                &self.text,
                self.start_state,
                self.options,
            )
        })
    }

    /// Returns the foldable regions, ordered by start.
    pub fn folds(&self) -> &[FoldRange] {
        self.folds.get_or_init(|| fold_ranges(&self.tokens()))
    }

    /// Returns the outermost fold starting on `line`.
    pub fn fold_at_line(&self, line: usize) -> Option<&FoldRange> {
        fold_at_line(self.folds(), line)
    }

    /// Returns the text with every line moved to its suggested indentation.
    ///
    /// Lines without a suggestion (inside comments and strings) and blank
    /// lines are left alone.
    pub fn reindented(&self) -> String {
        let indents = self.indents();
        let mut out = String::with_capacity(self.text.len());
        for (i, (line, terminator)) in split_lines(&self.text).enumerate() {
            match indents.get(i).and_then(|indent| indent.indent) {
                Some(column) if !line.trim().is_empty() => {
                    out.push_str(&reindent(line, column, self.options));
                }
                _ => out.push_str(line),
            }
            out.push_str(terminator);
        }
        out
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CoreError;
    use qhantoom_syntax::{Label, SyntaxError};

    const SAMPLE: &str = "fun main := () {\nval x = 1;\n}";

    #[test]
    fn test_new_document() {
        let doc = Document::new(SAMPLE);
        assert_eq!(doc.name(), "Untitled");
        assert_eq!(doc.mode().name, "qhantoom");
        assert_eq!(doc.line_count(), 3);
        assert_eq!(Document::default().line_count(), 1);
    }

    #[test]
    fn test_tokens_borrow_document_text() {
        let doc = Document::new("val x");
        let tokens = doc.tokens();
        assert_eq!(tokens[0].kind, Some(Label::Keyword));
        assert_eq!(tokens[2].text, "x");
    }

    #[test]
    fn test_set_text_rescans() {
        let mut doc = Document::new("/* a\nb");
        assert_eq!(doc.line_states(), &[State::Start, State::Comment]);

        doc.set_text("a\nb");
        assert_eq!(doc.line_states(), &[State::Start, State::Start]);
    }

    #[test]
    fn test_start_state() {
        let doc = Document::new("x */ y\nz").with_start_state(State::Comment);
        assert_eq!(doc.highlight().tokens[0].kind, Some(Label::Comment));
        assert_eq!(doc.line_states(), &[State::Comment, State::Start]);
    }

    #[test]
    fn test_folds() {
        let doc = Document::new(SAMPLE);
        assert_eq!(doc.folds().len(), 1);

        let fold = doc.fold_at_line(0).unwrap();
        assert_eq!(fold.end_line, 2);
        assert_eq!(&SAMPLE[fold.close..fold.close + 1], "}");
        assert!(doc.fold_at_line(1).is_none());
    }

    #[test]
    fn test_reindent_with_tabs() {
        let doc = Document::new(SAMPLE);
        assert_eq!(doc.reindented(), "fun main := () {\n\tval x = 1;\n}");
    }

    #[test]
    fn test_reindent_with_spaces() {
        let options = IndentOptions {
            indent_unit: 4,
            tab_size: 4,
            use_tabs: false,
        };
        let doc = Document::new("{\r\n  x\r\n\r\n}").with_options(options);
        assert_eq!(doc.reindented(), "{\r\n    x\r\n\r\n}");
    }

    #[test]
    fn test_lone_carriage_returns_split_lines() {
        let doc = Document::new("{\rx\r}");
        assert_eq!(doc.line_count(), 3);
        assert_eq!(doc.line_states().len(), 3);
        assert_eq!(doc.reindented(), "{\r\tx\r}");
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.qh");
        std::fs::write(&path, SAMPLE).unwrap();

        let doc = Document::from_file(&path, &LanguageRegistry::new()).unwrap();
        assert_eq!(doc.name(), "main.qh");
        assert_eq!(doc.path(), Some(path.as_path()));
        assert_eq!(doc.text(), SAMPLE);
    }

    #[test]
    fn test_from_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.qh");
        assert!(matches!(
            Document::from_file(&missing, &LanguageRegistry::new()),
            Err(CoreError::Io(_))
        ));

        let path = dir.path().join("main.qh");
        std::fs::write(&path, SAMPLE).unwrap();
        assert!(matches!(
            Document::from_file(&path, &LanguageRegistry::empty()),
            Err(CoreError::Syntax(SyntaxError::UnknownLanguage(_)))
        ));
    }
}
