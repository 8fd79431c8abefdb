//! # qhantoom-highlight
//!
//! Command-line front end for the Qhantoom highlighter.
//!
//! ## Quick Start
//!
//! ```bash
//! # Colour a file for the terminal
//! cargo run -- path/to/main.qh
//!
//! # Dump tokens as JSON from stdin
//! echo 'val x = 1;' | cargo run -- --emit json
//!
//! # Resume inside a block comment
//! cargo run -- --state comment --emit tokens rest.qh
//! ```

use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use qhantoom_core::{Config, Document, Theme};
use qhantoom_syntax::{LanguageRegistry, State, detect_language};

/// Qhantoom syntax highlighter
#[derive(Parser, Debug)]
#[command(name = "qhantoom-highlight")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Source file (reads stdin when omitted)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// What to print
    #[arg(short, long, value_enum, default_value_t = Emit::Highlight)]
    emit: Emit,

    /// Scanner state the first line starts in
    #[arg(short, long, default_value = "start")]
    state: State,

    /// Mode name or content type, e.g. `text/x-qhantoomsrc`
    #[arg(short, long, value_name = "NAME_OR_MIME")]
    mode: Option<String>,

    /// Config file (defaults to the user config directory)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Emit {
    /// Source coloured with ANSI escapes
    Highlight,
    /// One token per line
    Tokens,
    /// Tokens and line states as JSON
    Json,
    /// Foldable regions
    Folds,
    /// Per-line indentation data
    Indent,
    /// Source with suggested indentation applied
    Reindent,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .with_level(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    tracing::info!("Starting qhantoom-highlight v{}", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::load(),
    };

    let text = read_input(args.file.as_ref())?;
    let doc = open_document(&args, &config, text)?;
    let theme = Theme::from_config(&config.theme).context("invalid theme")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    emit(&doc, args.emit, &theme, &mut out)?;
    out.flush()?;

    Ok(())
}

/// Reads the source text from a file, or stdin when there is none.
fn read_input(file: Option<&PathBuf>) -> anyhow::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            Ok(text)
        }
    }
}

/// Builds the document, picking the mode from `--mode`, the file
/// extension or the config, in that order.
fn open_document(args: &Args, config: &Config, text: String) -> anyhow::Result<Document> {
    let registry = LanguageRegistry::new();
    let key = args
        .mode
        .as_deref()
        .or_else(|| args.file.as_deref().and_then(detect_language))
        .unwrap_or(config.editor.mode.as_str());
    let mode = registry.get(key)?.clone();
    tracing::debug!(mode = mode.name, state = %args.state, "opening document");

    Ok(Document::with_mode(text, mode)
        .with_start_state(args.state)
        .with_options(config.editor.indent_options()))
}

/// Writes the requested view of `doc` to `out`.
fn emit(doc: &Document, what: Emit, theme: &Theme, out: &mut impl Write) -> anyhow::Result<()> {
    match what {
        Emit::Highlight => {
            write!(out, "{}", theme.render_ansi(&doc.tokens()))?;
        }
        Emit::Tokens => {
            for token in doc.tokens() {
                let kind = token.kind.map_or("-", |label| label.as_str());
                writeln!(
                    out,
                    "{}..{}\t{}\t{}\t{:?}",
                    token.start, token.end, kind, token.state_after, token.text
                )?;
            }
        }
        Emit::Json => {
            serde_json::to_writer_pretty(&mut *out, &doc.highlight())?;
            writeln!(out)?;
        }
        Emit::Folds => {
            for fold in doc.folds() {
                writeln!(
                    out,
                    "{}-{}\t{}..{}",
                    fold.start_line + 1,
                    fold.end_line + 1,
                    fold.open,
                    fold.close
                )?;
            }
        }
        Emit::Indent => {
            for line in doc.indents() {
                let column = line
                    .indent
                    .map_or_else(|| "-".to_string(), |column| column.to_string());
                writeln!(
                    out,
                    "{}\t{}\t{}\t{}",
                    line.line + 1,
                    line.start_state,
                    line.depth,
                    column
                )?;
            }
        }
        Emit::Reindent => {
            write!(out, "{}", doc.reindented())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn render(text: &str, what: Emit) -> String {
        let doc = Document::new(text);
        let mut out = Vec::new();
        emit(&doc, what, &Theme::monokai(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["qhantoom-highlight"]);
        assert!(args.file.is_none());
        assert_eq!(args.emit, Emit::Highlight);
        assert_eq!(args.state, State::Start);
        assert!(args.mode.is_none());
    }

    #[test]
    fn test_args_with_options() {
        let args = Args::parse_from([
            "qhantoom-highlight",
            "main.qh",
            "--emit",
            "json",
            "--state",
            "string_raw_hash",
            "--mode",
            "text/qhantoom",
            "-vv",
        ]);
        assert_eq!(args.file, Some(PathBuf::from("main.qh")));
        assert_eq!(args.emit, Emit::Json);
        assert_eq!(args.state, State::StringRawHash);
        assert_eq!(args.mode.as_deref(), Some("text/qhantoom"));
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_args_reject_unknown_state() {
        assert!(Args::try_parse_from(["qhantoom-highlight", "--state", "nowhere"]).is_err());
    }

    #[test]
    fn test_open_document_mode_lookup() {
        let config = Config::default();

        let args = Args::parse_from(["qhantoom-highlight", "--mode", "text/x-qhantoomsrc"]);
        let doc = open_document(&args, &config, "val x".to_string()).unwrap();
        assert_eq!(doc.mode().name, "qhantoom");

        let args = Args::parse_from(["qhantoom-highlight", "--mode", "rust"]);
        assert!(open_document(&args, &config, String::new()).is_err());
    }

    #[test]
    fn test_emit_tokens() {
        assert_eq!(
            render("val x", Emit::Tokens),
            "0..3\tkeyword\tstart\t\"val\"\n3..4\t-\tstart\t\" \"\n4..5\tdef\tstart\t\"x\"\n"
        );
    }

    #[test]
    fn test_emit_json() {
        let json: serde_json::Value =
            serde_json::from_str(&render("/* a\nb */", Emit::Json)).unwrap();
        assert_eq!(json["line_states"], serde_json::json!(["start", "comment"]));
        assert_eq!(json["end_state"], "start");
        assert_eq!(json["tokens"][0]["kind"], "comment");
    }

    #[test]
    fn test_emit_folds_and_indent() {
        let text = "fun f := () {\nx;\n}";
        assert_eq!(render(text, Emit::Folds), "1-3\t13..17\n");
        assert_eq!(
            render(text, Emit::Indent),
            "1\tstart\t0\t0\n2\tstart\t1\t2\n3\tstart\t1\t0\n"
        );
        assert_eq!(render(text, Emit::Reindent), "fun f := () {\n\tx;\n}");
    }

    #[test]
    fn test_config_file_drives_output() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("main.qh");
        let config_path = dir.path().join("config.toml");
        std::fs::write(&source, "fun f := () {\nx;\n}").unwrap();
        std::fs::write(
            &config_path,
            "[editor]\nindent_unit = 4\nindent_with_tabs = false\n",
        )
        .unwrap();

        let args = Args::parse_from([
            "qhantoom-highlight",
            source.to_str().unwrap(),
            "--config",
            config_path.to_str().unwrap(),
            "--emit",
            "reindent",
        ]);
        let config = Config::load_from(args.config.as_ref().unwrap()).unwrap();
        let text = read_input(args.file.as_ref()).unwrap();
        let doc = open_document(&args, &config, text).unwrap();

        let mut out = Vec::new();
        emit(&doc, args.emit, &Theme::monokai(), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "fun f := () {\n    x;\n}");
    }

    #[test]
    fn test_missing_input_file_has_context() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.qh");
        let err = read_input(Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    proptest! {
        #[test]
        fn test_reindent_only_touches_whitespace(text in "[a-z{}()\\[\\] \t\n/*\"]{0,60}") {
            let strip = |s: &str| -> String { s.split_whitespace().collect() };
            let out = render(&text, Emit::Reindent);
            prop_assert_eq!(strip(&out), strip(&text));
        }
    }
}
