//! # Qhantoom Core
//!
//! Everything around the scanner that a highlighting front end needs.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │                   Document                     │
//! │  source text ──► Scanner ──► tokens            │
//! │                     │                          │
//! │            ┌────────┴────────┐                 │
//! │            ▼                 ▼                 │
//! │      line indents       fold ranges            │
//! └───────────────────────────────────────────────┘
//!          ▲                         │
//!       Config                     Theme (label ──► color)
//! ```
//!
//! ## Learning: Crate Boundaries
//!
//! `qhantoom-syntax` knows nothing about files, colors or settings. This
//! crate owns those concerns, so the scanner stays usable from any editor.

pub mod config;
pub mod document;
pub mod theme;

pub use config::{Config, ConfigError, EditorConfig, ThemeConfig};
pub use document::Document;
pub use theme::{Color, Theme};

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Syntax error: {0}")]
    Syntax(#[from] qhantoom_syntax::SyntaxError),

    #[error("Invalid color for {label}: {value}")]
    InvalidColor { label: String, value: String },
}
