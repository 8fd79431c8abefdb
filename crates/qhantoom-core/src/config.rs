//! Highlighting configuration.
//!
//! ## Learning: Serde Defaults
//!
//! Every section is `#[serde(default)]`, so a config file only needs the
//! keys a user wants to change:
//!
//! ```toml
//! [editor]
//! tab_size = 4
//!
//! [theme.overrides]
//! keyword = "#ff0000"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use qhantoom_syntax::IndentOptions;

/// Main configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Indentation and mode settings
    pub editor: EditorConfig,

    /// Colors
    pub theme: ThemeConfig,
}

impl Config {
    /// Loads config from the default location, falling back to defaults.
    pub fn load() -> Self {
        match Self::load_from_default_path() {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("Using default config: {}", err);
                Self::default()
            }
        }
    }

    /// Loads config from a file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        tracing::debug!(path = %path.as_ref().display(), "loaded config");
        Ok(config)
    }

    /// Loads from the default config path.
    fn load_from_default_path() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Returns the default config file path.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("qhantoom").join("config.toml"))
    }

    /// Saves the config to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(Self::default_path()?)
    }

    /// Saves the config to a file, creating parent directories.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Indentation and mode settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Mode name or content type used when none is given
    pub mode: String,

    /// Columns a tab advances to
    pub tab_size: usize,

    /// Columns per indentation level
    pub indent_unit: usize,

    /// Indent with tabs instead of spaces
    pub indent_with_tabs: bool,
}

impl EditorConfig {
    /// Returns the indentation settings for the scanner.
    pub fn indent_options(&self) -> IndentOptions {
        IndentOptions {
            indent_unit: self.indent_unit,
            tab_size: self.tab_size,
            use_tabs: self.indent_with_tabs,
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            mode: "qhantoom".to_string(),
            tab_size: 2,
            indent_unit: 2,
            indent_with_tabs: true,
        }
    }
}

/// Color settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Base theme name
    pub name: String,

    /// Per-label colors (`"keyword" = "#f92672"`)
    pub overrides: HashMap<String, String>,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: "monokai".to_string(),
            overrides: HashMap::new(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config directory not found")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}
