//! Mode registration.
//!
//! Editors look modes up either by name (`qhantoom`) or by the content type
//! of a buffer (`text/qhantoom`). The registry is a pair of maps and carries
//! no other logic.

use std::collections::HashMap;
use std::path::Path;

use crate::{Meta, RuleTable, Scanner, SyntaxError, SyntaxResult};

/// Name of the Qhantoom mode.
pub const QHANTOOM: &str = "qhantoom";

/// Content types the Qhantoom mode is registered under.
pub const QHANTOOM_MIMES: [&str; 2] = ["text/x-qhantoomsrc", "text/qhantoom"];

/// A highlighting mode: rules plus metadata.
#[derive(Debug, Clone)]
pub struct Mode {
    pub name: &'static str,
    pub rules: &'static RuleTable,
    pub meta: Meta,
}

impl Mode {
    /// Returns the Qhantoom mode.
    pub fn qhantoom() -> Self {
        Self {
            name: QHANTOOM,
            rules: RuleTable::shared(),
            meta: Meta::qhantoom(),
        }
    }

    /// Returns a scanner running this mode's rules.
    pub fn scanner(&self) -> Scanner<'static> {
        Scanner::new(self.rules)
    }
}

/// Language registry mapping names and content types to modes.
pub struct LanguageRegistry {
    modes: HashMap<&'static str, Mode>,
    mimes: HashMap<String, &'static str>,
}

impl LanguageRegistry {
    /// Creates a registry with the built-in modes defined.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.define(Mode::qhantoom());
        for mime in QHANTOOM_MIMES {
            registry.define_mime(mime, QHANTOOM);
        }
        registry
    }

    /// Creates a registry with nothing defined.
    pub fn empty() -> Self {
        Self {
            modes: HashMap::new(),
            mimes: HashMap::new(),
        }
    }

    /// Adds a mode, replacing any mode of the same name.
    pub fn define(&mut self, mode: Mode) {
        tracing::debug!(mode = mode.name, "defining highlighting mode");
        self.modes.insert(mode.name, mode);
    }

    /// Registers `mime` as an alias of the mode called `name`.
    pub fn define_mime(&mut self, mime: impl Into<String>, name: &'static str) {
        self.mimes.insert(mime.into(), name);
    }

    /// Looks a mode up by name or content type.
    pub fn get(&self, key: &str) -> SyntaxResult<&Mode> {
        let name = self.mimes.get(key).copied().unwrap_or(key);
        self.modes
            .get(name)
            .ok_or_else(|| SyntaxError::UnknownLanguage(key.to_string()))
    }

    /// Returns the content types registered for the mode called `name`.
    pub fn mimes_for(&self, name: &str) -> Vec<&str> {
        let mut mimes: Vec<&str> = self
            .mimes
            .iter()
            .filter(|(_, mode)| **mode == name)
            .map(|(mime, _)| mime.as_str())
            .collect();
        mimes.sort_unstable();
        mimes
    }

    /// Returns the names of all defined modes.
    pub fn supported_languages(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.modes.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Detects the mode name from a file path.
pub fn detect_language(path: &Path) -> Option<&'static str> {
    match path.extension()?.to_str()? {
        "qh" => Some(QHANTOOM),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name_and_mime() {
        let registry = LanguageRegistry::new();
        assert_eq!(registry.get("qhantoom").unwrap().name, QHANTOOM);
        assert_eq!(registry.get("text/qhantoom").unwrap().name, QHANTOOM);
        assert_eq!(registry.get("text/x-qhantoomsrc").unwrap().name, QHANTOOM);
    }

    #[test]
    fn test_unknown_language() {
        let registry = LanguageRegistry::new();
        let err = registry.get("text/x-rustsrc").unwrap_err();
        assert!(matches!(err, SyntaxError::UnknownLanguage(key) if key == "text/x-rustsrc"));
        assert!(LanguageRegistry::empty().get(QHANTOOM).is_err());
    }

    #[test]
    fn test_mimes_for_mode() {
        let registry = LanguageRegistry::new();
        assert_eq!(
            registry.mimes_for(QHANTOOM),
            vec!["text/qhantoom", "text/x-qhantoomsrc"]
        );
        assert_eq!(registry.supported_languages(), vec![QHANTOOM]);
    }

    #[test]
    fn test_detect_language() {
        assert_eq!(detect_language(Path::new("src/main.qh")), Some(QHANTOOM));
        assert_eq!(detect_language(Path::new("main.rs")), None);
        assert_eq!(detect_language(Path::new("Makefile")), None);
    }

    #[test]
    fn test_mode_scanner_runs_mode_rules() {
        let mode = Mode::qhantoom();
        let count = mode.scanner().scan("fun f", crate::State::Start).count();
        assert_eq!(count, 3);
    }
}
