//! Label-to-color themes.
//!
//! The scanner only classifies text; a theme decides what each
//! [`Label`] looks like. Themes render to 24-bit ANSI escapes for terminal
//! output.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use qhantoom_syntax::{Label, Token};

use crate::config::ThemeConfig;
use crate::{CoreError, CoreResult};

/// Color representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb` or `#rgb`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if !digits.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match digits.len() {
            6 => Some(Self::rgb(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            3 => {
                let short = |i: usize| channel(&digits[i..i + 1]).map(|v| v * 17);
                Some(Self::rgb(short(0)?, short(1)?, short(2)?))
            }
            _ => None,
        }
    }

    /// Formats as `#rrggbb`.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Returns the ANSI escape selecting this color as foreground.
    pub fn ansi_fg(&self) -> String {
        format!("\x1b[38;2;{};{};{}m", self.r, self.g, self.b)
    }
}

/// Syntax highlighting colors, one per label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxColors {
    pub string: Color,
    pub string_2: Color,
    pub number: Color,
    pub keyword: Color,
    pub atom: Color,
    pub builtin: Color,
    pub def: Color,
    pub meta: Color,
    pub comment: Color,
    pub operator: Color,
    pub variable: Color,
    pub variable_3: Color,
}

impl SyntaxColors {
    fn get(&self, label: Label) -> Color {
        match label {
            Label::String => self.string,
            Label::String2 => self.string_2,
            Label::Number => self.number,
            Label::Keyword => self.keyword,
            Label::Atom => self.atom,
            Label::Builtin => self.builtin,
            Label::Def => self.def,
            Label::Meta => self.meta,
            Label::Comment => self.comment,
            Label::Operator => self.operator,
            Label::Variable => self.variable,
            Label::Variable3 => self.variable_3,
        }
    }

    fn get_mut(&mut self, label: Label) -> &mut Color {
        match label {
            Label::String => &mut self.string,
            Label::String2 => &mut self.string_2,
            Label::Number => &mut self.number,
            Label::Keyword => &mut self.keyword,
            Label::Atom => &mut self.atom,
            Label::Builtin => &mut self.builtin,
            Label::Def => &mut self.def,
            Label::Meta => &mut self.meta,
            Label::Comment => &mut self.comment,
            Label::Operator => &mut self.operator,
            Label::Variable => &mut self.variable,
            Label::Variable3 => &mut self.variable_3,
        }
    }
}

/// Highlighting theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    /// Theme name
    pub name: String,

    /// Is this a dark theme?
    pub is_dark: bool,

    /// Color of unlabeled text
    pub foreground: Color,

    /// Syntax highlighting colors
    pub syntax: SyntaxColors,
}

impl Theme {
    /// The playground's default dark theme.
    pub fn monokai() -> Self {
        Self {
            name: "monokai".to_string(),
            is_dark: true,
            foreground: Color::rgb(0xf8, 0xf8, 0xf2),
            syntax: SyntaxColors {
                string: Color::rgb(0xe6, 0xdb, 0x74),
                string_2: Color::rgb(0xe6, 0xdb, 0x74),
                number: Color::rgb(0xae, 0x81, 0xff),
                keyword: Color::rgb(0xf9, 0x26, 0x72),
                atom: Color::rgb(0xae, 0x81, 0xff),
                builtin: Color::rgb(0x66, 0xd9, 0xef),
                def: Color::rgb(0xfd, 0x97, 0x1f),
                meta: Color::rgb(0xa6, 0xe2, 0x2e),
                comment: Color::rgb(0x75, 0x71, 0x5e),
                operator: Color::rgb(0xf8, 0xf8, 0xf2),
                variable: Color::rgb(0xf8, 0xf8, 0xf2),
                variable_3: Color::rgb(0x66, 0xd9, 0xef),
            },
        }
    }

    /// A light theme.
    pub fn light() -> Self {
        Self {
            name: "light".to_string(),
            is_dark: false,
            foreground: Color::rgb(0x00, 0x00, 0x00),
            syntax: SyntaxColors {
                string: Color::rgb(0xaa, 0x11, 0x11),
                string_2: Color::rgb(0xff, 0x55, 0x00),
                number: Color::rgb(0x11, 0x66, 0x44),
                keyword: Color::rgb(0x77, 0x00, 0x88),
                atom: Color::rgb(0x22, 0x11, 0x99),
                builtin: Color::rgb(0x33, 0x00, 0xaa),
                def: Color::rgb(0x00, 0x00, 0xff),
                meta: Color::rgb(0x55, 0x55, 0x55),
                comment: Color::rgb(0xaa, 0x55, 0x00),
                operator: Color::rgb(0x00, 0x00, 0x00),
                variable: Color::rgb(0x00, 0x00, 0x00),
                variable_3: Color::rgb(0x00, 0x88, 0x55),
            },
        }
    }

    /// Looks a built-in theme up by name.
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "monokai" | "dark" => Some(Self::monokai()),
            "light" | "default" => Some(Self::light()),
            _ => None,
        }
    }

    /// Builds the theme a config asks for.
    ///
    /// Unknown theme names fall back to monokai; bad overrides are errors.
    pub fn from_config(config: &ThemeConfig) -> CoreResult<Self> {
        let mut theme = Self::by_name(&config.name).unwrap_or_else(|| {
            tracing::warn!("Unknown theme {:?}, using monokai", config.name);
            Self::monokai()
        });

        for (name, value) in &config.overrides {
            let invalid = || CoreError::InvalidColor {
                label: name.clone(),
                value: value.clone(),
            };
            let color = Color::from_hex(value).ok_or_else(invalid)?;
            if name == "foreground" {
                theme.foreground = color;
            } else {
                let label = Label::from_name(name).ok_or_else(invalid)?;
                *theme.syntax.get_mut(label) = color;
            }
        }

        Ok(theme)
    }

    /// Returns the color for a token kind.
    pub fn color(&self, kind: Option<Label>) -> Color {
        kind.map_or(self.foreground, |label| self.syntax.get(label))
    }

    /// Renders tokens as ANSI-colored text.
    pub fn render_ansi(&self, tokens: &[Token<'_>]) -> String {
        let mut out = String::new();
        for token in tokens {
            if token.is_line_break() || token.kind.is_none() {
                out.push_str(token.text);
                continue;
            }
            let _ = write!(out, "{}{}\x1b[0m", self.color(token.kind).ansi_fg(), token.text);
        }
        out
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::monokai()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qhantoom_syntax::{Scanner, State};
    use std::collections::HashMap;

    #[test]
    fn test_hex_colors() {
        assert_eq!(Color::from_hex("#f92672"), Some(Color::rgb(0xf9, 0x26, 0x72)));
        assert_eq!(Color::from_hex("#fff"), Some(Color::rgb(255, 255, 255)));
        assert_eq!(Color::from_hex("f92672"), None);
        assert_eq!(Color::from_hex("#zzzzzz"), None);
        assert_eq!(Color::rgb(1, 2, 255).to_hex(), "#0102ff");
    }

    #[test]
    fn test_every_label_has_a_color() {
        let theme = Theme::monokai();
        assert_eq!(theme.color(Some(Label::Keyword)), Color::rgb(0xf9, 0x26, 0x72));
        assert_eq!(theme.color(None), theme.foreground);
        for label in Label::ALL {
            let _ = theme.color(Some(label));
        }
    }

    #[test]
    fn test_config_overrides() {
        let config = ThemeConfig {
            name: "light".to_string(),
            overrides: HashMap::from([
                ("keyword".to_string(), "#ff0000".to_string()),
                ("foreground".to_string(), "#111".to_string()),
            ]),
        };
        let theme = Theme::from_config(&config).unwrap();
        assert_eq!(theme.name, "light");
        assert_eq!(theme.syntax.keyword, Color::rgb(255, 0, 0));
        assert_eq!(theme.foreground, Color::rgb(0x11, 0x11, 0x11));
    }

    #[test]
    fn test_bad_override_is_rejected() {
        let config = ThemeConfig {
            name: "monokai".to_string(),
            overrides: HashMap::from([("function".to_string(), "#ff0000".to_string())]),
        };
        assert!(matches!(
            Theme::from_config(&config),
            Err(CoreError::InvalidColor { .. })
        ));
    }

    #[test]
    fn test_render_ansi_keeps_text() {
        let tokens: Vec<_> = Scanner::qhantoom().scan("val x = 1;\n", State::Start).collect();
        let rendered = Theme::monokai().render_ansi(&tokens);

        assert!(rendered.starts_with("\x1b[38;2;249;38;114mval\x1b[0m"));
        assert!(rendered.ends_with(";\n"));

        let stripped: String = rendered
            .split("\x1b[")
            .enumerate()
            .map(|(i, part)| match i {
                0 => part,
                _ => part.split_once('m').map_or("", |(_, rest)| rest),
            })
            .collect();
        assert_eq!(stripped, "val x = 1;\n");
    }
}
