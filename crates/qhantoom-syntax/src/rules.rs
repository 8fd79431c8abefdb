//! Rule tables.
//!
//! A rule table is plain data: for every [`State`], an ordered list of
//! patterns and what to do when one of them matches. The Qhantoom table is
//! declared as `const` [`RuleDef`]s and compiled into [`Rule`]s once per
//! process.
//!
//! ## Learning: `const fn` Builders
//!
//! `RuleDef::regex(..).next(..)` is evaluated at compile time. The table
//! below is therefore a static array, and only the regex compilation is
//! deferred to runtime (see [`RuleTable::qhantoom`]).

use lazy_static::lazy_static;
use regex::Regex;
use smallvec::{SmallVec, smallvec};
use std::collections::HashMap;
use std::ops::Range;

use crate::{Label, State, SyntaxError, SyntaxResult};

/// How the text consumed by a rule is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSpec {
    /// The whole match becomes one token.
    Single(Option<Label>),

    /// The match is split by capture group: `(group index, label)` pairs in
    /// emission order. Text between the listed groups is unlabeled.
    Captures(&'static [(usize, Option<Label>)]),
}

/// Declarative form of a pattern, before compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternDef {
    /// A regular expression anchored at the scan position.
    Regex(&'static str),

    /// Everything up to the first occurrence of a literal, or end of line.
    Until(&'static str),
}

/// Declarative form of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleDef {
    pub pattern: PatternDef,
    pub token: TokenSpec,
    pub next: Option<State>,
    pub indent: bool,
    pub dedent: bool,
}

impl RuleDef {
    pub const fn regex(source: &'static str, label: Option<Label>) -> Self {
        Self {
            pattern: PatternDef::Regex(source),
            token: TokenSpec::Single(label),
            next: None,
            indent: false,
            dedent: false,
        }
    }

    pub const fn captures(
        source: &'static str,
        groups: &'static [(usize, Option<Label>)],
    ) -> Self {
        Self {
            pattern: PatternDef::Regex(source),
            token: TokenSpec::Captures(groups),
            next: None,
            indent: false,
            dedent: false,
        }
    }

    pub const fn until(literal: &'static str, label: Option<Label>) -> Self {
        Self {
            pattern: PatternDef::Until(literal),
            token: TokenSpec::Single(label),
            next: None,
            indent: false,
            dedent: false,
        }
    }

    /// Switches to `state` after a match.
    pub const fn next(mut self, state: State) -> Self {
        self.next = Some(state);
        self
    }

    /// Marks the match as opening an indentation level.
    pub const fn indent(mut self) -> Self {
        self.indent = true;
        self
    }

    /// Marks the match as closing an indentation level.
    pub const fn dedent(mut self) -> Self {
        self.dedent = true;
        self
    }
}

/// A compiled pattern.
#[derive(Debug, Clone)]
pub enum Pattern {
    Regex(Regex),
    Until(&'static str),
}

impl Pattern {
    /// Compiles a pattern definition. Regexes are anchored at the start.
    pub fn compile(def: PatternDef) -> Result<Self, regex::Error> {
        match def {
            PatternDef::Regex(source) => Ok(Pattern::Regex(Regex::new(&format!("^(?:{source})"))?)),
            PatternDef::Until(literal) => Ok(Pattern::Until(literal)),
        }
    }

    /// Returns the length of the match at the start of `line`, if any.
    pub fn find(&self, line: &str) -> Option<usize> {
        match self {
            Pattern::Regex(re) => re.find(line).map(|m| m.end()),
            Pattern::Until(literal) => Some(line.find(literal).unwrap_or(line.len())),
        }
    }
}

/// A compiled rule.
#[derive(Debug, Clone)]
pub struct Rule {
    pub pattern: Pattern,
    pub token: TokenSpec,
    pub next: Option<State>,
    pub indent: bool,
    pub dedent: bool,
}

/// Spans of one successful rule application, relative to the line slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Hit {
    pub len: usize,
    pub parts: SmallVec<[(Range<usize>, Option<Label>); 3]>,
}

impl Rule {
    /// Compiles a rule definition.
    pub fn compile(def: &RuleDef) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Pattern::compile(def.pattern)?,
            token: def.token,
            next: def.next,
            indent: def.indent,
            dedent: def.dedent,
        })
    }

    /// Tries the rule at the start of `line`.
    ///
    /// Empty matches count as failures; a rule must consume input to fire.
    pub(crate) fn apply(&self, line: &str) -> Option<Hit> {
        match (&self.pattern, self.token) {
            (Pattern::Regex(re), TokenSpec::Captures(groups)) => {
                let caps = re.captures(line)?;
                let len = caps.get(0).map_or(0, |m| m.end());
                if len == 0 {
                    return None;
                }

                let mut parts = SmallVec::new();
                let mut cursor = 0;
                for &(group, label) in groups {
                    let Some(m) = caps.get(group) else { continue };
                    if m.is_empty() || m.start() < cursor {
                        continue;
                    }
                    if m.start() > cursor {
                        parts.push((cursor..m.start(), None));
                    }
                    parts.push((m.range(), label));
                    cursor = m.end();
                }
                if cursor < len {
                    parts.push((cursor..len, None));
                }
                Some(Hit { len, parts })
            }
            (pattern, token) => {
                let len = pattern.find(line).filter(|&len| len > 0)?;
                let label = match token {
                    TokenSpec::Single(label) => label,
                    TokenSpec::Captures(_) => None,
                };
                Some(Hit {
                    len,
                    parts: smallvec![(0..len, label)],
                })
            }
        }
    }
}

/// A mapping from scanner state to its ordered rules.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    states: HashMap<State, Vec<Rule>>,
}

impl RuleTable {
    /// Compiles a table from per-state rule definitions.
    pub fn compile(defs: &[(State, &[RuleDef])]) -> SyntaxResult<Self> {
        let mut states = HashMap::with_capacity(defs.len());
        for &(state, rules) in defs {
            let compiled = rules
                .iter()
                .enumerate()
                .map(|(index, def)| {
                    Rule::compile(def).map_err(|source| SyntaxError::InvalidPattern {
                        state,
                        index,
                        source,
                    })
                })
                .collect::<SyntaxResult<Vec<_>>>()?;
            states.insert(state, compiled);
        }

        let table = Self { states };
        table.validate()?;
        Ok(table)
    }

    /// Compiles the Qhantoom rule table.
    pub fn qhantoom() -> SyntaxResult<Self> {
        let table = Self::compile(QHANTOOM_RULES)?;
        tracing::debug!(
            rules = table.states.values().map(Vec::len).sum::<usize>(),
            "compiled qhantoom rule table"
        );
        Ok(table)
    }

    /// Returns the process-wide compiled Qhantoom table.
    pub fn shared() -> &'static RuleTable {
        &QHANTOOM
    }

    /// Returns the rules for a state, in match order.
    pub fn rules(&self, state: State) -> &[Rule] {
        self.states.get(&state).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Checks that every state has rules and every transition has a target.
    pub fn validate(&self) -> SyntaxResult<()> {
        if !self.states.contains_key(&State::Start) {
            return Err(SyntaxError::InvalidTable("missing start state".to_string()));
        }

        for (state, rules) in &self.states {
            if rules.is_empty() {
                return Err(SyntaxError::InvalidTable(format!("state {state} has no rules")));
            }
            for (index, rule) in rules.iter().enumerate() {
                if let Some(next) = rule.next {
                    if !self.states.contains_key(&next) {
                        return Err(SyntaxError::InvalidTable(format!(
                            "rule {index} in state {state} moves to undefined state {next}"
                        )));
                    }
                }
                if rule.indent && rule.dedent {
                    return Err(SyntaxError::InvalidTable(format!(
                        "rule {index} in state {state} both indents and dedents"
                    )));
                }
                if matches!(
                    (&rule.pattern, rule.token),
                    (Pattern::Until(_), TokenSpec::Captures(_))
                ) {
                    return Err(SyntaxError::InvalidTable(format!(
                        "rule {index} in state {state} splits captures of a literal pattern"
                    )));
                }
            }
        }
        Ok(())
    }
}

lazy_static! {
    static ref QHANTOOM: RuleTable =
        RuleTable::qhantoom().expect("built-in qhantoom rule table must compile");
}

// ============================================================================
// Qhantoom rules
// ============================================================================

const KEYWORD_DEF: &[(usize, Option<Label>)] =
    &[(1, Some(Label::Keyword)), (2, None), (3, Some(Label::Def))];

const START: &[RuleDef] = &[
    // string and byte string
    RuleDef::regex(r#"b?""#, Some(Label::String)).next(State::String),
    // raw string and raw byte string
    RuleDef::regex(r#"b?r""#, Some(Label::String)).next(State::StringRaw),
    RuleDef::regex(r#"b?r#+""#, Some(Label::String)).next(State::StringRawHash),
    // character
    RuleDef::regex(
        r#"'(?:[^'\\]|\\(?:[nrt0'"]|x[0-9a-fA-F]{2}|u\{[0-9a-fA-F]{6}\}))'"#,
        Some(Label::String2),
    ),
    // byte
    RuleDef::regex(
        r#"b'(?:[^']|\\(?:['\\nrt0]|x[0-9a-fA-F]{2}))'"#,
        Some(Label::String2),
    ),
    RuleDef::regex(
        concat!(
            r"(?:(?:[0-9][0-9_]*)",
            r"(?:(?:[Ee][+-]?[0-9_]+)|\.[0-9_]+(?:[Ee][+-]?[0-9_]+)?)(?:f32|f64)?)",
            r"|(?:0(?:b[01_]+|(?:o[0-7_]+)|(?:x[0-9a-fA-F_]+))|(?:[0-9][0-9_]*))",
            r"(?:u8|u16|u32|u64|s8|s16|s32|s64|sint|uint)?",
        ),
        Some(Label::Number),
    ),
    RuleDef::captures(
        concat!(
            r"(val(?:\s+mut)?|imu|mut|fun|enum|mod|exp|ext|struct|type|union)",
            r"(\s+)([a-zA-Z_][a-zA-Z0-9_]*)",
        ),
        KEYWORD_DEF,
    ),
    RuleDef::regex(
        concat!(
            r"(?:abstract|alignof|as|async|await|box|break|capsule|chan|continue|const",
            r"|crate|do|dyn|else|enum|exp|ext|fun|for|final|if|imp|impl|imu|in|load",
            r"|loop|macro|match|mock|mod|move|offsetof|override|proc|pub|pure|ref|return",
            r"|self|set|sizeof|spawn|static|struct|super|test|trait|type|typeof|union",
            r"|unit|unsafe|unsized|use|val|virtual|wasm|where",
            r"|while|yield)(?-u:\b)",
        ),
        Some(Label::Keyword),
    ),
    RuleDef::regex(
        concat!(
            r"(?-u:\b)(?:Self|sint|uint|char|bool|u8|u16|u32|u64|f16|f32|f64",
            r"|s8|s16|s32|s64|str|Option)(?-u:\b)",
        ),
        Some(Label::Atom),
    ),
    RuleDef::regex(
        r"(?-u:\b)(?:true|false|Some|None|Ok|Err|print)(?-u:\b)",
        Some(Label::Builtin),
    ),
    RuleDef::captures(r"(?-u:\b)(fun)(\s+)([a-zA-Z_][a-zA-Z0-9_]*)", KEYWORD_DEF),
    RuleDef::regex(r"#!?\[.*\]", Some(Label::Meta)),
    RuleDef::regex(r"//.*", Some(Label::Comment)),
    RuleDef::regex(r"/\*", Some(Label::Comment)).next(State::Comment),
    RuleDef::regex(r"[-+/*=<>!:.]+", Some(Label::Operator)),
    RuleDef::regex(r"[a-zA-Z_][a-zA-Z0-9_]*!", Some(Label::Variable3)),
    RuleDef::regex(r"[a-zA-Z_][a-zA-Z0-9_]*", Some(Label::Variable)),
    RuleDef::regex(r"[{\[(]", None).indent(),
    RuleDef::regex(r"[}\])]", None).dedent(),
];

const STRING: &[RuleDef] = &[
    RuleDef::regex(r#"""#, Some(Label::String)).next(State::Start),
    RuleDef::regex(r#"(?:[^\\"]|\\(?:.|$))*"#, Some(Label::String)),
];

const STRING_RAW: &[RuleDef] = &[
    RuleDef::regex(r#"""#, Some(Label::String)).next(State::Start),
    RuleDef::regex(r#"[^"]*"#, Some(Label::String)),
];

const STRING_RAW_HASH: &[RuleDef] = &[
    RuleDef::regex(r##""#+"##, Some(Label::String)).next(State::Start),
    RuleDef::until("\"#", Some(Label::String)),
];

const COMMENT: &[RuleDef] = &[
    RuleDef::regex(r"(?:.*?)\*/", Some(Label::Comment)).next(State::Start),
    RuleDef::regex(r".*", Some(Label::Comment)),
];

/// The Qhantoom rule table in declarative form.
pub const QHANTOOM_RULES: &[(State, &[RuleDef])] = &[
    (State::Start, START),
    (State::String, STRING),
    (State::StringRaw, STRING_RAW),
    (State::StringRawHash, STRING_RAW_HASH),
    (State::Comment, COMMENT),
];
