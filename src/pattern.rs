//! Pattern specs and their compiled form
//!
//! A [`PatternSpec`] is a label string or a nested list of specs. Compiling
//! it turns every label into an anchored regex and keeps the nesting, which
//! the domination engine reads as chains and side conditions.

use regex::Regex;
use std::fmt::Debug;
use thiserror::Error;

use crate::parser::Rule;

/// Error raised while parsing or compiling a pattern spec
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("Spec error: {token:?} at offset {offset} is neither a label nor a list")]
    InvalidSpec { token: String, offset: usize },

    #[error("Spec error: {0}")]
    Syntax(#[from] Box<pest::error::Error<Rule>>),

    #[error("Spec error: invalid label pattern {pattern:?}: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Uncompiled pattern: a label regex or a nested list of specs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSpec {
    Label(String),
    Chain(Vec<PatternSpec>),
}

impl PatternSpec {
    pub fn label(label: impl Into<String>) -> Self {
        PatternSpec::Label(label.into())
    }

    pub fn chain<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<PatternSpec>,
    {
        PatternSpec::Chain(items.into_iter().map(Into::into).collect())
    }

    /// Nesting depth: 0 for a label, 1 + deepest element for a list
    pub fn depth(&self) -> usize {
        match self {
            PatternSpec::Label(_) => 0,
            PatternSpec::Chain(items) => 1 + items.iter().map(Self::depth).max().unwrap_or(0),
        }
    }
}

impl From<&str> for PatternSpec {
    fn from(label: &str) -> Self {
        PatternSpec::Label(label.to_string())
    }
}

impl From<String> for PatternSpec {
    fn from(label: String) -> Self {
        PatternSpec::Label(label)
    }
}

impl From<Vec<PatternSpec>> for PatternSpec {
    fn from(items: Vec<PatternSpec>) -> Self {
        PatternSpec::Chain(items)
    }
}

/// A regex that must match an entire label
#[derive(Clone)]
pub struct LabelPattern {
    source: String,
    regex: Regex,
}

impl LabelPattern {
    pub fn new(source: &str) -> Result<Self, SpecError> {
        let regex = Regex::new(&format!("^(?:{})$", source)).map_err(|e| SpecError::InvalidRegex {
            pattern: source.to_string(),
            source: e,
        })?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    #[inline]
    pub fn is_match(&self, label: &str) -> bool {
        self.regex.is_match(label)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

// Compiled regex has no useful Debug; show the source
impl Debug for LabelPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("LabelPattern").field(&self.source).finish()
    }
}

// Compare pattern strings, not compiled regex
impl PartialEq for LabelPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// Compiled [`PatternSpec`] with the same shape
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    Label(LabelPattern),
    Chain(Vec<Pattern>),
}

impl Pattern {
    /// Parse and compile a textual spec such as `["VP", ["VB.*", "hit.*"]]`
    pub fn parse(text: &str) -> Result<Self, SpecError> {
        compile(&text.parse::<PatternSpec>()?)
    }

    /// Whether `label` is matched by this pattern
    ///
    /// A list used in label position matches if any of its elements does.
    pub fn is_match(&self, label: &str) -> bool {
        match self {
            Pattern::Label(pattern) => pattern.is_match(label),
            Pattern::Chain(items) => items.iter().any(|p| p.is_match(label)),
        }
    }

    /// Top-level elements; a bare label is a one-element list
    pub fn elements(&self) -> &[Pattern] {
        match self {
            Pattern::Label(_) => std::slice::from_ref(self),
            Pattern::Chain(items) => items,
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            Pattern::Label(_) => 0,
            Pattern::Chain(items) => 1 + items.iter().map(Self::depth).max().unwrap_or(0),
        }
    }
}

/// Compile every label of `spec` into an anchored regex, keeping its nesting
pub fn compile(spec: &PatternSpec) -> Result<Pattern, SpecError> {
    match spec {
        PatternSpec::Label(label) => Ok(Pattern::Label(LabelPattern::new(label)?)),
        PatternSpec::Chain(items) => items
            .iter()
            .map(compile)
            .collect::<Result<Vec<_>, _>>()
            .map(Pattern::Chain),
    }
}
