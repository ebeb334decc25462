//! Coordinate pattern matching
//!
//! Architectural Principle: Service Layer - one matcher for every coordinate field
//! - Patterns are compiled once, case-insensitive, whitespace/comment tolerant
//! - Matching is always a full-string match, never a substring search
//! - Absent values are resolved through a single three-valued evaluation

use crate::domain::violations::{EnforcerError, EnforcerResult};
use regex::{Regex, RegexBuilder};
use std::fmt;

/// Pattern used when none is supplied
pub const MATCH_ANYTHING: &str = ".*";

/// Outcome of evaluating one optional value against a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMatch {
    /// The value was absent; the caller's null policy decides
    Absent,
    Matched,
    Mismatched,
}

impl FieldMatch {
    /// Collapse into a boolean using the supplied null policy
    pub fn accepts(self, accept_absent: bool) -> bool {
        match self {
            Self::Absent => accept_absent,
            Self::Matched => true,
            Self::Mismatched => false,
        }
    }
}

/// A compiled, full-match, case-insensitive pattern for one coordinate field
#[derive(Debug, Clone)]
pub struct CoordinatePattern {
    source: String,
    regex: Regex,
}

impl CoordinatePattern {
    /// Compile a pattern; `None` yields the match-anything pattern
    pub fn new(pattern: Option<&str>) -> EnforcerResult<Self> {
        Self::build(pattern.unwrap_or(MATCH_ANYTHING), true)
    }

    /// Compile a required pattern string
    pub fn compile(pattern: &str) -> EnforcerResult<Self> {
        Self::new(Some(pattern))
    }

    /// Compile a group-id list entry: case-sensitive, whitespace significant, still full-match
    pub fn group_id(pattern: &str) -> EnforcerResult<Self> {
        Self::build(pattern, false)
    }

    /// Pattern accepting any present value
    pub fn any() -> Self {
        Self::new(None).expect("match-anything pattern is a valid literal regex")
    }

    fn build(source: &str, archetype_flags: bool) -> EnforcerResult<Self> {
        let invalid = |e: regex::Error| EnforcerError::config(format!("Invalid pattern '{source}': {e}"));

        // Validate on its own first, so an unbalanced `)` or a trailing `\` cannot escape the anchors.
        RegexBuilder::new(source)
            .case_insensitive(archetype_flags)
            .ignore_whitespace(archetype_flags)
            .build()
            .map_err(invalid)?;

        // The newline keeps a trailing `#` comment from swallowing the anchor.
        let anchored = if archetype_flags { format!("^(?:{source}\n)$") } else { format!("^(?:{source})$") };
        let regex = RegexBuilder::new(&anchored)
            .case_insensitive(archetype_flags)
            .ignore_whitespace(archetype_flags)
            .build()
            .map_err(invalid)?;

        Ok(Self { source: source.to_string(), regex })
    }

    /// Compile a list of pattern strings, failing on the first malformed one
    pub fn compile_all<S: AsRef<str>>(patterns: &[S]) -> EnforcerResult<Vec<Self>> {
        patterns.iter().map(|p| Self::compile(p.as_ref())).collect()
    }

    /// Compile a group-id list, failing on the first malformed entry
    pub fn group_ids<S: AsRef<str>>(patterns: &[S]) -> EnforcerResult<Vec<Self>> {
        patterns.iter().map(|p| Self::group_id(p.as_ref())).collect()
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Three-valued evaluation of an optional value
    pub fn evaluate(&self, value: Option<&str>) -> FieldMatch {
        match value {
            None => FieldMatch::Absent,
            Some(value) if self.regex.is_match(value) => FieldMatch::Matched,
            Some(_) => FieldMatch::Mismatched,
        }
    }

    /// Full-string match; absent values resolve to `accept_absent`
    pub fn matches(&self, value: Option<&str>, accept_absent: bool) -> bool {
        self.evaluate(value).accepts(accept_absent)
    }
}

impl fmt::Display for CoordinatePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl PartialEq for CoordinatePattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for CoordinatePattern {}

/// Whether any of the patterns fully matches the (trimmed) value
pub fn any_matches(patterns: &[CoordinatePattern], value: Option<&str>) -> bool {
    match value {
        Some(value) => {
            let value = value.trim();
            patterns.iter().any(|p| p.evaluate(Some(value)) == FieldMatch::Matched)
        }
        None => false,
    }
}

/// Evaluate/ignore group-id lists deciding which projects and dependencies get checked
#[derive(Debug, Clone, Default)]
pub struct GroupIdFilter {
    evaluate: Vec<CoordinatePattern>,
    ignore: Vec<CoordinatePattern>,
}

impl GroupIdFilter {
    pub fn new<S: AsRef<str>>(evaluate: &[S], ignore: &[S]) -> EnforcerResult<Self> {
        Ok(Self {
            evaluate: CoordinatePattern::group_ids(evaluate)?,
            ignore: CoordinatePattern::group_ids(ignore)?,
        })
    }

    /// Filter with only an ignore list; every group-id is considered for evaluation
    pub fn ignoring<S: AsRef<str>>(ignore: &[S]) -> EnforcerResult<Self> {
        Ok(Self { evaluate: vec![CoordinatePattern::any()], ignore: CoordinatePattern::group_ids(ignore)? })
    }

    pub fn ignore_patterns(&self) -> &[CoordinatePattern] {
        &self.ignore
    }

    pub fn evaluate_patterns(&self) -> &[CoordinatePattern] {
        &self.evaluate
    }

    /// Group-id matches one of the evaluate patterns
    pub fn is_evaluated(&self, group_id: Option<&str>) -> bool {
        any_matches(&self.evaluate, group_id)
    }

    /// Group-id matches one of the ignore patterns
    pub fn is_ignored(&self, group_id: Option<&str>) -> bool {
        any_matches(&self.ignore, group_id)
    }

    /// Evaluated and not explicitly ignored
    pub fn admits(&self, group_id: Option<&str>) -> bool {
        self.is_evaluated(group_id) && !self.is_ignored(group_id)
    }
}
