//! Request classification predicates.
//!
//! # Responsibilities
//! - Match a user-agent against crawler/bot signatures (case-insensitive substring)
//! - Match a URI against static-asset extensions (case-insensitive suffix)
//! - Match a query string against a literal marker (case-sensitive substring)
//!
//! # Design Decisions
//! - Patterns come from configuration and are compiled once per handler
//! - Configured values are literals; regex metacharacters are escaped
//! - An empty pattern list never matches

use regex::{Regex, RegexBuilder};
use thiserror::Error;

/// Error raised while compiling a matcher from configuration.
#[derive(Debug, Error)]
pub enum MatcherError {
    #[error("failed to compile {kind} matcher: {source}")]
    Build {
        kind: &'static str,
        #[source]
        source: regex::Error,
    },
}

/// Trait for matching a single request component.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if `value` satisfies this condition.
    fn matches(&self, value: &str) -> bool;
}

/// Matches when any signature occurs anywhere in the value, ignoring case.
#[derive(Debug, Clone)]
pub struct SignatureMatcher {
    regex: Option<Regex>,
}

impl SignatureMatcher {
    pub fn new<I, S>(signatures: I) -> Result<Self, MatcherError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let alternatives = escaped(signatures);
        if alternatives.is_empty() {
            return Ok(Self { regex: None });
        }

        let regex = RegexBuilder::new(&alternatives.join("|"))
            .case_insensitive(true)
            .build()
            .map_err(|source| MatcherError::Build {
                kind: "signature",
                source,
            })?;
        Ok(Self { regex: Some(regex) })
    }
}

impl Matcher for SignatureMatcher {
    fn matches(&self, value: &str) -> bool {
        self.regex
            .as_ref()
            .map(|regex| regex.is_match(value))
            .unwrap_or(false)
    }
}

/// Matches when the value ends in `.<extension>` for any listed extension,
/// ignoring case.
#[derive(Debug, Clone)]
pub struct ExtensionMatcher {
    regex: Option<Regex>,
}

impl ExtensionMatcher {
    pub fn new<I, S>(extensions: I) -> Result<Self, MatcherError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let alternatives = escaped(
            extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim_start_matches('.').to_string()),
        );
        if alternatives.is_empty() {
            return Ok(Self { regex: None });
        }

        let pattern = format!(r"\.(?:{})$", alternatives.join("|"));
        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| MatcherError::Build {
                kind: "extension",
                source,
            })?;
        Ok(Self { regex: Some(regex) })
    }
}

impl Matcher for ExtensionMatcher {
    fn matches(&self, value: &str) -> bool {
        self.regex
            .as_ref()
            .map(|regex| regex.is_match(value))
            .unwrap_or(false)
    }
}

/// Matches when the needle occurs in the value, exactly as written.
#[derive(Debug, Clone)]
pub struct SubstringMatcher {
    needle: String,
}

impl SubstringMatcher {
    pub fn new(needle: impl Into<String>) -> Self {
        Self {
            needle: needle.into(),
        }
    }
}

impl Matcher for SubstringMatcher {
    fn matches(&self, value: &str) -> bool {
        !self.needle.is_empty() && value.contains(&self.needle)
    }
}

fn escaped<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .map(|value| value.as_ref().trim().to_string())
        .filter(|value| !value.is_empty())
        .map(|value| regex::escape(&value))
        .collect()
}
