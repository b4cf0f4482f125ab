//! Result of resolving an input against the rule table

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

/// Where a reply comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchSource {
    /// First matching rule in table order
    Rule {
        /// Position in the table
        index: usize,
        /// Rule name
        name: String,
        /// Index of the pattern that matched
        pattern: usize,
    },
    /// No rule matched
    Default,
}

impl MatchSource {
    /// Matched rule name, if any
    pub fn rule_name(&self) -> Option<&str> {
        match self {
            MatchSource::Rule { name, .. } => Some(name),
            MatchSource::Default => None,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, MatchSource::Default)
    }
}

impl std::fmt::Display for MatchSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchSource::Rule { index, name, pattern } => {
                write!(f, "{}#{} (pattern {})", name, index, pattern)
            }
            MatchSource::Default => write!(f, "default"),
        }
    }
}

/// Selected category and its candidates, before the random pick
#[derive(Debug, Clone)]
pub struct Resolution<'a> {
    pub source: MatchSource,
    candidates: &'a [String],
}

impl<'a> Resolution<'a> {
    /// `candidates` must be non-empty; rule tables guarantee this.
    pub(crate) fn new(source: MatchSource, candidates: &'a [String]) -> Self {
        debug_assert!(!candidates.is_empty());
        Self { source, candidates }
    }

    /// All valid replies for this input
    pub fn candidates(&self) -> &'a [String] {
        self.candidates
    }

    /// Uniform pick among the candidates
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> &'a str {
        self.candidates
            .choose(rng)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Pinned pick, wrapping around the candidate count
    pub fn reply_at(&self, index: usize) -> &'a str {
        let candidates = self.candidates;
        &candidates[index % candidates.len()]
    }
}
