//! Intent matcher: first-match-wins over the ordered rule table
//!
//! The only preprocessing is trim + lowercase. The first rule (in table
//! order) with any matching pattern wins; if none match, the default
//! reply set is used. The reply within the chosen set is picked uniformly
//! at random, with the random source injectable.

use std::sync::Arc;

use rand::Rng;
use tracing::debug;

use crate::core::rules::builtin_table;
use crate::types::{MatchSource, Resolution, RuleTable};

/// Matcher over an immutable, shareable rule table
#[derive(Debug, Clone)]
pub struct IntentMatcher {
    table: Arc<RuleTable>,
}

impl Default for IntentMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentMatcher {
    /// Matcher over the built-in table
    pub fn new() -> Self {
        Self { table: builtin_table() }
    }

    /// Matcher over a custom table
    pub fn with_table(table: impl Into<Arc<RuleTable>>) -> Self {
        Self { table: table.into() }
    }

    /// The rule table
    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    /// Select the reply category for an input, without picking a reply
    pub fn resolve(&self, input: &str) -> Resolution<'_> {
        let normalized = normalize(input);

        for (index, rule) in self.table.rules().iter().enumerate() {
            if let Some(pattern) = rule.first_match(&normalized) {
                let source = MatchSource::Rule {
                    index,
                    name: rule.name().to_string(),
                    pattern,
                };
                return Resolution::new(source, rule.responses());
            }
        }

        Resolution::new(MatchSource::Default, self.table.defaults())
    }

    /// Reply to an input using the given random source
    pub fn respond_with<R: Rng + ?Sized>(&self, input: &str, rng: &mut R) -> String {
        let resolution = self.resolve(input);
        let reply = resolution.pick(rng);
        debug!(source = %resolution.source, candidates = resolution.candidates().len(), "matched");
        reply.to_string()
    }

    /// Reply to an input
    pub fn respond(&self, input: &str) -> String {
        self.respond_with(input, &mut rand::thread_rng())
    }
}

/// Trim and lowercase
pub fn normalize(input: &str) -> String {
    input.trim().to_lowercase()
}

// =============================================================================
// TESTS
// =============================================================================
