//! Rule table model
//!
//! A rule pairs ordered patterns with candidate replies. The table is
//! plain data: order, coverage and candidate counts can be inspected
//! without running the matcher.

use std::collections::HashSet;
use std::path::Path;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{AssistantError, Result};

/// One entry of the ordered rule table
#[derive(Debug, Clone)]
pub struct Rule {
    name: String,
    patterns: Vec<Regex>,
    responses: Vec<String>,
}

impl Rule {
    /// Compile a rule. Patterns are case-insensitive.
    pub fn new<P, R>(name: impl Into<String>, patterns: P, responses: R) -> Result<Self>
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        let name = name.into();

        let patterns = patterns
            .into_iter()
            .map(|p| {
                RegexBuilder::new(p.as_ref())
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| AssistantError::InvalidPattern {
                        rule: name.clone(),
                        pattern: p.as_ref().to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        if patterns.is_empty() {
            return Err(AssistantError::EmptyPatterns { rule: name });
        }

        let responses: Vec<String> = responses.into_iter().map(Into::into).collect();
        if responses.is_empty() {
            return Err(AssistantError::EmptyResponses { rule: name });
        }

        Ok(Self { name, patterns, responses })
    }

    /// Rule identifier
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Patterns in evaluation order
    pub fn patterns(&self) -> &[Regex] {
        &self.patterns
    }

    /// Candidate replies (never empty)
    pub fn responses(&self) -> &[String] {
        &self.responses
    }

    /// Index of the first pattern matching already-normalized input
    pub fn first_match(&self, normalized: &str) -> Option<usize> {
        self.patterns.iter().position(|re| re.is_match(normalized))
    }

    fn to_spec(&self) -> RuleSpec {
        RuleSpec {
            name: self.name.clone(),
            patterns: self.patterns.iter().map(|re| re.as_str().to_string()).collect(),
            responses: self.responses.clone(),
        }
    }
}

/// Ordered rules plus the default reply set
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<Rule>,
    defaults: Vec<String>,
}

impl RuleTable {
    /// Build a table, rejecting duplicate names and an empty default set
    pub fn new<D>(rules: Vec<Rule>, defaults: D) -> Result<Self>
    where
        D: IntoIterator,
        D::Item: Into<String>,
    {
        let defaults: Vec<String> = defaults.into_iter().map(Into::into).collect();
        if defaults.is_empty() {
            return Err(AssistantError::EmptyDefaults);
        }

        let mut seen = HashSet::new();
        for rule in &rules {
            if !seen.insert(rule.name()) {
                return Err(AssistantError::DuplicateRule { rule: rule.name().to_string() });
            }
        }

        Ok(Self { rules, defaults })
    }

    /// Rules in declaration (= precedence) order
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Default reply set (never empty)
    pub fn defaults(&self) -> &[String] {
        &self.defaults
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when the table has no rules (every input falls back)
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Look up a rule by name
    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name() == name)
    }

    /// Precedence position of a rule
    pub fn position(&self, name: &str) -> Option<usize> {
        self.rules.iter().position(|r| r.name() == name)
    }

    // =========================================================================
    // Rule files
    // =========================================================================

    /// Build from the serializable form
    pub fn from_spec(spec: RuleFile) -> Result<Self> {
        let rules = spec
            .rules
            .into_iter()
            .map(|r| Rule::new(r.name, r.patterns, r.responses))
            .collect::<Result<Vec<_>>>()?;
        Self::new(rules, spec.defaults)
    }

    /// Serializable form, pattern sources preserved
    pub fn to_spec(&self) -> RuleFile {
        RuleFile {
            defaults: self.defaults.clone(),
            rules: self.rules.iter().map(Rule::to_spec).collect(),
        }
    }

    /// Parse a TOML rule file body
    pub fn from_toml_str(body: &str) -> Result<Self> {
        let spec: RuleFile = toml::from_str(body)?;
        Self::from_spec(spec)
    }

    /// Render as a TOML rule file body
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(&self.to_spec())?)
    }

    /// Load a TOML rule file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let body = std::fs::read_to_string(path).map_err(|source| AssistantError::RulesFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&body)
    }
}

/// On-disk rule file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleFile {
    /// Fallback replies
    pub defaults: Vec<String>,
    /// Rules in precedence order
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

/// On-disk rule entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub name: String,
    pub patterns: Vec<String>,
    pub responses: Vec<String>,
}

// =============================================================================
// TESTS
// =============================================================================
