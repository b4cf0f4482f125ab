//! Error types for carlbot
//!
//! Matching itself never fails. These cover building a rule table and
//! driving a conversation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from rule table construction and the conversation host.
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("rule '{rule}': pattern {pattern:?} does not compile: {source}")]
    InvalidPattern {
        rule: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("rule '{rule}' has no patterns")]
    EmptyPatterns { rule: String },

    #[error("rule '{rule}' has no responses")]
    EmptyResponses { rule: String },

    #[error("rule '{rule}' is declared more than once")]
    DuplicateRule { rule: String },

    #[error("default reply set is empty")]
    EmptyDefaults,

    #[error("cannot read rules file {path}: {source}")]
    RulesFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse rules file: {0}")]
    RulesParse(#[from] toml::de::Error),

    #[error("cannot serialize rule table: {0}")]
    RulesSerialize(#[from] toml::ser::Error),

    #[error("a reply is still pending")]
    ReplyPending,

    #[error("no quick action at index {0}")]
    UnknownQuickAction(usize),
}

/// Result type for carlbot operations.
pub type Result<T> = std::result::Result<T, AssistantError>;
