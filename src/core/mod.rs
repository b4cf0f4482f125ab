//! Core modules for carlbot

pub mod rules;
pub mod matcher;
pub mod host;
pub mod api;

pub use rules::{build_builtin_table, builtin_table};
pub use matcher::{normalize, IntentMatcher};
pub use host::{ConversationHost, PendingReply, Submission, ThinkingDelay};
pub use api::{create_router, run_server};
