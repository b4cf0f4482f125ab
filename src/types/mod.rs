//! Core types for carlbot

mod quick_action;
mod resolution;
mod rule;
mod turn;

pub use quick_action::{quick_action, QuickAction, QUICK_ACTIONS};
pub use resolution::{MatchSource, Resolution};
pub use rule::{Rule, RuleFile, RuleSpec, RuleTable};
pub use turn::{Conversation, ConversationEvent, Role, Turn};
