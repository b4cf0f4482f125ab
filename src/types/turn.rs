//! Turn model for the chat window
//!
//! - Turn = one message, user or assistant, immutable once created
//! - Conversation = append-only log, replaced wholesale on reset

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{GREETING, RESET_MESSAGE};

/// Who wrote a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        write!(f, "{}", name)
    }
}

/// A single message in the log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Position-independent identity, unique within a conversation
    pub id: u64,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    fn new(id: u64, role: Role, content: impl Into<String>) -> Self {
        Self {
            id,
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Something that happened to a conversation, pushed to live listeners
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "turn", rename_all = "snake_case")]
pub enum ConversationEvent {
    /// A turn was appended
    Turn(Turn),
    /// The log was replaced by this single turn
    Reset(Turn),
}

/// Ordered turn log
#[derive(Debug)]
pub struct Conversation {
    turns: Vec<Turn>,
    next_id: u64,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    /// New conversation opened with the greeting turn
    pub fn new() -> Self {
        Self::opened_with(GREETING)
    }

    fn opened_with(text: &str) -> Self {
        let mut conversation = Self {
            turns: Vec::new(),
            next_id: 0,
        };
        conversation.push(Role::Assistant, text);
        conversation
    }

    /// Append a user turn
    pub fn push_user(&mut self, text: impl Into<String>) -> Turn {
        self.push(Role::User, text)
    }

    /// Append an assistant turn
    pub fn push_assistant(&mut self, text: impl Into<String>) -> Turn {
        self.push(Role::Assistant, text)
    }

    fn push(&mut self, role: Role, text: impl Into<String>) -> Turn {
        let turn = Turn::new(self.next_id, role, text);
        self.next_id += 1;
        self.turns.push(turn.clone());
        turn
    }

    /// Replace the whole log with the reset acknowledgement.
    /// Ids keep increasing so a stale id never aliases a new turn.
    pub fn reset(&mut self) -> Turn {
        self.turns.clear();
        self.push(Role::Assistant, RESET_MESSAGE)
    }

    /// All turns, oldest first
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Most recent turn
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_conversation_has_greeting() {
        let conv = Conversation::new();
        assert_eq!(conv.len(), 1);
        let first = &conv.turns()[0];
        assert_eq!(first.role, Role::Assistant);
        assert_eq!(first.content, GREETING);
    }

    #[test]
    fn test_turns_append_in_order() {
        let mut conv = Conversation::new();
        let user = conv.push_user("who is carl");
        let reply = conv.push_assistant("Carl builds things.");

        assert_eq!(conv.len(), 3);
        assert!(user.id < reply.id);
        assert_eq!(conv.turns()[1], user);
        assert_eq!(conv.last(), Some(&reply));
        assert!(user.created_at <= reply.created_at);
    }

    #[test]
    fn test_reset_leaves_single_acknowledgement() {
        let mut conv = Conversation::new();
        conv.push_user("hello");
        conv.push_assistant("hi");

        let turn = conv.reset();
        assert_eq!(conv.len(), 1);
        assert_eq!(turn.role, Role::Assistant);
        assert_eq!(turn.content, RESET_MESSAGE);
        assert_eq!(conv.turns()[0], turn);
    }

    #[test]
    fn test_ids_survive_reset() {
        let mut conv = Conversation::new();
        let before = conv.push_user("hello");
        let after = conv.reset();
        assert!(after.id > before.id);
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&Role::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }

    #[test]
    fn test_event_serialization() {
        let mut conv = Conversation::new();
        let turn = conv.push_user("hey");
        let json = serde_json::to_value(ConversationEvent::Turn(turn)).unwrap();
        assert_eq!(json["event"], "turn");
        assert_eq!(json["turn"]["role"], "user");
        assert_eq!(json["turn"]["content"], "hey");
    }
}
