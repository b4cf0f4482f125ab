//! carlbot: the assistant behind the portfolio desktop's chat window
//!
//! Input → IntentMatcher (ordered rule table) → reply, hosted by a
//! ConversationHost that owns the turn log and the "typing" delay.

pub mod core;
pub mod error;
pub mod types;

pub use error::{AssistantError, Result};

// =============================================================================
// CONVERSATION STRINGS
// =============================================================================

/// First assistant turn of every new conversation
pub const GREETING: &str =
    "Hi! I'm Carl's assistant. Ask me about his skills, projects, experience or how to get in touch.";

/// Sole turn left in the log after a reset (not produced by the matcher)
pub const RESET_MESSAGE: &str =
    "Chat cleared! What would you like to know about Carl?";

// =============================================================================
// THINKING DELAY [ms]
// =============================================================================

/// Lower bound of the simulated typing delay
pub const THINKING_DELAY_MIN_MS: u64 = 600;

/// Upper bound of the simulated typing delay
pub const THINKING_DELAY_MAX_MS: u64 = 1500;

// =============================================================================
// SESSIONS
// =============================================================================

/// Capacity of the per-conversation event channel
pub const EVENT_CHANNEL_CAPACITY: usize = 100;

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
