//! Conversation host
//!
//! Owns one conversation's turn log. A submission appends the user turn
//! at once, then a spawned task waits out a random "typing" delay, asks
//! the matcher, and appends the assistant turn. Only one reply may be
//! pending at a time. Reset aborts a pending reply so nothing stale lands
//! in the fresh log.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::{broadcast, Mutex};
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info, warn};

use crate::core::IntentMatcher;
use crate::error::{AssistantError, Result};
use crate::types::{quick_action, Conversation, ConversationEvent, Turn};
use crate::{EVENT_CHANNEL_CAPACITY, THINKING_DELAY_MAX_MS, THINKING_DELAY_MIN_MS};

/// Range the simulated typing delay is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThinkingDelay {
    min_ms: u64,
    max_ms: u64,
}

impl Default for ThinkingDelay {
    fn default() -> Self {
        Self::new(THINKING_DELAY_MIN_MS, THINKING_DELAY_MAX_MS)
    }
}

impl ThinkingDelay {
    /// Inclusive range; bounds are swapped if given backwards
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min_ms: min_ms.min(max_ms),
            max_ms: min_ms.max(max_ms),
        }
    }

    /// Always the same delay
    pub fn fixed(ms: u64) -> Self {
        Self::new(ms, ms)
    }

    /// Reply as soon as the task is scheduled
    pub fn none() -> Self {
        Self::fixed(0)
    }

    /// Draw a delay
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        Duration::from_millis(rng.gen_range(self.min_ms..=self.max_ms))
    }

    pub fn min_ms(&self) -> u64 {
        self.min_ms
    }

    pub fn max_ms(&self) -> u64 {
        self.max_ms
    }
}

/// A reply that has not been appended yet
#[derive(Debug)]
pub struct PendingReply {
    handle: JoinHandle<Option<Turn>>,
}

impl PendingReply {
    /// Wait for the assistant turn. `None` if the reply was cancelled by a reset.
    pub async fn wait(self) -> Option<Turn> {
        self.handle.await.ok().flatten()
    }
}

/// Result of an accepted submission
#[derive(Debug)]
pub struct Submission {
    /// The user turn, already in the log
    pub user_turn: Turn,
    /// The assistant reply, once the delay has passed
    pub reply: PendingReply,
}

#[derive(Debug)]
struct HostState {
    conversation: Conversation,
    pending: Option<AbortHandle>,
}

/// One conversation: turn log, reply timing and live events
#[derive(Debug)]
pub struct ConversationHost {
    matcher: Arc<IntentMatcher>,
    delay: ThinkingDelay,
    state: Arc<Mutex<HostState>>,
    events: broadcast::Sender<ConversationEvent>,
}

impl ConversationHost {
    /// New conversation, opened with the greeting turn
    pub fn new(matcher: Arc<IntentMatcher>, delay: ThinkingDelay) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            matcher,
            delay,
            state: Arc::new(Mutex::new(HostState {
                conversation: Conversation::new(),
                pending: None,
            })),
            events,
        }
    }

    /// Submit user text. Rejected while a reply is pending.
    pub async fn submit(&self, text: &str) -> Result<Submission> {
        let mut state = self.state.lock().await;
        if state.pending.is_some() {
            warn!("submission rejected, reply pending");
            return Err(AssistantError::ReplyPending);
        }

        let user_turn = state.conversation.push_user(text);
        let _ = self.events.send(ConversationEvent::Turn(user_turn.clone()));

        let wait = self.delay.sample(&mut rand::thread_rng());
        debug!(turn = user_turn.id, delay_ms = wait.as_millis() as u64, "reply scheduled");

        let handle = tokio::spawn(reply_after(
            Arc::clone(&self.matcher),
            Arc::clone(&self.state),
            self.events.clone(),
            text.to_string(),
            wait,
        ));
        state.pending = Some(handle.abort_handle());

        Ok(Submission {
            user_turn,
            reply: PendingReply { handle },
        })
    }

    /// Submit a quick action's prompt through the normal path
    pub async fn quick_action(&self, index: usize) -> Result<Submission> {
        let action = quick_action(index).ok_or(AssistantError::UnknownQuickAction(index))?;
        debug!(label = action.label, "quick action");
        self.submit(action.prompt).await
    }

    /// Clear the log to the reset acknowledgement, cancelling any pending reply
    pub async fn reset(&self) -> Turn {
        let mut state = self.state.lock().await;
        if let Some(pending) = state.pending.take() {
            pending.abort();
            info!("pending reply cancelled by reset");
        }
        let turn = state.conversation.reset();
        let _ = self.events.send(ConversationEvent::Reset(turn.clone()));
        turn
    }

    /// Cancel any pending reply, leaving the log as it is.
    /// Used when the conversation is discarded.
    pub async fn close(&self) {
        if let Some(pending) = self.state.lock().await.pending.take() {
            pending.abort();
            debug!("pending reply cancelled on close");
        }
    }

    /// Snapshot of the log, oldest first
    pub async fn turns(&self) -> Vec<Turn> {
        self.state.lock().await.conversation.turns().to_vec()
    }

    /// True while a reply is scheduled but not yet appended
    pub async fn is_pending(&self) -> bool {
        self.state.lock().await.pending.is_some()
    }

    /// Live events for this conversation
    pub fn subscribe(&self) -> broadcast::Receiver<ConversationEvent> {
        self.events.subscribe()
    }

    pub fn matcher(&self) -> &IntentMatcher {
        &self.matcher
    }
}

async fn reply_after(
    matcher: Arc<IntentMatcher>,
    state: Arc<Mutex<HostState>>,
    events: broadcast::Sender<ConversationEvent>,
    text: String,
    wait: Duration,
) -> Option<Turn> {
    tokio::time::sleep(wait).await;

    let mut state = state.lock().await;
    let reply = matcher.respond(&text);
    let turn = state.conversation.push_assistant(reply);
    state.pending = None;
    let _ = events.send(ConversationEvent::Turn(turn.clone()));
    Some(turn)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;
    use crate::RESET_MESSAGE;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn host(delay: ThinkingDelay) -> ConversationHost {
        ConversationHost::new(Arc::new(IntentMatcher::new()), delay)
    }

    #[test]
    fn test_delay_bounds() {
        let delay = ThinkingDelay::new(900, 100);
        assert_eq!((delay.min_ms(), delay.max_ms()), (100, 900));

        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let d = delay.sample(&mut rng);
            assert!(d >= Duration::from_millis(100) && d <= Duration::from_millis(900));
        }
        assert_eq!(ThinkingDelay::none().sample(&mut rng), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_user_turn_is_immediate() {
        let host = host(ThinkingDelay::fixed(200));
        let submission = host.submit("who is carl").await.unwrap();

        let turns = host.turns().await;
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[1], submission.user_turn);
        assert_eq!(turns[1].role, Role::User);
        assert!(host.is_pending().await);
    }

    #[tokio::test]
    async fn test_reply_is_appended() {
        let host = host(ThinkingDelay::fixed(10));
        let submission = host.submit("who is carl").await.unwrap();
        let reply = submission.reply.wait().await.unwrap();

        assert_eq!(reply.role, Role::Assistant);
        let candidates = host.matcher().table().get("who_is_carl").unwrap().responses();
        assert!(candidates.contains(&reply.content));

        let turns = host.turns().await;
        assert_eq!(turns.len(), 3);
        assert_eq!(turns.last(), Some(&reply));
        assert!(!host.is_pending().await);
    }

    #[tokio::test]
    async fn test_submit_while_pending_rejected() {
        let host = host(ThinkingDelay::fixed(200));
        let first = host.submit("hello").await.unwrap();
        let err = host.submit("again").await.unwrap_err();
        assert!(matches!(err, AssistantError::ReplyPending));

        first.reply.wait().await.unwrap();
        assert!(host.submit("again").await.is_ok());
    }

    #[tokio::test]
    async fn test_reset_cancels_pending_reply() {
        let host = host(ThinkingDelay::fixed(100));
        let submission = host.submit("who is carl").await.unwrap();

        let turn = host.reset().await;
        assert_eq!(turn.content, RESET_MESSAGE);
        assert!(submission.reply.wait().await.is_none());

        let turns = host.turns().await;
        assert_eq!(turns, vec![turn]);
        assert!(!host.is_pending().await);
    }

    #[tokio::test]
    async fn test_close_cancels_pending_reply() {
        let host = host(ThinkingDelay::fixed(100));
        let submission = host.submit("who is carl").await.unwrap();

        host.close().await;
        assert!(submission.reply.wait().await.is_none());
        assert!(!host.is_pending().await);
        // Log is kept: greeting + user turn
        assert_eq!(host.turns().await.len(), 2);
    }

    #[tokio::test]
    async fn test_quick_action_uses_submit_path() {
        let host = host(ThinkingDelay::none());
        let submission = host.quick_action(0).await.unwrap();
        assert_eq!(submission.user_turn.content, crate::types::QUICK_ACTIONS[0].prompt);
        assert!(submission.reply.wait().await.is_some());

        let err = host.quick_action(99).await.unwrap_err();
        assert!(matches!(err, AssistantError::UnknownQuickAction(99)));
    }

    #[tokio::test]
    async fn test_events_follow_log() {
        let host = host(ThinkingDelay::none());
        let mut rx = host.subscribe();

        let submission = host.submit("thanks").await.unwrap();
        let reply = submission.reply.wait().await.unwrap();
        let reset = host.reset().await;

        match rx.recv().await.unwrap() {
            ConversationEvent::Turn(t) => assert_eq!(t, submission.user_turn),
            other => panic!("unexpected {:?}", other),
        }
        match rx.recv().await.unwrap() {
            ConversationEvent::Turn(t) => assert_eq!(t, reply),
            other => panic!("unexpected {:?}", other),
        }
        match rx.recv().await.unwrap() {
            ConversationEvent::Reset(t) => assert_eq!(t, reset),
            other => panic!("unexpected {:?}", other),
        }
    }
}
