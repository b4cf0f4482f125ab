//! Quick actions: canned prompts offered as buttons under the chat

use serde::Serialize;

/// A button that submits a fixed prompt through the normal submit path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuickAction {
    pub label: &'static str,
    pub prompt: &'static str,
}

/// Buttons in display order
pub const QUICK_ACTIONS: &[QuickAction] = &[
    QuickAction { label: "👋 About Carl", prompt: "Who is Carl?" },
    QuickAction { label: "🛠 Skills", prompt: "What are his skills?" },
    QuickAction { label: "📁 Projects", prompt: "Show me his projects" },
    QuickAction { label: "💼 Experience", prompt: "Tell me about his experience" },
    QuickAction { label: "✉️ Contact", prompt: "How can I contact him?" },
];

/// Quick action by position
pub fn quick_action(index: usize) -> Option<&'static QuickAction> {
    QUICK_ACTIONS.get(index)
}
