// Role-aware chat assistant for students, faculty and industry partners.
// Stateless: the caller sends the running history with every message.

pub mod handlers;
pub mod prompts;

use serde::{Deserialize, Serialize};

use crate::llm_client::{ConversationTurn, TurnRole};

/// Most recent turns kept from the caller's history.
pub const MAX_HISTORY_TURNS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Student,
    Faculty,
    Industry,
}

/// Speaker of a history message. The web client calls the assistant "model".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Model,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

/// Converts the caller's history plus the new message into API turns.
///
/// Keeps the last `MAX_HISTORY_TURNS` history entries, drops blank ones,
/// merges consecutive same-speaker entries, and skips leading assistant
/// turns, since the conversation must open with the user.
pub fn build_turns(history: &[ChatMessage], message: &str) -> Vec<ConversationTurn> {
    let start = history.len().saturating_sub(MAX_HISTORY_TURNS);
    let mut turns: Vec<ConversationTurn> = Vec::new();

    let incoming = history[start..]
        .iter()
        .map(|m| (to_turn_role(m.role), m.content.trim()))
        .chain(std::iter::once((TurnRole::User, message.trim())));

    for (role, content) in incoming {
        if content.is_empty() {
            continue;
        }
        if turns.is_empty() && role == TurnRole::Assistant {
            continue;
        }
        match turns.last_mut() {
            Some(last) if last.role == role => {
                last.content.push_str("\n\n");
                last.content.push_str(content);
            }
            _ => turns.push(ConversationTurn {
                role,
                content: content.to_string(),
            }),
        }
    }

    turns
}

fn to_turn_role(role: MessageRole) -> TurnRole {
    match role {
        MessageRole::User => TurnRole::User,
        MessageRole::Model => TurnRole::Assistant,
    }
}
