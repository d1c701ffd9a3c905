use crate::domain::ChatId;

/// An empty allowlist admits every chat.
pub fn is_chat_allowed(chat_id: ChatId, allowed_chats: &[i64]) -> bool {
    allowed_chats.is_empty() || allowed_chats.contains(&chat_id.0)
}
