// src/chat/session.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::message::Message;
use crate::util::string::StringUtils;

/// Longest title taken from the first message before "..." is appended
pub const TITLE_MAX_CHARS: usize = 50;

/// One persisted conversation thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: String,
    pub title: String,
    pub last_message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl ChatSession {
    pub fn new(first_message: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: Self::title_from(first_message),
            last_message: first_message.to_string(),
            timestamp,
            messages: Vec::new(),
        }
    }

    pub fn title_from(first_message: &str) -> String {
        StringUtils::truncate_chars(first_message.trim(), TITLE_MAX_CHARS)
    }

    /// Mirror the active message list into this session.
    pub fn refresh(&mut self, messages: &[Message], now: DateTime<Utc>) {
        self.messages = messages.to_vec();
        self.touch(now);
    }

    /// Recompute `last_message` from the stored messages and bump the timestamp.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        if let Some(last) = self.messages.iter().rev().find(|m| !m.content.is_empty()) {
            self.last_message = last.content.clone();
        }
        self.timestamp = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_title_is_untouched() {
        let session = ChatSession::new("What is Section 2?", Utc::now());
        assert_eq!(session.title, "What is Section 2?");
    }

    #[test]
    fn test_long_title_is_truncated() {
        let text = "a".repeat(60);
        let title = ChatSession::title_from(&text);
        assert_eq!(title, format!("{}...", "a".repeat(50)));

        let exact = "b".repeat(50);
        assert_eq!(ChatSession::title_from(&exact), exact);
    }

    #[test]
    fn test_refresh_skips_empty_placeholder() {
        let now = Utc::now();
        let mut session = ChatSession::new("hello", now);
        let messages = vec![
            Message::new_user("hello there".to_string(), now),
            Message::new_assistant_placeholder(now),
        ];

        let later = now + chrono::Duration::seconds(5);
        session.refresh(&messages, later);

        assert_eq!(session.messages.len(), 2);
        assert_eq!(session.last_message, "hello there");
        assert_eq!(session.timestamp, later);
    }
}
