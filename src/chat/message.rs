// src/chat/message.rs
// Conversation messages and the display projection of retrieved documents

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::document::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// Display projection of a [`Document`]. `relevance` is a synthetic,
/// order-based score, not a similarity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub id: String,
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub relevance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    #[serde(rename = "type")]
    pub role: MessageRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Source>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<Document>>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub is_streaming: bool,
}

impl Message {
    pub fn new_user(content: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: MessageRole::User,
            content,
            sources: None,
            documents: None,
            timestamp,
            is_streaming: false,
        }
    }

    /// Empty assistant message that the stream will fill in.
    pub fn new_assistant_placeholder(timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: MessageRole::Assistant,
            content: String::new(),
            sources: None,
            documents: None,
            timestamp,
            is_streaming: true,
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }

    /// Assistant message still waiting for its first word
    pub fn is_awaiting_content(&self) -> bool {
        self.role == MessageRole::Assistant && self.is_streaming && self.content.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_shape() {
        let now = Utc::now();
        let message = Message::new_user("hi".to_string(), now);
        let value = serde_json::to_value(&message).unwrap();

        assert_eq!(value["type"], "user");
        assert_eq!(value["isStreaming"], false);
        assert!(value.get("sources").is_none());
        assert!(value["timestamp"].is_string());

        let back: Message = serde_json::from_value(value).unwrap();
        assert_eq!(back, message);
    }

    #[test]
    fn test_placeholder_is_awaiting_content() {
        let placeholder = Message::new_assistant_placeholder(Utc::now());
        assert!(placeholder.is_awaiting_content());
        assert!(!placeholder.is_user());
        assert_ne!(placeholder.id, Message::new_assistant_placeholder(Utc::now()).id);
    }
}
