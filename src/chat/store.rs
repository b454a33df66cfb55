// src/chat/store.rs
// Persisted collection of chat sessions, kept as one JSON array in app_state

use super::session::ChatSession;
use crate::error::Result;
use crate::util::database::Database;
use crate::{log_debug, log_error};

const SESSIONS_KEY: &str = "chat_sessions";

#[derive(Debug, Clone)]
pub struct SessionStore {
    db: Database,
}

impl SessionStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Stored sessions, or an empty list when nothing usable is stored.
    pub fn load(&self) -> Vec<ChatSession> {
        let raw = match self.db.get_state(SESSIONS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                log_error!("Failed to read chat sessions: {}", e);
                return Vec::new();
            }
        };

        let mut sessions: Vec<ChatSession> = match serde_json::from_str(&raw) {
            Ok(sessions) => sessions,
            Err(e) => {
                log_error!("Failed to parse stored chat sessions: {}", e);
                return Vec::new();
            }
        };

        // A stream cannot resume after a restart
        for message in sessions.iter_mut().flat_map(|s| s.messages.iter_mut()) {
            message.is_streaming = false;
        }

        log_debug!("Loaded {} chat sessions", sessions.len());
        sessions
    }

    /// Regular persistence path. An empty list is never written here so a
    /// start-up with nothing loaded yet cannot wipe stored history.
    pub fn save_all(&self, sessions: &[ChatSession]) -> Result<()> {
        if sessions.is_empty() {
            return Ok(());
        }
        self.write(sessions)
    }

    /// Always writes, including an empty list.
    pub fn save_immediate(&self, sessions: &[ChatSession]) -> Result<()> {
        self.write(sessions)
    }

    fn write(&self, sessions: &[ChatSession]) -> Result<()> {
        let json = serde_json::to_string(sessions)?;
        self.db.save_state(SESSIONS_KEY, &json)
    }
}
