use std::sync::atomic::Ordering;

use chrono::Utc;

use super::ChatController;
use crate::chat::state::{ChatEvent, ChatIntent, ChatStateMachine};

impl ChatController {
    /// Run one intent through the state machine and carry out what it asks for.
    /// The events are returned so the caller can react to UI-level ones.
    pub fn dispatch(&mut self, intent: ChatIntent) -> Vec<ChatEvent> {
        let state = std::mem::take(&mut self.state);
        let (state, events) = ChatStateMachine::transition(state, intent, Utc::now());
        self.state = state;

        // Publish before spawning so new tasks and stale ones agree
        self.generation.store(self.state.generation, Ordering::SeqCst);

        for event in &events {
            self.execute(event);
        }

        events
    }
}
