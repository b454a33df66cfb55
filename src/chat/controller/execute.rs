use std::sync::Arc;

use super::ChatController;
use crate::chat::state::ChatEvent;
use crate::chat::streamer::GenerationGuard;
use crate::log_error;

impl ChatController {
    pub(super) fn execute(&mut self, event: &ChatEvent) {
        match event {
            ChatEvent::SessionsChanged => {
                if let Err(e) = self.store.save_all(&self.state.sessions) {
                    log_error!("Failed to save chat sessions: {}", e);
                }
            }
            ChatEvent::SessionDeleted => {
                if let Err(e) = self.store.save_immediate(&self.state.sessions) {
                    log_error!("Failed to save chat sessions after delete: {}", e);
                }
            }
            ChatEvent::AnswerRequested { generation, message_id, query, chat_history } => {
                self.request_answer(*generation, message_id.clone(), query.clone(), chat_history.clone());
            }
            ChatEvent::StreamRequested { generation, message_id, text } => {
                let guard = GenerationGuard::new(Arc::clone(&self.generation), *generation);
                self.simulator.spawn(guard, message_id.clone(), text.clone());
            }
            // UI concerns, handled by the app
            ChatEvent::MessagesChanged | ChatEvent::InputCleared => {}
        }
    }
}
