use std::sync::Arc;

use super::ChatController;
use crate::chat::state::ChatIntent;
use crate::event::{AppEvent, Event};
use crate::{log_debug, log_error};

impl ChatController {
    /// Ask the backend in the background. The answer comes back through the
    /// event channel whether or not the conversation has moved on meanwhile.
    pub(super) fn request_answer(
        &self,
        generation: u64,
        message_id: String,
        query: String,
        chat_history: Vec<String>,
    ) {
        let backend = Arc::clone(&self.backend);
        let sender = self.sender.clone();

        tokio::spawn(async move {
            log_debug!("Requesting answer for message {}", message_id);

            let result = backend
                .answer(&query, &chat_history)
                .await
                .map_err(|e| {
                    log_error!("RAG request failed: {}", e);
                    e.to_string()
                });

            let _ = sender.send(Event::App(AppEvent::Chat(ChatIntent::AnswerReceived {
                generation,
                message_id,
                result,
            })));
        });
    }
}
