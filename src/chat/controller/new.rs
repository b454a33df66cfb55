use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use chrono::Utc;

use super::ChatController;
use crate::chat::{
    state::{ChatIntent, ChatState, ChatStateMachine},
    store::SessionStore,
    streamer::StreamSimulator,
};
use crate::event::EventSender;
use crate::util::config::StreamConfig;
use crate::util::rag::RagBackend;
use crate::log_info;

impl ChatController {
    pub fn new(
        store: SessionStore,
        backend: Arc<dyn RagBackend>,
        stream_config: StreamConfig,
        sender: EventSender,
    ) -> Self {
        let sessions = store.load();
        log_info!("Chat controller ready with {} stored sessions", sessions.len());

        let (state, _) = ChatStateMachine::transition(
            ChatState::default(),
            ChatIntent::LoadSessions(sessions),
            Utc::now(),
        );

        Self {
            state,
            store,
            backend,
            simulator: StreamSimulator::new(stream_config, sender.clone()),
            sender,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }
}
