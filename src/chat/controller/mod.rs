// src/chat/controller/mod.rs
mod new;
mod dispatch;
mod execute;
mod request_answer;

use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use crate::chat::{
    state::ChatState,
    store::SessionStore,
    streamer::StreamSimulator,
};
use crate::event::EventSender;
use crate::util::rag::RagBackend;

/// Owns the chat state and carries out the side effects its transitions ask for
#[derive(Debug)]
pub struct ChatController {
    state: ChatState,
    store: SessionStore,
    backend: Arc<dyn RagBackend>,
    simulator: StreamSimulator,
    sender: EventSender,
    generation: Arc<AtomicU64>,
}

impl ChatController {
    pub fn state(&self) -> &ChatState {
        &self.state
    }
}
