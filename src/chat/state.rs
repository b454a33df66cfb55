// src/chat/state.rs
use chrono::{DateTime, Utc};

use super::document::{docs_to_sources, Document};
use super::message::{Message, MessageRole, Source};
use super::session::ChatSession;
use super::streamer::joined_words;
use crate::util::rag::{format_chat_history, RagResponse, APOLOGY_MESSAGE};

/// Everything the chat screen knows. Owned by the controller and only
/// changed through [`ChatStateMachine::transition`].
#[derive(Debug, Clone, Default)]
pub struct ChatState {
    /// Newest first
    pub sessions: Vec<ChatSession>,
    pub current_chat_id: Option<String>,
    /// The active conversation
    pub messages: Vec<Message>,
    pub is_loading: bool,
    /// Bumped whenever the active conversation context changes. Background
    /// work tagged with an older generation may no longer write.
    pub generation: u64,
    pub pending: Vec<PendingReply>,
}

/// An assistant message whose request or stream is still running
#[derive(Debug, Clone, PartialEq)]
pub struct PendingReply {
    pub message_id: String,
    pub session_id: String,
    pub generation: u64,
    /// Known once the backend has answered
    pub reply: Option<FinalReply>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FinalReply {
    pub content: String,
    pub sources: Option<Vec<Source>>,
    pub documents: Option<Vec<Document>>,
}

impl FinalReply {
    /// Content is word-joined so a settled reply reads exactly like a streamed one.
    pub fn from_result(result: Result<RagResponse, String>) -> Self {
        match result {
            Ok(response) => Self {
                sources: Some(docs_to_sources(&response.docs)),
                documents: Some(response.docs),
                content: joined_words(&response.answer),
            },
            Err(_) => Self {
                content: joined_words(APOLOGY_MESSAGE),
                sources: None,
                documents: None,
            },
        }
    }

    fn apply_to(&self, message: &mut Message) {
        message.content = self.content.clone();
        message.sources = self.sources.clone();
        message.documents = self.documents.clone();
        message.is_streaming = false;
    }
}

impl ChatState {
    pub fn active_session(&self) -> Option<&ChatSession> {
        let id = self.current_chat_id.as_deref()?;
        self.sessions.iter().find(|s| s.id == id)
    }

    /// True only while loading and before the assistant placeholder exists
    pub fn show_loading_indicator(&self) -> bool {
        self.is_loading
            && !self.messages
                .iter()
                .any(|m| m.role == MessageRole::Assistant && m.is_streaming)
    }

    pub fn is_streaming(&self) -> bool {
        self.messages.iter().any(|m| m.is_streaming)
    }

    fn sync_active_session(&mut self, now: DateTime<Utc>) {
        let Some(id) = self.current_chat_id.clone() else {
            return;
        };
        if let Some(session) = self.sessions.iter_mut().find(|s| s.id == id) {
            session.refresh(&self.messages, now);
        }
    }

    /// Write a reply's final state into whichever list owns the message.
    /// Returns true when the active list changed.
    fn settle(&mut self, session_id: &str, message_id: &str, reply: &FinalReply, now: DateTime<Utc>) -> bool {
        if self.current_chat_id.as_deref() == Some(session_id) {
            let mut changed = false;
            for message in self.messages.iter_mut().filter(|m| m.id == message_id) {
                reply.apply_to(message);
                changed = true;
            }
            self.sync_active_session(now);
            return changed;
        }

        if let Some(session) = self.sessions.iter_mut().find(|s| s.id == session_id) {
            for message in session.messages.iter_mut().filter(|m| m.id == message_id) {
                reply.apply_to(message);
            }
            session.touch(now);
        }
        false
    }
}

// ----------------------------------------------------------------------------
// INTENT - What the user or a background task wants to happen
// ----------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum ChatIntent {
    /// Startup: replace the session list with what the store loaded
    LoadSessions(Vec<ChatSession>),
    Submit { query: String },
    AnswerReceived {
        generation: u64,
        message_id: String,
        result: Result<RagResponse, String>,
    },
    StreamStep {
        generation: u64,
        message_id: String,
        content: String,
        is_streaming: bool,
    },
    StreamFinished {
        generation: u64,
        message_id: String,
    },
    NewChat,
    SelectSession(String),
    DeleteSession(String),
}

// ----------------------------------------------------------------------------
// EVENTS - Side effects the controller has to carry out
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    /// The active message list changed (scroll to newest)
    MessagesChanged,
    /// Session list changed; persist on the regular path
    SessionsChanged,
    /// A session was deleted; persist right away
    SessionDeleted,
    InputCleared,
    AnswerRequested {
        generation: u64,
        message_id: String,
        query: String,
        chat_history: Vec<String>,
    },
    StreamRequested {
        generation: u64,
        message_id: String,
        text: String,
    },
}

// ----------------------------------------------------------------------------
// STATE MACHINE - (State, Intent, now) -> (State, Vec<Event>)
// ----------------------------------------------------------------------------

pub struct ChatStateMachine;

impl ChatStateMachine {
    pub fn transition(
        state: ChatState,
        intent: ChatIntent,
        now: DateTime<Utc>,
    ) -> (ChatState, Vec<ChatEvent>) {
        use ChatIntent::*;

        match intent {
            LoadSessions(sessions) => Self::handle_load_sessions(state, sessions),
            Submit { query } => Self::handle_submit(state, query, now),
            AnswerReceived { generation, message_id, result } => {
                Self::handle_answer_received(state, generation, message_id, result, now)
            }
            StreamStep { generation, message_id, content, is_streaming } => {
                Self::handle_stream_step(state, generation, message_id, content, is_streaming, now)
            }
            StreamFinished { generation, message_id } => {
                Self::handle_stream_finished(state, generation, message_id, now)
            }
            NewChat => Self::handle_new_chat(state, now),
            SelectSession(id) => Self::handle_select_session(state, id, now),
            DeleteSession(id) => Self::handle_delete_session(state, id, now),
        }
    }

    /// Revoke write permission from all running streams. Replies whose text
    /// is already known are written out in full; requests still in flight
    /// stay pending and settle when their answer arrives.
    fn supersede(mut state: ChatState, now: DateTime<Utc>) -> ChatState {
        state.generation += 1;

        let (known, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut state.pending)
            .into_iter()
            .partition(|p| p.reply.is_some());

        for pending in known {
            if let Some(reply) = &pending.reply {
                state.settle(&pending.session_id, &pending.message_id, reply, now);
            }
        }
        state.pending = waiting;
        state
    }

    fn handle_load_sessions(mut state: ChatState, sessions: Vec<ChatSession>) -> (ChatState, Vec<ChatEvent>) {
        state.sessions = sessions;
        (state, vec![])
    }

    fn handle_submit(state: ChatState, query: String, now: DateTime<Utc>) -> (ChatState, Vec<ChatEvent>) {
        let query = query.trim().to_string();
        if query.is_empty() || state.is_loading {
            return (state, vec![]);
        }

        let mut state = Self::supersede(state, now);
        let chat_history = format_chat_history(&state.messages);
        let is_new_conversation = state.messages.is_empty() || state.current_chat_id.is_none();

        state.messages.push(Message::new_user(query.clone(), now));

        if is_new_conversation {
            let session = ChatSession::new(&query, now);
            state.current_chat_id = Some(session.id.clone());
            state.sessions.insert(0, session);
        }

        state.is_loading = true;

        let placeholder = Message::new_assistant_placeholder(now);
        let message_id = placeholder.id.clone();
        state.messages.push(placeholder);

        let session_id = state.current_chat_id.clone().unwrap_or_default();
        state.pending.push(PendingReply {
            message_id: message_id.clone(),
            session_id,
            generation: state.generation,
            reply: None,
        });
        state.sync_active_session(now);

        let generation = state.generation;
        (state, vec![
            ChatEvent::InputCleared,
            ChatEvent::MessagesChanged,
            ChatEvent::SessionsChanged,
            ChatEvent::AnswerRequested {
                generation,
                message_id,
                query,
                chat_history,
            },
        ])
    }

    fn handle_answer_received(
        mut state: ChatState,
        generation: u64,
        message_id: String,
        result: Result<RagResponse, String>,
        now: DateTime<Utc>,
    ) -> (ChatState, Vec<ChatEvent>) {
        let Some(pos) = state.pending.iter().position(|p| p.message_id == message_id) else {
            return (state, vec![]);
        };

        let reply = FinalReply::from_result(result);

        if generation == state.generation {
            state.is_loading = false;
            let text = reply.content.clone();
            state.pending[pos].reply = Some(reply);
            return (state, vec![ChatEvent::StreamRequested { generation, message_id, text }]);
        }

        // The conversation moved on while the request was in flight
        let pending = state.pending.remove(pos);
        let mut events = vec![ChatEvent::SessionsChanged];
        if state.settle(&pending.session_id, &message_id, &reply, now) {
            events.insert(0, ChatEvent::MessagesChanged);
        }
        (state, events)
    }

    fn handle_stream_step(
        mut state: ChatState,
        generation: u64,
        message_id: String,
        content: String,
        is_streaming: bool,
        now: DateTime<Utc>,
    ) -> (ChatState, Vec<ChatEvent>) {
        if generation != state.generation {
            return (state, vec![]);
        }

        let mut changed = false;
        for message in state.messages.iter_mut().filter(|m| m.id == message_id) {
            message.content = content.clone();
            message.is_streaming = is_streaming;
            changed = true;
        }
        if !changed {
            return (state, vec![]);
        }

        state.sync_active_session(now);
        (state, vec![ChatEvent::MessagesChanged, ChatEvent::SessionsChanged])
    }

    fn handle_stream_finished(
        mut state: ChatState,
        generation: u64,
        message_id: String,
        now: DateTime<Utc>,
    ) -> (ChatState, Vec<ChatEvent>) {
        if generation != state.generation {
            return (state, vec![]);
        }
        let Some(pos) = state.pending.iter().position(|p| p.message_id == message_id) else {
            return (state, vec![]);
        };

        let pending = state.pending.remove(pos);
        for message in state.messages.iter_mut().filter(|m| m.id == message_id) {
            if let Some(reply) = &pending.reply {
                message.sources = reply.sources.clone();
                message.documents = reply.documents.clone();
            }
            message.is_streaming = false;
        }

        state.sync_active_session(now);
        (state, vec![ChatEvent::MessagesChanged, ChatEvent::SessionsChanged])
    }

    fn handle_new_chat(state: ChatState, now: DateTime<Utc>) -> (ChatState, Vec<ChatEvent>) {
        let mut state = Self::supersede(state, now);
        state.messages.clear();
        state.current_chat_id = None;
        state.is_loading = false;

        (state, vec![
            ChatEvent::InputCleared,
            ChatEvent::MessagesChanged,
            ChatEvent::SessionsChanged,
        ])
    }

    fn handle_select_session(state: ChatState, id: String, now: DateTime<Utc>) -> (ChatState, Vec<ChatEvent>) {
        if !state.sessions.iter().any(|s| s.id == id) {
            return (state, vec![]);
        }

        let mut state = Self::supersede(state, now);
        state.messages = state.sessions
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.messages.clone())
            .unwrap_or_default();
        state.current_chat_id = Some(id);
        state.is_loading = false;

        (state, vec![ChatEvent::MessagesChanged, ChatEvent::SessionsChanged])
    }

    fn handle_delete_session(state: ChatState, id: String, now: DateTime<Utc>) -> (ChatState, Vec<ChatEvent>) {
        if !state.sessions.iter().any(|s| s.id == id) {
            return (state, vec![]);
        }

        let is_active = state.current_chat_id.as_deref() == Some(id.as_str());
        let mut events = Vec::new();

        let mut state = if is_active {
            let mut state = Self::supersede(state, now);
            state.messages.clear();
            state.current_chat_id = None;
            state.is_loading = false;
            events.push(ChatEvent::MessagesChanged);
            state
        } else {
            state
        };

        state.sessions.retain(|s| s.id != id);
        state.pending.retain(|p| p.session_id != id);
        events.push(ChatEvent::SessionDeleted);

        (state, events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::document::DocumentMetadata;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    fn submit(state: ChatState, query: &str) -> (ChatState, Vec<ChatEvent>) {
        ChatStateMachine::transition(state, ChatIntent::Submit { query: query.to_string() }, now())
    }

    fn requested(events: &[ChatEvent]) -> (u64, String) {
        events.iter()
            .find_map(|e| match e {
                ChatEvent::AnswerRequested { generation, message_id, .. } => Some((*generation, message_id.clone())),
                _ => None,
            })
            .expect("answer should be requested")
    }

    fn response(answer: &str, docs: usize) -> RagResponse {
        RagResponse {
            answer: answer.to_string(),
            docs: (0..docs)
                .map(|i| Document {
                    id: None,
                    metadata: DocumentMetadata {
                        document_name: Some(format!("doc{}.md", i)),
                        ..Default::default()
                    },
                    page_content: format!("content {}", i),
                    doc_type: "Document".to_string(),
                })
                .collect(),
        }
    }

    /// Drive a reply through answer, every stream step and the finish.
    fn complete(state: ChatState, generation: u64, message_id: &str, result: Result<RagResponse, String>) -> ChatState {
        let (state, events) = ChatStateMachine::transition(
            state,
            ChatIntent::AnswerReceived { generation, message_id: message_id.to_string(), result },
            now(),
        );
        let text = match &events[..] {
            [ChatEvent::StreamRequested { text, .. }] => text.clone(),
            other => panic!("unexpected events {:?}", other),
        };

        let mut state = state;
        for step in crate::chat::streamer::plan_steps(&text) {
            state = ChatStateMachine::transition(
                state,
                ChatIntent::StreamStep {
                    generation,
                    message_id: message_id.to_string(),
                    content: step.content,
                    is_streaming: step.is_streaming,
                },
                now(),
            ).0;
        }
        ChatStateMachine::transition(
            state,
            ChatIntent::StreamFinished { generation, message_id: message_id.to_string() },
            now(),
        ).0
    }

    #[test]
    fn test_submit_creates_session_and_placeholder() {
        let (state, events) = submit(ChatState::default(), "What is Section 2?");

        assert!(state.is_loading);
        assert_eq!(state.sessions.len(), 1);
        assert_eq!(state.sessions[0].title, "What is Section 2?");
        assert_eq!(state.current_chat_id.as_deref(), Some(state.sessions[0].id.as_str()));

        let n = state.messages.len();
        assert_eq!(n, 2);
        assert!(state.messages[n - 2].is_user());
        assert_eq!(state.messages[n - 2].content, "What is Section 2?");
        assert!(state.messages[n - 1].is_awaiting_content());

        // session mirrors the active list before the response arrives
        assert_eq!(state.sessions[0].messages, state.messages);
        assert!(!state.show_loading_indicator());
        assert!(events.contains(&ChatEvent::InputCleared));
        assert!(events.contains(&ChatEvent::SessionsChanged));
    }

    #[test]
    fn test_blank_submit_is_ignored() {
        let (state, events) = submit(ChatState::default(), "   ");
        assert!(events.is_empty());
        assert!(state.messages.is_empty());
        assert!(!state.is_loading);
    }

    #[test]
    fn test_submit_while_loading_is_ignored() {
        let (state, _) = submit(ChatState::default(), "first");
        let (state, events) = submit(state, "second");
        assert!(events.is_empty());
        assert_eq!(state.messages.len(), 2);
    }

    #[test]
    fn test_loading_clears_only_on_answer() {
        let (state, events) = submit(ChatState::default(), "q");
        let (generation, id) = requested(&events);

        let (state, _) = ChatStateMachine::transition(
            state,
            ChatIntent::StreamStep { generation, message_id: "unrelated".into(), content: "x".into(), is_streaming: true },
            now(),
        );
        assert!(state.is_loading);

        let (state, _) = ChatStateMachine::transition(
            state,
            ChatIntent::AnswerReceived { generation, message_id: id, result: Ok(response("done", 0)) },
            now(),
        );
        assert!(!state.is_loading);
    }

    #[test]
    fn test_full_reply_attaches_sources_and_documents() {
        let (state, events) = submit(ChatState::default(), "q");
        let (generation, id) = requested(&events);
        let state = complete(state, generation, &id, Ok(response("Section 2 covers   patterns", 2)));

        let reply = state.messages.last().unwrap();
        assert_eq!(reply.content, "Section 2 covers patterns");
        assert!(!reply.is_streaming);
        assert_eq!(reply.sources.as_ref().unwrap().len(), 2);
        assert_eq!(reply.documents.as_ref().unwrap().len(), 2);
        assert!(state.pending.is_empty());
        assert_eq!(state.sessions[0].last_message, "Section 2 covers patterns");
    }

    #[test]
    fn test_error_becomes_apology_without_sources() {
        let (state, events) = submit(ChatState::default(), "q");
        let (generation, id) = requested(&events);
        let state = complete(state, generation, &id, Err("RAG endpoint returned status 500".into()));

        let reply = state.messages.last().unwrap();
        assert_eq!(reply.content, APOLOGY_MESSAGE);
        assert!(reply.sources.is_none());
        assert!(reply.documents.is_none());
        assert!(!state.is_loading);
    }

    #[test]
    fn test_follow_up_sends_prior_history() {
        let (state, events) = submit(ChatState::default(), "first");
        let (generation, id) = requested(&events);
        let state = complete(state, generation, &id, Ok(response("one", 0)));

        let (state, events) = submit(state, "second");
        let history = events.iter().find_map(|e| match e {
            ChatEvent::AnswerRequested { chat_history, .. } => Some(chat_history.clone()),
            _ => None,
        }).unwrap();

        assert_eq!(history, vec!["User: first".to_string(), "Assistant: one".to_string()]);
        // same conversation, no new session
        assert_eq!(state.sessions.len(), 1);
        assert_eq!(state.messages.len(), 4);
    }

    #[test]
    fn test_stale_stream_step_is_dropped() {
        let (state, events) = submit(ChatState::default(), "q");
        let (generation, id) = requested(&events);
        let (state, _) = ChatStateMachine::transition(
            state,
            ChatIntent::AnswerReceived { generation, message_id: id.clone(), result: Ok(response("a b c", 0)) },
            now(),
        );

        let (state, _) = ChatStateMachine::transition(state, ChatIntent::NewChat, now());
        let (state, events) = ChatStateMachine::transition(
            state,
            ChatIntent::StreamStep { generation, message_id: id, content: "a".into(), is_streaming: true },
            now(),
        );
        assert!(events.is_empty());
        assert!(state.messages.is_empty());
    }

    #[test]
    fn test_superseded_stream_is_settled_into_its_session() {
        let (state, events) = submit(ChatState::default(), "q");
        let (generation, id) = requested(&events);
        let session_id = state.current_chat_id.clone().unwrap();
        let (state, _) = ChatStateMachine::transition(
            state,
            ChatIntent::AnswerReceived { generation, message_id: id.clone(), result: Ok(response("full answer text", 1)) },
            now(),
        );
        let (state, _) = ChatStateMachine::transition(
            state,
            ChatIntent::StreamStep { generation, message_id: id.clone(), content: "full".into(), is_streaming: true },
            now(),
        );

        let (state, _) = ChatStateMachine::transition(state, ChatIntent::NewChat, now());

        let session = state.sessions.iter().find(|s| s.id == session_id).unwrap();
        let settled = session.messages.iter().find(|m| m.id == id).unwrap();
        assert_eq!(settled.content, "full answer text");
        assert!(!settled.is_streaming);
        assert_eq!(settled.documents.as_ref().unwrap().len(), 1);
        assert!(state.pending.is_empty());
    }

    #[test]
    fn test_settled_and_streamed_replies_have_same_text() {
        let answer = "Line one\n\nLine  two";

        let (state, events) = submit(ChatState::default(), "q");
        let (generation, id) = requested(&events);
        let streamed = complete(state, generation, &id, Ok(response(answer, 0)));
        let streamed = streamed.messages.last().unwrap().content.clone();

        let (state, events) = submit(ChatState::default(), "q");
        let (generation, id) = requested(&events);
        let session_id = state.current_chat_id.clone().unwrap();
        let (state, _) = ChatStateMachine::transition(
            state,
            ChatIntent::AnswerReceived { generation, message_id: id.clone(), result: Ok(response(answer, 0)) },
            now(),
        );
        let (state, _) = ChatStateMachine::transition(state, ChatIntent::NewChat, now());
        let session = state.sessions.iter().find(|s| s.id == session_id).unwrap();
        let settled = &session.messages.iter().find(|m| m.id == id).unwrap().content;

        assert_eq!(streamed, "Line one Line two");
        assert_eq!(settled, &streamed);
    }

    #[test]
    fn test_late_answer_lands_in_original_session() {
        let (state, events) = submit(ChatState::default(), "q");
        let (generation, id) = requested(&events);
        let session_id = state.current_chat_id.clone().unwrap();

        let (state, _) = ChatStateMachine::transition(state, ChatIntent::NewChat, now());
        assert!(!state.is_loading);

        let (state, events) = ChatStateMachine::transition(
            state,
            ChatIntent::AnswerReceived { generation, message_id: id.clone(), result: Ok(response("late", 0)) },
            now(),
        );
        assert_eq!(events, vec![ChatEvent::SessionsChanged]);
        assert!(state.messages.is_empty());

        let session = state.sessions.iter().find(|s| s.id == session_id).unwrap();
        assert_eq!(session.messages.last().unwrap().content, "late");
        assert_eq!(session.last_message, "late");
    }

    #[test]
    fn test_delete_active_session_clears_view() {
        let (state, _) = submit(ChatState::default(), "q");
        let id = state.current_chat_id.clone().unwrap();

        let (state, events) = ChatStateMachine::transition(state, ChatIntent::DeleteSession(id), now());
        assert!(state.sessions.is_empty());
        assert!(state.messages.is_empty());
        assert!(state.current_chat_id.is_none());
        assert!(state.pending.is_empty());
        assert!(events.contains(&ChatEvent::SessionDeleted));
    }

    #[test]
    fn test_delete_other_session_keeps_view() {
        let other = ChatSession::new("older chat", now());
        let other_id = other.id.clone();
        let (state, _) = ChatStateMachine::transition(ChatState::default(), ChatIntent::LoadSessions(vec![other]), now());
        let (state, _) = submit(state, "q");
        let before = state.messages.clone();

        let (state, events) = ChatStateMachine::transition(state, ChatIntent::DeleteSession(other_id), now());
        assert_eq!(state.messages, before);
        assert_eq!(state.sessions.len(), 1);
        assert_eq!(events, vec![ChatEvent::SessionDeleted]);
    }

    #[test]
    fn test_select_then_new_chat_leaves_stored_messages_alone() {
        let mut stored = ChatSession::new("stored", now());
        stored.messages = vec![Message::new_user("stored".to_string(), now())];
        let stored_id = stored.id.clone();
        let snapshot = stored.messages.clone();

        let (state, _) = ChatStateMachine::transition(ChatState::default(), ChatIntent::LoadSessions(vec![stored]), now());
        let (state, _) = ChatStateMachine::transition(state, ChatIntent::SelectSession(stored_id.clone()), now());
        assert_eq!(state.messages, snapshot);

        let (state, _) = ChatStateMachine::transition(state, ChatIntent::NewChat, now());
        let (state, _) = submit(state, "brand new");

        let stored = state.sessions.iter().find(|s| s.id == stored_id).unwrap();
        assert_eq!(stored.messages, snapshot);
        assert_eq!(state.sessions.len(), 2);
        assert_eq!(state.sessions[0].title, "brand new");
    }

    #[test]
    fn test_select_unknown_session_is_ignored() {
        let (state, _) = submit(ChatState::default(), "q");
        let generation = state.generation;
        let (state, events) = ChatStateMachine::transition(state, ChatIntent::SelectSession("nope".into()), now());
        assert!(events.is_empty());
        assert_eq!(state.generation, generation);
    }
}
