use crate::chat::{
    controls::Controls,
    document::Document,
    message::{Message, MessageRole},
    state::{ChatEvent, ChatIntent, ChatState},
    store::SessionStore,
    ChatController,
};
use crate::event::{AppEvent, Event, EventHandler};
use crate::util::{
    config::{Config, UiConfig},
    database::Database,
    rag::{RagBackend, RagClient},
};
use crate::view::ChatView;
use crate::{log_error, log_info};
use ratatui::{
    DefaultTerminal,
    crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
};
use color_eyre::Result;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Chat,
    Sidebar,
}

/// Application.
#[derive(Debug)]
pub struct App {
    /// Is the application running?
    pub running: bool,
    pub focus: Focus,
    /// Chat state and its side effects
    pub chat: ChatController,
    /// Event handler.
    pub events: EventHandler,
    pub view: ChatView,
    pub controls: Controls,
    pub ui: UiConfig,
    pub sidebar_index: usize,
}

impl App {
    /// Constructs a new instance of [`App`] talking to the configured endpoint.
    pub fn new(config: &Config) -> Result<Self> {
        let database = Database::new(&config.database_path())?;
        let backend = Arc::new(RagClient::new(config.rag.clone())?);
        Ok(Self::with_backend(config, SessionStore::new(database), backend, EventHandler::new()))
    }

    pub fn with_backend(
        config: &Config,
        store: SessionStore,
        backend: Arc<dyn RagBackend>,
        events: EventHandler,
    ) -> Self {
        let chat = ChatController::new(store, backend, config.stream.clone(), events.sender());

        Self {
            running: true,
            focus: Focus::Chat,
            chat,
            events,
            view: ChatView::new(),
            controls: Controls::default(),
            ui: config.ui.clone(),
            sidebar_index: 0,
        }
    }

    /// Run the application's main loop.
    pub async fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        log_info!("Starting RAG assistant");
        let mut needs_redraw = true;

        while self.running {
            if needs_redraw {
                terminal.draw(|frame| frame.render_widget(&self, frame.area()))?;
                needs_redraw = false;
            }

            match self.events.next().await {
                Ok(event) => needs_redraw = self.handle_event(event),
                Err(e) => {
                    log_error!("Event error: {}", e);
                    self.quit();
                }
            }
        }
        Ok(())
    }

    /// Apply one event. Returns whether the screen needs to be redrawn.
    pub fn handle_event(&mut self, event: Event) -> bool {
        match event {
            // Only the status indicator and cursor animate
            Event::Tick => self.is_animating(),
            Event::Crossterm(crossterm::event::Event::Key(key_event)) => {
                if key_event.kind == KeyEventKind::Press {
                    self.handle_key_events(key_event);
                }
                true
            }
            Event::Crossterm(crossterm::event::Event::Resize(_, _)) => true,
            Event::Crossterm(_) => false,
            Event::App(app_event) => {
                self.handle_app_event(app_event);
                true
            }
        }
    }

    pub fn handle_app_event(&mut self, app_event: AppEvent) {
        match app_event {
            AppEvent::Quit => self.quit(),
            AppEvent::Submit => {
                let query = self.view.input.clone();
                self.dispatch(ChatIntent::Submit { query });
            }
            AppEvent::NewChat => {
                self.dispatch(ChatIntent::NewChat);
                self.view.reset_selection();
                self.focus = Focus::Chat;
            }
            AppEvent::SelectSession(id) => {
                self.dispatch(ChatIntent::SelectSession(id));
                self.view.reset_selection();
                self.focus = Focus::Chat;
            }
            AppEvent::DeleteSession(id) => {
                self.dispatch(ChatIntent::DeleteSession(id));
            }
            AppEvent::Chat(intent) => {
                self.dispatch(intent);
            }
        }
    }

    fn dispatch(&mut self, intent: ChatIntent) {
        for event in self.chat.dispatch(intent) {
            match event {
                ChatEvent::InputCleared => self.view.clear_input(),
                ChatEvent::MessagesChanged => self.view.scroll_to_bottom(),
                ChatEvent::SessionsChanged | ChatEvent::SessionDeleted => self.clamp_sidebar(),
                _ => {}
            }
        }
    }

    /// Handles the key events and updates the state of [`App`].
    pub fn handle_key_events(&mut self, key_event: KeyEvent) {
        if key_event.modifiers.contains(KeyModifiers::CONTROL) {
            match key_event.code {
                KeyCode::Char('c' | 'C') => self.events.send(AppEvent::Quit),
                KeyCode::Char('n' | 'N') => self.events.send(AppEvent::NewChat),
                _ => {}
            }
            return;
        }

        match key_event.code {
            KeyCode::F(2) => return self.controls.cycle_style(),
            KeyCode::F(3) => return self.controls.cycle_search(),
            _ => {}
        }

        match self.focus {
            Focus::Sidebar => self.handle_sidebar_key(key_event),
            Focus::Chat => self.handle_chat_key(key_event),
        }
    }

    fn handle_sidebar_key(&mut self, key_event: KeyEvent) {
        let count = self.state().sessions.len();
        let selected_id = self.state().sessions
            .get(self.sidebar_index)
            .map(|s| s.id.clone());

        match key_event.code {
            KeyCode::Esc | KeyCode::Tab => self.focus = Focus::Chat,
            KeyCode::Up | KeyCode::Char('k') => {
                self.sidebar_index = self.sidebar_index.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.sidebar_index + 1 < count {
                    self.sidebar_index += 1;
                }
            }
            KeyCode::Enter => {
                if let Some(id) = selected_id {
                    self.events.send(AppEvent::SelectSession(id));
                }
            }
            KeyCode::Char('d') | KeyCode::Delete if self.ui.sidebar_delete => {
                if let Some(id) = selected_id {
                    self.events.send(AppEvent::DeleteSession(id));
                }
            }
            KeyCode::Char('n') => self.events.send(AppEvent::NewChat),
            KeyCode::Char('q') => self.events.send(AppEvent::Quit),
            _ => {}
        }
    }

    fn handle_chat_key(&mut self, key_event: KeyEvent) {
        let forward = key_event.code == KeyCode::Tab;

        match key_event.code {
            KeyCode::Esc => {
                self.focus = Focus::Sidebar;
                self.clamp_sidebar();
            }
            KeyCode::Tab | KeyCode::BackTab => {
                if self.state().messages.is_empty() {
                    self.view.cycle_suggestion(forward);
                } else {
                    let count = self.latest_documents().map_or(0, |(_, docs)| docs.len());
                    self.view.cycle_document(count, forward);
                }
            }
            KeyCode::Enter => {
                if let Some((message_id, doc_key)) = self.selected_document_key() {
                    self.view.toggle_document(&message_id, &doc_key);
                } else if !self.state().is_loading {
                    self.events.send(AppEvent::Submit);
                }
            }
            KeyCode::Backspace if !self.state().is_loading => self.view.backspace(),
            KeyCode::Char(ch) if !self.state().is_loading => self.view.handle_input(ch),
            KeyCode::Up => self.view.scroll_up(false),
            KeyCode::PageUp => self.view.scroll_up(true),
            KeyCode::Down => self.view.scroll_down(false),
            KeyCode::PageDown => self.view.scroll_down(true),
            _ => {}
        }
    }

    pub fn state(&self) -> &ChatState {
        self.chat.state()
    }

    /// The newest finished answer that carries documents
    pub fn latest_documents(&self) -> Option<(&Message, &[Document])> {
        if !self.ui.show_documents {
            return None;
        }
        let message = self.state().messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::Assistant)?;
        if message.is_streaming {
            return None;
        }
        let docs = message.documents.as_deref().filter(|docs| !docs.is_empty())?;
        Some((message, docs))
    }

    fn selected_document_key(&self) -> Option<(String, String)> {
        let index = self.view.selected_document?;
        let (message, docs) = self.latest_documents()?;
        let doc = docs.get(index)?;
        Some((message.id.clone(), doc.source_id(index)))
    }

    fn is_animating(&self) -> bool {
        let state = self.state();
        state.is_loading || state.is_streaming()
    }

    fn clamp_sidebar(&mut self) {
        let count = self.state().sessions.len();
        self.sidebar_index = self.sidebar_index.min(count.saturating_sub(1));
    }

    /// Set running to false to quit the application.
    pub fn quit(&mut self) {
        self.running = false;
    }
}
