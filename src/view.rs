// src/view.rs
// UI-only state of the chat screen: input buffer, scroll position and selections

use std::cell::Cell;
use std::collections::HashSet;

/// Canned prompts offered while the conversation is empty
pub const SUGGESTIONS: [&str; 4] = [
    "What is Section 2 about?",
    "Show me implementation guidelines",
    "Security standards overview",
    "Latest technical updates",
];

const PAGE_SCROLL: usize = 10;

#[derive(Debug, Default)]
pub struct ChatView {
    pub input: String,
    /// Lines scrolled up from the newest message; 0 follows the conversation
    pub scroll_from_bottom: usize,
    /// Furthest the conversation can scroll, recorded on the last render
    pub max_scroll: Cell<usize>,
    pub selected_suggestion: Option<usize>,
    /// Index into the documents of the latest answer
    pub selected_document: Option<usize>,
    /// (message id, document key) pairs shown with the long preview
    pub expanded_documents: HashSet<(String, String)>,
}

impl ChatView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_input(&mut self, ch: char) {
        self.input.push(ch);
        self.selected_document = None;
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
        self.selected_suggestion = None;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_from_bottom = 0;
    }

    pub fn scroll_up(&mut self, page: bool) {
        let step = if page { PAGE_SCROLL } else { 1 };
        self.scroll_from_bottom = (self.scroll_from_bottom + step).min(self.max_scroll.get());
    }

    pub fn scroll_down(&mut self, page: bool) {
        let step = if page { PAGE_SCROLL } else { 1 };
        self.scroll_from_bottom = self.scroll_from_bottom.saturating_sub(step);
    }

    /// Put the next (or previous) suggestion into the input without submitting it.
    pub fn cycle_suggestion(&mut self, forward: bool) {
        let next = cycle(self.selected_suggestion, SUGGESTIONS.len(), forward);
        self.selected_suggestion = next;
        if let Some(index) = next {
            self.input = SUGGESTIONS[index].to_string();
        }
    }

    pub fn cycle_document(&mut self, count: usize, forward: bool) {
        self.selected_document = cycle(self.selected_document, count, forward);
    }

    /// Flip the long preview for one document card.
    pub fn toggle_document(&mut self, message_id: &str, doc_key: &str) {
        let key = (message_id.to_string(), doc_key.to_string());
        if !self.expanded_documents.remove(&key) {
            self.expanded_documents.insert(key);
        }
    }

    pub fn is_expanded(&self, message_id: &str, doc_key: &str) -> bool {
        self.expanded_documents
            .contains(&(message_id.to_string(), doc_key.to_string()))
    }

    /// Called when the active conversation is replaced
    pub fn reset_selection(&mut self) {
        self.selected_document = None;
        self.selected_suggestion = None;
        self.scroll_from_bottom = 0;
    }
}

fn cycle(current: Option<usize>, count: usize, forward: bool) -> Option<usize> {
    if count == 0 {
        return None;
    }
    Some(match (current, forward) {
        (None, true) => 0,
        (None, false) => count - 1,
        (Some(i), true) => (i + 1) % count,
        (Some(i), false) => (i + count - 1) % count,
    })
}
