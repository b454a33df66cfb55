// src/chat/controls.rs
// Conversation style and search type selectors shown above the conversation

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversationStyle {
    Creative,
    #[default]
    Balanced,
    Precise,
}

impl ConversationStyle {
    pub fn all() -> [ConversationStyle; 3] {
        [Self::Creative, Self::Balanced, Self::Precise]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Creative => "Creative",
            Self::Balanced => "Balanced",
            Self::Precise => "Precise",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Self::Creative => Self::Balanced,
            Self::Balanced => Self::Precise,
            Self::Precise => Self::Creative,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchType {
    #[default]
    Standard,
    Deep,
    External,
}

impl SearchType {
    pub fn all() -> [SearchType; 3] {
        [Self::Standard, Self::Deep, Self::External]
    }

    /// Label in the controls bar; the default mode has none
    pub fn label(&self) -> Option<&'static str> {
        match self {
            Self::Standard => None,
            Self::Deep => Some("Deep Search"),
            Self::External => Some("External Search"),
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Self::Standard => Self::Deep,
            Self::Deep => Self::External,
            Self::External => Self::Standard,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Controls {
    pub style: ConversationStyle,
    pub search: SearchType,
}

impl Controls {
    pub fn cycle_style(&mut self) {
        self.style = self.style.next();
    }

    pub fn cycle_search(&mut self) {
        self.search = self.search.next();
    }
}
