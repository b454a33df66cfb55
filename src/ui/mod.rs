pub mod components;
pub mod controls;
pub mod conversation;
pub mod input;
pub mod message;
pub mod sidebar;
pub mod style;

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    widgets::Widget,
};

use crate::app::{App, Focus};
use crate::ui::components::UiComponent;

const SIDEBAR_WIDTH: u16 = 34;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(SIDEBAR_WIDTH),
                Constraint::Min(20),
            ])
            .split(area);

        sidebar::render_sidebar(self, columns[0], buf);

        let main = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),  // Controls
                Constraint::Min(3),     // Conversation
                Constraint::Length(3),  // Input
                Constraint::Length(3),  // Help
            ])
            .split(columns[1]);

        controls::render_controls(&self.controls, main[0], buf);
        conversation::render_conversation(self, main[1], buf);
        input::render_input(self, main[2], buf);
        UiComponent::help(help_text(self)).render(main[3], buf);
    }
}

fn help_text(app: &App) -> &'static str {
    match app.focus {
        Focus::Sidebar if app.ui.sidebar_delete => {
            "↑↓: Select • Enter: Open • d: Delete • n: New chat • Esc: Back • q: Quit"
        }
        Focus::Sidebar => "↑↓: Select • Enter: Open • n: New chat • Esc: Back • q: Quit",
        Focus::Chat if app.state().messages.is_empty() => {
            "Enter: Send • Tab: Suggestion • Esc: Chats • Ctrl+N: New chat • Ctrl+C: Quit"
        }
        Focus::Chat => {
            "Enter: Send/Expand • Tab: Documents • ↑↓ PgUp PgDn: Scroll • Esc: Chats • Ctrl+N: New • Ctrl+C: Quit"
        }
    }
}
