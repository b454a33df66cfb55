use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Stylize},
    widgets::{Block, BorderType, Paragraph, Widget},
};

use crate::app::{App, Focus};
use crate::ui::style::border_style;

pub fn render_input(app: &App, area: Rect, buf: &mut Buffer) {
    let is_loading = app.state().is_loading;
    let title = if is_loading { " Waiting for answer... " } else { " Type your message " };

    let block = Block::bordered()
        .title(title)
        .border_type(BorderType::Rounded)
        .border_style(border_style(app.focus == Focus::Chat && !is_loading));

    let paragraph = if app.view.input.is_empty() {
        Paragraph::new("> Ask me anything about documentation...").fg(Color::DarkGray).italic()
    } else {
        // Keep the end of long input visible
        let visible = area.width.saturating_sub(5) as usize;
        let chars: Vec<char> = app.view.input.chars().collect();
        let start = chars.len().saturating_sub(visible);
        let tail: String = chars[start..].iter().collect();
        Paragraph::new(format!("> {}", tail)).fg(Color::Yellow)
    };

    paragraph.block(block).render(area, buf);
}
