use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph, Widget},
};

use crate::chat::controls::{ConversationStyle, Controls, SearchType};
use crate::ui::style::{ACCENT_COLOR, MUTED_COLOR};

fn option_span(label: &str, selected: bool) -> Span<'static> {
    if selected {
        Span::styled(
            format!("[{}]", label),
            Style::default().fg(ACCENT_COLOR).add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(format!(" {} ", label), Style::default().fg(MUTED_COLOR))
    }
}

pub fn render_controls(controls: &Controls, area: Rect, buf: &mut Buffer) {
    let mut spans = vec![Span::raw("Style (F2): ")];
    for style in ConversationStyle::all() {
        spans.push(option_span(style.as_str(), style == controls.style));
        spans.push(Span::raw(" "));
    }

    spans.push(Span::raw("  Search (F3): "));
    for search in SearchType::all() {
        if let Some(label) = search.label() {
            spans.push(option_span(label, search == controls.search));
            spans.push(Span::raw(" "));
        }
    }

    Paragraph::new(Line::from(spans))
        .block(Block::bordered().border_type(BorderType::Rounded))
        .render(area, buf);
}
