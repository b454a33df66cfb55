use chrono::Utc;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph, Widget},
};

use crate::app::{App, Focus};
use crate::ui::message::{message_lines, MessageContext};
use crate::ui::style::{border_style, ACCENT_COLOR, ASSISTANT_COLOR, MUTED_COLOR};
use crate::view::SUGGESTIONS;

pub fn render_conversation(app: &App, area: Rect, buf: &mut Buffer) {
    let state = app.state();
    let title = state
        .active_session()
        .map(|s| format!(" {} ", s.title))
        .unwrap_or_else(|| " New chat ".to_string());

    let block = Block::bordered()
        .title(title)
        .border_type(BorderType::Rounded)
        .border_style(border_style(app.focus == Focus::Chat));
    let inner = block.inner(area);
    block.render(area, buf);

    if state.messages.is_empty() {
        app.view.max_scroll.set(0);
        render_empty_state(app, inner, buf);
        return;
    }

    let width = inner.width.saturating_sub(1) as usize;
    let latest_docs_id = app.latest_documents().map(|(m, _)| m.id.clone());
    let now = Utc::now();

    let mut lines: Vec<Line> = Vec::new();
    for message in &state.messages {
        let ctx = MessageContext {
            width,
            now,
            view: &app.view,
            show_sources: app.ui.show_sources,
            show_documents: app.ui.show_documents,
            selected_document: if latest_docs_id.as_deref() == Some(message.id.as_str()) {
                app.view.selected_document
            } else {
                None
            },
        };
        lines.extend(message_lines(message, &ctx));
    }

    if state.show_loading_indicator() {
        lines.push(Line::from("Searching knowledge base...").italic().fg(MUTED_COLOR));
    }

    let height = inner.height as usize;
    let max_scroll = lines.len().saturating_sub(height);
    app.view.max_scroll.set(max_scroll);
    let offset = max_scroll - app.view.scroll_from_bottom.min(max_scroll);

    Paragraph::new(lines)
        .scroll((offset.min(u16::MAX as usize) as u16, 0))
        .render(inner, buf);
}

fn render_empty_state(app: &App, area: Rect, buf: &mut Buffer) {
    let mut lines = vec![
        Line::default(),
        Line::from("Welcome to the documentation assistant")
            .bold()
            .fg(ASSISTANT_COLOR),
        Line::from("Ask a question about your documents, or press Tab to try one of these:")
            .fg(MUTED_COLOR),
        Line::default(),
    ];

    for (index, suggestion) in SUGGESTIONS.iter().enumerate() {
        let selected = app.view.selected_suggestion == Some(index);
        let style = if selected {
            Style::default().fg(ACCENT_COLOR).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::styled(if selected { "▶ " } else { "  " }, Style::default().fg(ACCENT_COLOR)),
            Span::styled(*suggestion, style),
        ]));
    }

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(area, buf);
}
