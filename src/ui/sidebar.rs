use chrono::{DateTime, Local, Utc};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, BorderType, List, ListItem, ListState, StatefulWidget, Widget},
};

use crate::app::{App, Focus};
use crate::ui::components::UiComponent;
use crate::ui::style::{border_style, dim_unless_focused, ACCENT_COLOR, MUTED_COLOR};
use crate::util::string::StringUtils;

const PREVIEW_CHARS: usize = 28;

/// "5m ago", "3h ago", "2d ago", or a local date once a week has passed.
pub fn relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(timestamp);
    let minutes = elapsed.num_minutes().max(0);

    if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 60 * 24 {
        format!("{}h ago", minutes / 60)
    } else if minutes < 60 * 24 * 7 {
        format!("{}d ago", minutes / (60 * 24))
    } else {
        timestamp.with_timezone(&Local).format("%b %-d, %Y").to_string()
    }
}

pub fn render_sidebar(app: &App, area: Rect, buf: &mut Buffer) {
    let is_focused = app.focus == Focus::Sidebar;
    let state = app.state();

    let block = Block::bordered()
        .title(format!(" Chats ({}) ", state.sessions.len()))
        .border_type(BorderType::Rounded)
        .border_style(border_style(is_focused));

    if state.sessions.is_empty() {
        let inner = block.inner(area);
        block.render(area, buf);
        UiComponent::empty_message("No conversations yet", None).render(inner, buf);
        return;
    }

    let now = Utc::now();
    let items: Vec<ListItem> = state.sessions
        .iter()
        .map(|session| {
            let is_active = state.current_chat_id.as_deref() == Some(session.id.as_str());
            let marker = if is_active { "● " } else { "  " };

            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(marker, Style::default().fg(ACCENT_COLOR)),
                    Span::styled(
                        session.title.clone(),
                        dim_unless_focused(is_active, Style::default()),
                    ),
                ]),
                Line::from(format!(
                    "  {}",
                    StringUtils::truncate_chars(&session.last_message.replace('\n', " "), PREVIEW_CHARS)
                ))
                .fg(MUTED_COLOR),
                Line::from(format!("  {}", relative_time(session.timestamp, now))).fg(MUTED_COLOR),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut list_state = ListState::default();
    if is_focused {
        list_state.select(Some(app.sidebar_index));
    }

    StatefulWidget::render(list, area, buf, &mut list_state);
}
