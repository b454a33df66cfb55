//! Line layout for a single message.
//!
//! Everything is wrapped here rather than by the `Paragraph`, so the
//! conversation knows its exact height and can keep the newest line in view.

use chrono::{DateTime, Local, Utc};
use ratatui::{
    layout::Alignment,
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
};

use crate::chat::document::Document;
use crate::chat::message::{Message, Source};
use crate::ui::style::{ACCENT_COLOR, ASSISTANT_COLOR, MUTED_COLOR, USER_COLOR};
use crate::util::string::StringUtils;
use crate::view::ChatView;

pub const STATUS_STAGE_MS: i64 = 1500;

const STATUS_STAGES: [&str; 3] = [
    "Searching knowledge base...",
    "Analyzing documents...",
    "Generating response...",
];

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// Stage shown for a placeholder that has waited `elapsed_ms`. Stays on the last stage.
pub fn status_stage(elapsed_ms: i64) -> usize {
    let stage = (elapsed_ms.max(0) / STATUS_STAGE_MS) as usize;
    stage.min(STATUS_STAGES.len() - 1)
}

/// What the renderer needs besides the message itself
pub struct MessageContext<'a> {
    pub width: usize,
    pub now: DateTime<Utc>,
    pub view: &'a ChatView,
    pub show_sources: bool,
    pub show_documents: bool,
    /// Index of the highlighted card when this message is the latest answer
    pub selected_document: Option<usize>,
}

pub fn message_lines(message: &Message, ctx: &MessageContext) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let width = ctx.width.max(10);

    if message.is_user() {
        let time = message.timestamp.with_timezone(&Local).format("%H:%M");
        lines.push(
            Line::from(vec![
                Span::styled(format!("{} ", time), Style::default().fg(MUTED_COLOR)),
                Span::styled("You", Style::default().fg(USER_COLOR).add_modifier(Modifier::BOLD)),
            ])
            .alignment(Alignment::Right),
        );
        // Pad to a common width so the bubble has a straight left edge
        let wrapped = StringUtils::wrap(&message.content, (width * 3 / 4).max(10));
        let bubble = wrapped.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        for text in wrapped {
            lines.push(Line::from(format!("{:<bubble$}", text)).fg(USER_COLOR).alignment(Alignment::Right));
        }
        lines.push(Line::default());
        return lines;
    }

    let time = message.timestamp.with_timezone(&Local).format("%H:%M");
    lines.push(Line::from(vec![
        Span::styled("Assistant", Style::default().fg(ASSISTANT_COLOR).add_modifier(Modifier::BOLD)),
        Span::styled(format!(" {}", time), Style::default().fg(MUTED_COLOR)),
    ]));

    if message.is_awaiting_content() {
        let elapsed = ctx.now.signed_duration_since(message.timestamp).num_milliseconds();
        let spinner = SPINNER[((elapsed.max(0) / 150) as usize) % SPINNER.len()];
        lines.push(Line::from(format!("{} {}", spinner, STATUS_STAGES[status_stage(elapsed)])).italic().fg(MUTED_COLOR));
        lines.push(Line::default());
        return lines;
    }

    let mut body = StringUtils::wrap(&message.content, width);
    if message.is_streaming {
        if let Some(last) = body.last_mut() {
            last.push('▌');
        }
    }
    lines.extend(body.into_iter().map(Line::from));

    if message.is_streaming {
        lines.push(Line::default());
        return lines;
    }

    if ctx.show_sources {
        if let Some(sources) = message.sources.as_deref().filter(|s| !s.is_empty()) {
            lines.extend(source_lines(sources, width));
        }
    }

    if ctx.show_documents {
        if let Some(docs) = message.documents.as_deref().filter(|d| !d.is_empty()) {
            lines.extend(document_lines(message, docs, ctx, width));
        }
    }

    lines.push(Line::default());
    lines
}

fn source_lines(sources: &[Source], width: usize) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::default(),
        Line::from(format!("Sources ({})", sources.len())).bold().fg(ACCENT_COLOR),
    ];

    for source in sources {
        let score = format!(" {}% match", (source.relevance * 100.0).round() as i64);
        let title_width = width.saturating_sub(score.len() + 2).max(8);
        lines.push(Line::from(vec![
            Span::raw("• "),
            Span::raw(StringUtils::truncate_chars(&source.title, title_width)),
            Span::styled(score, Style::default().fg(MUTED_COLOR)),
        ]));

        let snippet_width = width.saturating_sub(4).max(8);
        for text in StringUtils::wrap(&source.snippet, snippet_width) {
            if !text.is_empty() {
                lines.push(Line::from(format!("    {}", text)).italic());
            }
        }
        if source.url.len() > 1 {
            lines.push(Line::from(format!("    ↳ {}", source.url)).fg(MUTED_COLOR));
        }
    }
    lines
}

fn document_lines(message: &Message, docs: &[Document], ctx: &MessageContext, width: usize) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::default(),
        Line::from(format!(
            "Retrieved {} (Tab to select, Enter to expand)",
            StringUtils::maybe_pluralize_count(docs.len(), ("document", "documents"))
        ))
        .bold()
        .fg(ACCENT_COLOR),
    ];

    let inner_width = width.saturating_sub(4).max(8);

    for (index, doc) in docs.iter().enumerate() {
        let key = doc.source_id(index);
        let expanded = ctx.view.is_expanded(&message.id, &key);
        let selected = ctx.selected_document == Some(index);

        let marker = if selected { "▶ " } else { "  " };
        let title_style = if selected {
            Style::default().fg(ACCENT_COLOR).add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };

        lines.push(Line::from(vec![
            Span::styled(marker, Style::default().fg(ACCENT_COLOR)),
            Span::styled(
                StringUtils::truncate_chars(doc.metadata.title(), inner_width),
                title_style,
            ),
        ]));

        let mut badges = vec![Span::raw("    ")];
        if let Some(heading) = doc.metadata.heading() {
            badges.push(Span::styled(format!("[{}] ", heading), Style::default().fg(USER_COLOR)));
        }
        badges.push(Span::styled(
            format!("[{}] ", doc.metadata.collection()),
            Style::default().fg(MUTED_COLOR),
        ));
        if let Some(chunk) = doc.metadata.chunk_index() {
            badges.push(Span::styled(format!("[chunk {}]", chunk), Style::default().fg(MUTED_COLOR)));
        }
        lines.push(Line::from(badges));

        for text in StringUtils::wrap(&doc.preview(expanded), inner_width) {
            lines.push(Line::from(format!("    {}", text)).italic());
        }
    }
    lines
}
