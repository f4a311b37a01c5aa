//! Rendering helpers
//!
//! Pure functions that turn session state into styled, pre-wrapped lines.
//! Keeping them free of `&mut App` makes the layout testable without a
//! terminal.

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use sillage_core::{Message, Role, WorkflowMeta};

use crate::theme;

/// Prefix shown before user messages.
pub const USER_PREFIX: &str = "You: ";

/// Prefix shown before assistant messages.
pub const ASSISTANT_PREFIX: &str = "Sillage: ";

/// Build the wrapped conversation lines, oldest first.
///
/// `streaming_text` overrides the text of the message that is still
/// streaming; the caller passes the reveal's visible prefix there, so the
/// log itself stays untouched. A trailing `_` marks the live cursor.
pub fn conversation_lines<'a>(
    messages: &[Message],
    streaming_text: Option<&str>,
    width: usize,
) -> Vec<Line<'a>> {
    let mut lines = Vec::new();
    if width < 8 {
        return lines;
    }

    for message in messages {
        let (prefix, style) = match message.role {
            Role::User => (USER_PREFIX, Style::default().fg(theme::USER_GREEN)),
            Role::Assistant => (
                ASSISTANT_PREFIX,
                Style::default().fg(theme::ASSISTANT_VIOLET),
            ),
        };

        let content = if message.streaming {
            let visible = streaming_text.unwrap_or(&message.text);
            format!("{prefix}{visible}_")
        } else {
            format!("{prefix}{}", message.text)
        };

        for wrapped in textwrap::wrap(&content, width) {
            lines.push(Line::styled(wrapped.to_string(), style));
        }
        lines.push(Line::default());
    }

    lines
}

/// Build the metadata panel lines for the last buffered turn.
pub fn meta_lines<'a>(meta: &WorkflowMeta, width: usize) -> Vec<Line<'a>> {
    let heading = Style::default()
        .fg(theme::META_GOLD)
        .add_modifier(Modifier::BOLD);
    let body = Style::default();
    let dim = Style::default().fg(theme::DIM_GRAY);

    let mut lines = Vec::new();
    let width = width.max(8);

    if let Some(ref clarified) = meta.clarified_query {
        lines.push(Line::styled("Clarified query", heading));
        for wrapped in textwrap::wrap(clarified, width) {
            lines.push(Line::styled(wrapped.to_string(), body));
        }
        lines.push(Line::default());
    }

    if let Some(ref research) = meta.research_result {
        lines.push(Line::styled("Research", heading));
        for wrapped in textwrap::wrap(research, width) {
            lines.push(Line::styled(wrapped.to_string(), body));
        }
        lines.push(Line::default());
    }

    if let Some(ref history) = meta.conversation_history {
        if !history.is_empty() {
            lines.push(Line::styled("Interview", heading));
            for entry in history {
                for wrapped in textwrap::wrap(&format!("Q: {}", entry.question), width) {
                    lines.push(Line::styled(wrapped.to_string(), dim));
                }
                for wrapped in textwrap::wrap(&format!("A: {}", entry.answer), width) {
                    lines.push(Line::styled(wrapped.to_string(), body));
                }
            }
        }
    }

    if lines.is_empty() {
        lines.push(Line::styled("No metadata for this turn.", dim));
    }

    lines
}

/// Compose the one-line status bar.
pub fn status_line<'a>(
    loading: bool,
    spinner_frame: u8,
    error: &str,
    activity: Option<&str>,
    backend_healthy: Option<bool>,
) -> Line<'a> {
    let mut spans = Vec::new();

    match backend_healthy {
        Some(true) => spans.push(Span::styled(
            " ● ",
            Style::default().fg(theme::SUCCESS_GREEN),
        )),
        Some(false) => spans.push(Span::styled(" ● ", Style::default().fg(theme::ERROR_RED))),
        None => spans.push(Span::styled(" ● ", Style::default().fg(theme::DIM_GRAY))),
    }

    if !error.is_empty() {
        spans.push(Span::styled(
            format!("error: {error}"),
            Style::default().fg(theme::ERROR_RED),
        ));
    } else if loading {
        let dots = ".".repeat(1 + (spinner_frame % 3) as usize);
        spans.push(Span::styled(
            format!("thinking{dots}"),
            Style::default().fg(theme::ASSISTANT_VIOLET),
        ));
        if let Some(step) = activity {
            spans.push(Span::styled(
                format!("  {step}"),
                Style::default().fg(theme::ACTIVITY_BLUE),
            ));
        }
    } else {
        spans.push(Span::styled("ready", Style::default().fg(theme::DIM_GRAY)));
    }

    spans.push(Span::styled(
        "  |  Enter send · F2 metadata · PgUp/PgDn scroll · Esc quit",
        Style::default().fg(theme::DIM_GRAY),
    ));

    Line::from(spans)
}
