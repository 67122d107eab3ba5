use ratatui::{prelude::*, widgets::*};
use unicode_width::UnicodeWidthChar;

use crate::{
    core::logs::{Direction as Flow, LogLevel},
    i18n::lang,
    tui::{
        status::{Focus, Status},
        ui::{is_focused, panel_block},
    },
};

const TIME_FORMAT: &str = "%H:%M:%S";

fn inner_height(area: Rect) -> usize {
    area.height.saturating_sub(2) as usize
}

pub fn render_messages(f: &mut Frame, area: Rect, app: &Status) {
    let session = &app.session;
    let title = format!(
        "{}  [{} {}]",
        lang().messages_title,
        lang().label_view,
        session.display_mode.label()
    );
    let block = panel_block(&title, is_focused(app, Focus::Messages));

    let lines: Vec<Line> = session
        .messages
        .visible(inner_height(area))
        .map(|entry| {
            let (tag, color) = match entry.direction {
                Flow::Rx => ("RX", Color::Cyan),
                Flow::Tx => ("TX", Color::Yellow),
            };
            Line::from(vec![
                Span::styled(
                    format!("[{}] ", entry.timestamp.format(TIME_FORMAT)),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    format!("{tag} "),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
                Span::raw(entry.render(session.display_mode)),
            ])
        })
        .collect();

    f.render_widget(Paragraph::new(lines).block(block), area);
}

pub fn render_info(f: &mut Frame, area: Rect, app: &Status) {
    let block = panel_block(&lang().info_title, is_focused(app, Focus::Info));

    let lines: Vec<Line> = app
        .session
        .info
        .visible(inner_height(area))
        .map(|entry| {
            let color = match entry.level {
                LogLevel::Info => Color::Reset,
                LogLevel::Warning => Color::Yellow,
                LogLevel::Error => Color::Red,
            };
            Line::from(vec![
                Span::styled(
                    format!("[{}] ", entry.timestamp.format(TIME_FORMAT)),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(entry.to_string(), Style::default().fg(color)),
            ])
        })
        .collect();

    f.render_widget(Paragraph::new(lines).block(block), area);
}

pub fn render_input(f: &mut Frame, area: Rect, app: &Status) {
    let focused = is_focused(app, Focus::Input);
    let session = &app.session;
    let title = format!(
        "{}  [{} {}] [{} {}]",
        lang().input_title,
        lang().label_input,
        session.input_mode.label(),
        lang().label_ending,
        session.line_ending.label()
    );
    let block = panel_block(&title, focused);

    // Prompt, cursor cell and borders take five columns.
    let room = (area.width as usize).saturating_sub(5);
    let mut spans = vec![Span::raw("> "), Span::raw(tail_fitting(&app.input, room))];
    if focused {
        spans.push(Span::styled(
            " ",
            Style::default().bg(Color::LightGreen),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

/// Longest suffix of `text` whose display width fits in `max_width` columns.
fn tail_fitting(text: &str, max_width: usize) -> &str {
    let mut width = 0;
    let mut start = text.len();
    for (idx, ch) in text.char_indices().rev() {
        width += ch.width().unwrap_or(0);
        if width > max_width {
            break;
        }
        start = idx;
    }
    &text[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_keeps_the_cursor_end_visible() {
        assert_eq!(tail_fitting("hello", 10), "hello");
        assert_eq!(tail_fitting("hello", 3), "llo");
        assert_eq!(tail_fitting("日本語", 4), "本語");
        assert_eq!(tail_fitting("abc", 0), "");
    }
}
