use ratatui::{prelude::*, widgets::*};

use crate::{i18n::lang, tui::status::Status};

pub fn render_title(f: &mut Frame, area: Rect, app: &Status) {
    // Horizontal layout: left (port state) + center (title) + right (reserved)
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(10),
            Constraint::Min(10),
            Constraint::Length(10),
        ])
        .split(area);

    let bg_block = Block::default()
        .borders(Borders::NONE)
        .style(Style::default().bg(Color::Gray));
    f.render_widget(bg_block, area);

    let (state, color) = if app.session.is_open() {
        (format!("● {}", lang().state_open), Color::Green)
    } else {
        (format!("○ {}", lang().state_closed), Color::DarkGray)
    };
    let state = Paragraph::new(state).style(Style::default().fg(color).add_modifier(Modifier::BOLD));
    f.render_widget(state, chunks[0]);

    let title_text = match app.session.open_port_name() {
        Some(name) => format!("{name} - {}", lang().title),
        None => lang().title.clone(),
    };
    let title_para = Paragraph::new(title_text)
        .alignment(Alignment::Center)
        .style(
            Style::default()
                .fg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(title_para, chunks[1]);
}
