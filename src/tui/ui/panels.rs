use ratatui::{prelude::*, widgets::*};
use strum::IntoEnumIterator;

use crate::{
    i18n::lang,
    protocol::config::ConfigField,
    tui::{
        status::{Focus, Status},
        ui::{is_focused, panel_block},
    },
};

pub fn render_ports(f: &mut Frame, area: Rect, app: &Status) {
    let session = &app.session;
    let title = match session.last_refresh {
        Some(at) => format!(
            "{} ({} {})",
            lang().ports_title,
            lang().label_scanned,
            at.format("%H:%M:%S")
        ),
        None => lang().ports_title.clone(),
    };
    let block = panel_block(&title, is_focused(app, Focus::Ports));

    if session.ports.is_empty() {
        let empty = Paragraph::new(lang().no_com_ports.as_str())
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true })
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let open = session.open_port_name();
    let items: Vec<ListItem> = session
        .ports
        .iter()
        .map(|p| {
            let marker = if open == Some(p.port_name.as_str()) {
                "● "
            } else {
                "  "
            };
            ListItem::new(Line::from(vec![
                Span::raw(format!("{marker}{}", p.label)),
                Span::styled(
                    format!("  {}", p.port_type),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let list = List::new(items).block(block).highlight_style(
        Style::default()
            .bg(Color::LightGreen)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );

    let mut state = ListState::default();
    state.select(Some(session.selected));
    f.render_stateful_widget(list, area, &mut state);
}

pub fn render_settings(f: &mut Frame, area: Rect, app: &Status) {
    let focused = is_focused(app, Focus::Settings);
    let block = panel_block(&lang().settings_title, focused);
    let cfg = &app.session.config;

    let lines: Vec<Line> = ConfigField::iter()
        .map(|field| {
            let selected = focused && field == app.settings_cursor;
            let value = if selected {
                format!("< {} >", cfg.label_of(field))
            } else {
                format!("  {}  ", cfg.label_of(field))
            };
            let value_style = if selected {
                Style::default()
                    .fg(Color::LightGreen)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::raw(format!("{:<13}", field.to_string())),
                Span::styled(value, value_style),
            ])
        })
        .collect();

    f.render_widget(Paragraph::new(lines).block(block), area);
}
