use ratatui::{prelude::*, widgets::*};

use crate::{
    i18n::lang,
    tui::status::{Focus, Status},
};

pub fn render_bottom(f: &mut Frame, area: Rect, app: &Status) {
    let hints = match app.focus {
        Focus::Input => lang().hint_input.as_str(),
        _ => lang().hint_main.as_str(),
    };
    let help_block = Block::default()
        .borders(Borders::NONE)
        .style(Style::default().bg(Color::Gray).fg(Color::White));
    let help = Paragraph::new(hints)
        .alignment(Alignment::Center)
        .block(help_block);
    f.render_widget(help, area);
}
