pub mod bottom;
pub mod panels;
pub mod title;
pub mod traffic;

use ratatui::{prelude::*, widgets::*};

use crate::tui::status::{Focus, Status};

pub fn render_ui(f: &mut Frame, app: &Status) {
    let area = f.area();
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(1), // Title
            Constraint::Min(0),
            Constraint::Length(1), // Bottom hints
        ])
        .split(area);

    title::render_title(f, main_chunks[0], app);
    render_panels(f, main_chunks[1], app);
    bottom::render_bottom(f, main_chunks[2], app);
}

fn render_panels(f: &mut Frame, area: Rect, app: &Status) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .margin(0)
        .constraints([Constraint::Percentage(32), Constraint::Percentage(68)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(7)])
        .split(columns[0]);
    panels::render_ports(f, left[0], app);
    panels::render_settings(f, left[1], app);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(8),
            Constraint::Length(3),
        ])
        .split(columns[1]);
    traffic::render_messages(f, right[0], app);
    traffic::render_info(f, right[1], app);
    traffic::render_input(f, right[2], app);
}

/// Bordered panel block, highlighted while it has focus.
pub(crate) fn panel_block(title: &str, focused: bool) -> Block<'static> {
    let block = Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_type(BorderType::Plain);
    if focused {
        block.border_style(
            Style::default()
                .fg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        block
    }
}

pub(crate) fn is_focused(app: &Status, focus: Focus) -> bool {
    app.focus == focus
}
