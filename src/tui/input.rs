use anyhow::{anyhow, Result};
use std::time::Duration;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::{
    core::bus::{request_refresh, Bus, UiToCore},
    tui::status::{write_status, Focus, Status},
};

const PAGE_LINES: usize = 10;

/// Spawn the input handling thread that processes keyboard events
pub fn run_input_thread(bus: Bus, kill_rx: flume::Receiver<()>) -> Result<()> {
    log::info!("Input thread started");
    loop {
        if let Ok(true) = crossterm::event::poll(Duration::from_millis(100)) {
            if let Ok(event) = crossterm::event::read() {
                handle_event(event, &bus)?;
            }
        }

        // Exit on the kill signal, or when the core thread is gone
        if !matches!(kill_rx.try_recv(), Err(flume::TryRecvError::Empty)) {
            break;
        }
    }

    Ok(())
}

pub fn handle_event(event: Event, bus: &Bus) -> Result<()> {
    let Event::Key(key) = event else {
        if matches!(event, Event::Resize(_, _)) {
            request_refresh(&bus.ui_tx).map_err(|err| anyhow!(err))?;
        }
        return Ok(());
    };
    if key.kind != KeyEventKind::Press {
        return Ok(()); // Ignore repeat / release
    }

    let requests = write_status(|status| Ok(handle_key(status, key)))?;
    for msg in requests {
        bus.ui_tx.send(msg).map_err(|err| anyhow!(err))?;
    }
    request_refresh(&bus.ui_tx).map_err(|err| anyhow!(err))?;
    Ok(())
}

/// Apply a key press to the view state and return the requests for the core thread.
///
/// Purely local changes (focus, cursor, typed text, view modes, scrolling) are
/// made directly on `status`; anything touching the port goes to the core.
pub fn handle_key(status: &mut Status, key: KeyEvent) -> Vec<UiToCore> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return vec![UiToCore::Quit];
    }

    match key.code {
        KeyCode::Tab => {
            status.focus = status.focus.next();
            return Vec::new();
        }
        KeyCode::BackTab => {
            status.focus = status.focus.prev();
            return Vec::new();
        }
        _ => {}
    }

    if status.focus == Focus::Input {
        return handle_input_key(status, key);
    }

    match key.code {
        KeyCode::Char('q') => vec![UiToCore::Quit],
        KeyCode::Char('c') => vec![UiToCore::Connect],
        KeyCode::Char('d') => vec![UiToCore::Disconnect],
        KeyCode::Char('r') => vec![UiToCore::RescanPorts],
        KeyCode::Char('x') => match status.focus {
            Focus::Messages => vec![UiToCore::ClearMessages],
            Focus::Info => vec![UiToCore::ClearInfo],
            _ => Vec::new(),
        },
        KeyCode::Char('m') => {
            status.session.display_mode = status.session.display_mode.toggled();
            Vec::new()
        }
        KeyCode::Char('i') => {
            status.session.input_mode = status.session.input_mode.toggled();
            Vec::new()
        }
        KeyCode::Char('e') => {
            status.session.line_ending = status.session.line_ending.cycled();
            Vec::new()
        }
        KeyCode::Enter if status.focus == Focus::Ports => {
            if status.session.is_open() {
                vec![UiToCore::Disconnect]
            } else {
                vec![UiToCore::Connect]
            }
        }
        KeyCode::Up | KeyCode::Char('k') => {
            navigate(status, false, 1);
            Vec::new()
        }
        KeyCode::Down | KeyCode::Char('j') => {
            navigate(status, true, 1);
            Vec::new()
        }
        KeyCode::PageUp => {
            navigate(status, false, PAGE_LINES);
            Vec::new()
        }
        KeyCode::PageDown => {
            navigate(status, true, PAGE_LINES);
            Vec::new()
        }
        KeyCode::End => {
            match status.focus {
                Focus::Messages => status.session.messages.scroll_to_bottom(),
                Focus::Info => status.session.info.scroll_to_bottom(),
                _ => {}
            }
            Vec::new()
        }
        KeyCode::Left | KeyCode::Right if status.focus == Focus::Settings => {
            vec![UiToCore::CycleConfig(
                status.settings_cursor,
                key.code == KeyCode::Right,
            )]
        }
        _ => Vec::new(),
    }
}

fn handle_input_key(status: &mut Status, key: KeyEvent) -> Vec<UiToCore> {
    match key.code {
        KeyCode::Enter => vec![UiToCore::SendLine(status.input.clone())],
        KeyCode::Backspace => {
            status.input.pop();
            Vec::new()
        }
        KeyCode::Esc => {
            status.focus = Focus::Ports;
            Vec::new()
        }
        KeyCode::Char(c) => {
            status.input.push(c);
            Vec::new()
        }
        _ => Vec::new(),
    }
}

fn navigate(status: &mut Status, down: bool, lines: usize) {
    match status.focus {
        Focus::Ports => {
            for _ in 0..lines.min(status.session.ports.len().max(1)) {
                if down {
                    status.session.select_next();
                } else {
                    status.session.select_prev();
                }
            }
        }
        Focus::Settings => status.move_settings_cursor(down),
        Focus::Messages if down => status.session.messages.scroll_down(lines),
        Focus::Messages => status.session.messages.scroll_up(lines),
        Focus::Info if down => status.session.info.scroll_down(lines),
        Focus::Info => status.session.info.scroll_up(lines),
        Focus::Input => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{logs::LineEnding, session::Session},
        protocol::{
            backend::PortBackend,
            config::{ConfigField, SerialConfig},
            error::PortError,
            runtime::PortRuntimeHandle,
        },
    };
    use serialport::SerialPortInfo;

    struct NoPorts;

    impl PortBackend for NoPorts {
        fn enumerate(&self) -> Vec<SerialPortInfo> {
            Vec::new()
        }

        fn open(&self, _: &str, _: SerialConfig) -> Result<PortRuntimeHandle, PortError> {
            Err(PortError::DeviceNotFound)
        }
    }

    fn status() -> Status {
        Status::new(Session::new(Box::new(NoPorts)))
    }

    fn press(status: &mut Status, code: KeyCode) -> Vec<UiToCore> {
        handle_key(status, KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn global_keys_map_to_core_requests() {
        let mut status = status();
        assert_eq!(press(&mut status, KeyCode::Char('c')), vec![UiToCore::Connect]);
        assert_eq!(press(&mut status, KeyCode::Char('d')), vec![UiToCore::Disconnect]);
        assert_eq!(press(&mut status, KeyCode::Char('r')), vec![UiToCore::RescanPorts]);
        assert_eq!(press(&mut status, KeyCode::Char('q')), vec![UiToCore::Quit]);
        assert_eq!(
            handle_key(
                &mut status,
                KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)
            ),
            vec![UiToCore::Quit]
        );
    }

    #[test]
    fn typing_goes_to_the_input_line() {
        let mut status = status();
        status.focus = Focus::Input;
        for c in "qcd".chars() {
            assert!(press(&mut status, KeyCode::Char(c)).is_empty());
        }
        press(&mut status, KeyCode::Backspace);
        assert_eq!(status.input, "qc");
        assert_eq!(
            press(&mut status, KeyCode::Enter),
            vec![UiToCore::SendLine("qc".to_string())]
        );
        press(&mut status, KeyCode::Esc);
        assert_eq!(status.focus, Focus::Ports);
    }

    #[test]
    fn settings_picker_requests_relative_steps() {
        let mut status = status();
        status.focus = Focus::Settings;
        // Repeated presses before the core catches up must each count.
        for _ in 0..2 {
            assert_eq!(
                press(&mut status, KeyCode::Right),
                vec![UiToCore::CycleConfig(ConfigField::BaudRate, true)]
            );
        }
        assert_eq!(status.session.config, SerialConfig::default());

        press(&mut status, KeyCode::Down);
        assert_eq!(status.settings_cursor, ConfigField::DataBits);
        assert_eq!(
            press(&mut status, KeyCode::Left),
            vec![UiToCore::CycleConfig(ConfigField::DataBits, false)]
        );
    }

    #[test]
    fn clear_follows_focus() {
        let mut status = status();
        assert!(press(&mut status, KeyCode::Char('x')).is_empty());
        status.focus = Focus::Messages;
        assert_eq!(
            press(&mut status, KeyCode::Char('x')),
            vec![UiToCore::ClearMessages]
        );
        status.focus = Focus::Info;
        assert_eq!(press(&mut status, KeyCode::Char('x')), vec![UiToCore::ClearInfo]);
    }

    #[test]
    fn view_toggles_are_local() {
        let mut status = status();
        press(&mut status, KeyCode::Char('e'));
        assert_eq!(status.session.line_ending, LineEnding::Lf);
        press(&mut status, KeyCode::Char('m'));
        press(&mut status, KeyCode::Char('i'));
        assert_eq!(status.session.display_mode.label(), "hex");
        assert_eq!(status.session.input_mode.label(), "hex");
    }
}
