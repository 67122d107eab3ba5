/// Connection session: the selected port, its settings, the open runtime and
/// the two scrollback panels.
///
/// Every user-facing outcome is reported as an info panel entry; the `Result`
/// returned by the operations only tells the caller whether the step succeeded.
use anyhow::{anyhow, Result};
use chrono::{DateTime, Local};

use crate::{
    core::logs::{
        encode_line, Direction, DisplayMode, InputMode, LineEnding, LogEntry, LogLevel,
        MessageEntry, Scrollback,
    },
    i18n::lang,
    protocol::{
        backend::PortBackend,
        config::{ConfigField, SerialConfig},
        error::PortError,
        runtime::{PortRuntimeHandle, RuntimeEvent},
        tty::{summarize_ports, PortSummary},
    },
};

pub struct Session {
    backend: Box<dyn PortBackend>,
    pub ports: Vec<PortSummary>,
    pub selected: usize,
    pub config: SerialConfig,
    pub input_mode: InputMode,
    pub line_ending: LineEnding,
    pub display_mode: DisplayMode,
    pub messages: Scrollback<MessageEntry>,
    pub info: Scrollback<LogEntry>,
    pub last_refresh: Option<DateTime<Local>>,
    runtime: Option<PortRuntimeHandle>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("ports", &self.ports.len())
            .field("selected", &self.selected)
            .field("config", &self.config)
            .field("runtime", &self.runtime)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(backend: Box<dyn PortBackend>) -> Self {
        Self {
            backend,
            ports: Vec::new(),
            selected: 0,
            config: SerialConfig::default(),
            input_mode: InputMode::default(),
            line_ending: LineEnding::default(),
            display_mode: DisplayMode::default(),
            messages: Scrollback::default(),
            info: Scrollback::default(),
            last_refresh: None,
            runtime: None,
        }
    }

    pub fn log(&mut self, level: LogLevel, message: impl Into<String>) {
        let entry = LogEntry::new(level, message);
        match level {
            LogLevel::Info => log::info!("{entry}"),
            LogLevel::Warning => log::warn!("{entry}"),
            LogLevel::Error => log::error!("{entry}"),
        }
        self.info.push(entry);
    }

    /// Re-enumerate ports, keeping the selection on the same port name when it survives.
    pub fn refresh_ports(&mut self) {
        let previous = self.selected_port().map(|p| p.port_name.clone());
        self.ports = summarize_ports(&self.backend.enumerate());
        self.selected = previous
            .and_then(|name| self.ports.iter().position(|p| p.port_name == name))
            .unwrap_or(0);
        self.last_refresh = Some(Local::now());

        if self.ports.is_empty() {
            self.log(LogLevel::Error, lang().msg_no_ports.as_str());
        }
        self.log(LogLevel::Info, lang().msg_ports_updated.as_str());
    }

    pub fn selected_port(&self) -> Option<&PortSummary> {
        self.ports.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if !self.ports.is_empty() {
            self.selected = (self.selected + 1) % self.ports.len();
        }
    }

    pub fn select_prev(&mut self) {
        if !self.ports.is_empty() {
            if self.selected == 0 {
                self.selected = self.ports.len() - 1;
            } else {
                self.selected -= 1;
            }
        }
    }

    /// Select a port by name; unknown names leave the selection unchanged.
    pub fn select_by_name(&mut self, port_name: &str) -> bool {
        match self.ports.iter().position(|p| p.port_name == port_name) {
            Some(idx) => {
                self.selected = idx;
                true
            }
            None => false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.runtime.is_some()
    }

    pub fn open_port_name(&self) -> Option<&str> {
        self.runtime.as_ref().map(|r| r.port_name.as_str())
    }

    /// Open the selected port with the current settings.
    pub fn connect(&mut self) -> Result<()> {
        if let Some(name) = self.open_port_name() {
            let name = name.to_string();
            self.log(
                LogLevel::Warning,
                format!("{} ({name})", lang().msg_already_open),
            );
            return Err(anyhow!("{name} is already open"));
        }

        let Some(port_name) = self.selected_port().map(|p| p.port_name.clone()) else {
            self.log(LogLevel::Error, lang().msg_port_not_found.as_str());
            return Err(anyhow!("no port selected"));
        };

        match self.backend.open(&port_name, self.config) {
            Ok(runtime) => {
                self.runtime = Some(runtime);
                self.log(
                    LogLevel::Info,
                    format!(
                        "{}: {port_name} ({})",
                        lang().msg_port_opened,
                        self.config.summary()
                    ),
                );
                Ok(())
            }
            Err(err) => {
                self.log(
                    LogLevel::Error,
                    format!("{}: {err}", lang().msg_open_failed),
                );
                Err(anyhow!("open {port_name}: {err}"))
            }
        }
    }

    pub fn disconnect(&mut self) -> Result<()> {
        let Some(runtime) = self.runtime.take() else {
            self.log(LogLevel::Warning, lang().msg_nothing_open.as_str());
            return Ok(());
        };
        let port_name = runtime.port_name.clone();
        runtime.stop();
        self.log(
            LogLevel::Info,
            format!("{}: {port_name}", lang().msg_port_closed),
        );
        Ok(())
    }

    /// Change one setting by list index; applied live when a port is open.
    pub fn set_config_index(&mut self, field: ConfigField, index: usize) -> Result<()> {
        let mut cfg = self.config;
        if !cfg.set_index(field, index) {
            return Err(anyhow!("no option {index} for {field}"));
        }
        self.set_config(cfg)
    }

    /// Step one setting through its option list, starting from the stored config.
    pub fn cycle_config(&mut self, field: ConfigField, forward: bool) -> Result<()> {
        let mut cfg = self.config;
        cfg.cycle(field, forward);
        self.set_config(cfg)
    }

    pub fn set_config(&mut self, cfg: SerialConfig) -> Result<()> {
        if cfg == self.config {
            return Ok(());
        }
        self.config = cfg;
        let Some(runtime) = self.runtime.as_mut() else {
            return Ok(());
        };
        match runtime.reconfigure(cfg) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.log(
                    LogLevel::Error,
                    format!("{}: {err}", lang().msg_config_failed),
                );
                Err(anyhow!("reconfigure: {err}"))
            }
        }
    }

    /// Write a typed line to the open port and echo it into the messages panel.
    ///
    /// Returns `Ok(false)` when nothing was sent, so the caller keeps the input.
    pub fn send_line(&mut self, line: &str) -> Result<bool> {
        if !self.is_open() {
            self.log(LogLevel::Error, lang().msg_send_not_open.as_str());
            return Ok(false);
        }
        let Some(bytes) = encode_line(line, self.input_mode, self.line_ending) else {
            self.log(LogLevel::Error, lang().msg_bad_hex.as_str());
            return Ok(false);
        };
        if bytes.is_empty() {
            return Ok(false);
        }
        let written = match self.runtime.as_ref() {
            Some(runtime) => runtime.write(bytes.clone()),
            None => Err(PortError::NotOpen),
        };
        if let Err(err) = written {
            self.log(LogLevel::Error, err.describe());
            return Err(anyhow!("write: {err}"));
        }
        self.messages.push(MessageEntry::new(Direction::Tx, bytes));
        Ok(true)
    }

    pub fn clear_messages(&mut self) {
        self.messages.clear();
    }

    pub fn clear_info(&mut self) {
        self.info.clear();
    }

    /// Move pending runtime events into the panels. Returns `true` if anything changed.
    pub fn pump_events(&mut self) -> bool {
        let Some(runtime) = self.runtime.as_ref() else {
            return false;
        };
        let events: Vec<RuntimeEvent> = runtime.evt_rx.try_iter().collect();
        if events.is_empty() {
            return false;
        }

        let mut closed = false;
        for event in events {
            match event {
                RuntimeEvent::Received(bytes) => {
                    self.messages
                        .push(MessageEntry::new(Direction::Rx, bytes.to_vec()));
                }
                RuntimeEvent::Sent(_) => {}
                RuntimeEvent::Reconfigured(cfg) => {
                    self.log(
                        LogLevel::Info,
                        format!("{}: {}", lang().msg_config_applied, cfg.summary()),
                    );
                }
                RuntimeEvent::Error(err) => {
                    self.log(LogLevel::Error, err.describe());
                    closed |= err.is_fatal();
                }
                RuntimeEvent::Stopped => closed = true,
            }
        }

        if closed {
            if let Some(runtime) = self.runtime.take() {
                let port_name = runtime.port_name.clone();
                runtime.stop();
                self.log(
                    LogLevel::Warning,
                    format!("{}: {port_name}", lang().msg_port_lost),
                );
            }
        }
        true
    }

    /// Close the port without logging; used on exit.
    pub fn shutdown(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.stop();
        }
    }
}
