use anyhow::{anyhow, Result};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::{
    core::session::Session,
    protocol::config::{ConfigField, OptionList},
};

/// Which part of the screen receives navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Ports,
    Settings,
    Input,
    Messages,
    Info,
}

impl Focus {
    const ORDER: [Focus; 5] = [
        Focus::Ports,
        Focus::Settings,
        Focus::Input,
        Focus::Messages,
        Focus::Info,
    ];

    pub fn next(self) -> Self {
        let idx = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(idx + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(idx + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// Everything the terminal front end shows, plus the session behind it.
#[derive(Debug)]
pub struct Status {
    pub session: Session,
    pub focus: Focus,
    pub settings_cursor: ConfigField,
    pub input: String,
}

impl Status {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            focus: Focus::Ports,
            settings_cursor: ConfigField::BaudRate,
            input: String::new(),
        }
    }

    pub fn move_settings_cursor(&mut self, forward: bool) {
        self.settings_cursor = self.settings_cursor.cycled(forward);
    }
}

static TUI_STATUS: OnceCell<Arc<RwLock<Status>>> = OnceCell::new();

/// Initialize the global status instance. This should be called once at application startup.
pub fn init_status(status: Arc<RwLock<Status>>) -> Result<()> {
    TUI_STATUS
        .set(status)
        .map_err(|_| anyhow!("Status already initialized"))?;
    Ok(())
}

/// Read-only accessor for `Status`.
///
/// The closure may borrow from `Status`; its result is cloned before the lock
/// is released, so `R: Clone` is required.
pub fn read_status<R, F>(f: F) -> Result<R>
where
    F: FnOnce(&Status) -> Result<R>,
    R: Clone,
{
    let status = TUI_STATUS
        .get()
        .ok_or_else(|| anyhow!("Status not initialized"))?;
    let guard = status.read();
    let val = f(&guard)?;
    Ok(val.clone())
}

/// Write accessor for `Status`. Use `Ok(())` if no value is needed.
pub fn write_status<R, F>(mut f: F) -> Result<R>
where
    F: FnMut(&mut Status) -> Result<R>,
    R: Clone,
{
    let status = TUI_STATUS
        .get()
        .ok_or_else(|| anyhow!("Status not initialized"))?;
    let mut guard = status.write();
    let val = f(&mut guard)?;
    Ok(val.clone())
}
