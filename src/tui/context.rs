use anyhow::Result;

use crate::{
    core::runtime::CoreContext,
    protocol::config::{ConfigField, SerialConfig},
    tui::status::write_status,
};

/// Drives the session stored in the global TUI status.
#[derive(Debug, Default)]
pub struct TuiContext;

impl CoreContext for TuiContext {
    fn scan_ports(&mut self) -> Result<()> {
        write_status(|status| {
            status.session.refresh_ports();
            Ok(())
        })
    }

    fn connect(&mut self) -> Result<()> {
        write_status(|status| status.session.connect())
    }

    fn disconnect(&mut self) -> Result<()> {
        write_status(|status| status.session.disconnect())
    }

    fn send_line(&mut self, line: &str) -> Result<()> {
        write_status(|status| {
            let sent = status.session.send_line(line)?;
            // Only clear what was sent; keep anything typed since.
            if sent && status.input == line {
                status.input.clear();
            }
            Ok(())
        })
    }

    fn set_config(&mut self, cfg: SerialConfig) -> Result<()> {
        write_status(|status| status.session.set_config(cfg))
    }

    fn cycle_config(&mut self, field: ConfigField, forward: bool) -> Result<()> {
        write_status(|status| status.session.cycle_config(field, forward))
    }

    fn clear_messages(&mut self) -> Result<()> {
        write_status(|status| {
            status.session.clear_messages();
            Ok(())
        })
    }

    fn clear_info(&mut self) -> Result<()> {
        write_status(|status| {
            status.session.clear_info();
            Ok(())
        })
    }

    fn tick(&mut self) -> Result<bool> {
        write_status(|status| Ok(status.session.pump_events()))
    }

    fn shutdown(&mut self) -> Result<()> {
        write_status(|status| {
            status.session.shutdown();
            Ok(())
        })
    }
}
