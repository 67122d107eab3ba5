/// Core loop shared by the frontends.
///
/// The loop owns no state of its own: everything observable lives behind a
/// [`CoreContext`], which the frontend implements on top of its session state.
use anyhow::{anyhow, Result};
use std::time::{Duration, Instant};

use super::bus::{mark_refresh_complete, CoreToUi, UiToCore};
use crate::protocol::config::{ConfigField, SerialConfig};

/// Configuration for the core runtime
pub struct CoreRuntimeConfig {
    /// How long the loop waits for a UI message before polling the port again
    pub poll_interval: Duration,
    /// Interval between heartbeat ticks sent to the UI
    pub tick_interval: Duration,
}

impl Default for CoreRuntimeConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(20),
            tick_interval: Duration::from_secs(1),
        }
    }
}

/// Operations the core loop drives on behalf of the UI.
pub trait CoreContext: Send {
    /// Re-enumerate host ports
    fn scan_ports(&mut self) -> Result<()>;

    fn connect(&mut self) -> Result<()>;

    fn disconnect(&mut self) -> Result<()>;

    fn send_line(&mut self, line: &str) -> Result<()>;

    fn set_config(&mut self, cfg: SerialConfig) -> Result<()>;

    /// Step `field` relative to the config the session holds right now
    fn cycle_config(&mut self, field: ConfigField, forward: bool) -> Result<()>;

    fn clear_messages(&mut self) -> Result<()>;

    fn clear_info(&mut self) -> Result<()>;

    /// Drain pending port events. Returns `true` when anything visible changed.
    fn tick(&mut self) -> Result<bool>;

    /// Close everything before the process exits
    fn shutdown(&mut self) -> Result<()>;
}

fn dispatch<C: CoreContext>(context: &mut C, msg: UiToCore) -> Result<()> {
    match msg {
        UiToCore::Refresh => {
            mark_refresh_complete();
            Ok(())
        }
        UiToCore::Quit => Ok(()),
        UiToCore::RescanPorts => context.scan_ports(),
        UiToCore::Connect => context.connect(),
        UiToCore::Disconnect => context.disconnect(),
        UiToCore::SendLine(line) => context.send_line(&line),
        UiToCore::SetConfig(cfg) => context.set_config(cfg),
        UiToCore::CycleConfig(field, forward) => context.cycle_config(field, forward),
        UiToCore::ClearMessages => context.clear_messages(),
        UiToCore::ClearInfo => context.clear_info(),
    }
}

/// Run the core thread with a given context
///
/// This is the main loop that handles:
/// - Processing UI messages
/// - Pumping events of the open port
/// - Heartbeat ticks for the renderer
pub fn run_core_thread<C: CoreContext>(
    ui_rx: flume::Receiver<UiToCore>,
    core_tx: flume::Sender<CoreToUi>,
    input_kill_tx: flume::Sender<()>,
    config: CoreRuntimeConfig,
    mut context: C,
) -> Result<()> {
    let mut last_tick = Instant::now();

    loop {
        let first = match ui_rx.recv_timeout(config.poll_interval) {
            Ok(msg) => Some(msg),
            Err(flume::RecvTimeoutError::Timeout) => None,
            Err(flume::RecvTimeoutError::Disconnected) => Some(UiToCore::Quit),
        };

        // Process all pending messages from UI
        for msg in first.into_iter().chain(ui_rx.try_iter()) {
            if msg == UiToCore::Quit {
                log::info!("Received quit signal");
                if let Err(err) = context.shutdown() {
                    log::warn!("Shutdown failed: {err}");
                }
                let _ = input_kill_tx.send(());
                core_tx
                    .send(CoreToUi::Quit)
                    .map_err(|err| anyhow!("Failed to send Quit to UI: {err}"))?;
                return Ok(());
            }

            let reply = match dispatch(&mut context, msg.clone()) {
                Ok(()) => CoreToUi::Refreshed,
                Err(err) => {
                    log::warn!("Handling {msg:?} failed: {err}");
                    CoreToUi::Error
                }
            };
            core_tx
                .send(reply)
                .map_err(|err| anyhow!("Failed to send reply to UI: {err}"))?;
        }

        match context.tick() {
            Ok(true) => core_tx
                .send(CoreToUi::Refreshed)
                .map_err(|err| anyhow!("Failed to send Refreshed: {err}"))?,
            Ok(false) => {}
            Err(err) => log::warn!("Context tick failed: {err}"),
        }

        if last_tick.elapsed() >= config.tick_interval {
            last_tick = Instant::now();
            core_tx
                .send(CoreToUi::Tick)
                .map_err(|err| anyhow!("Failed to send Tick: {err}"))?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Recorder {
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl Recorder {
        fn record(&self, call: impl Into<String>) {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(call.into());
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().map(|c| c.clone()).unwrap_or_default()
        }
    }

    impl CoreContext for Recorder {
        fn scan_ports(&mut self) -> Result<()> {
            self.record("scan");
            Ok(())
        }
        fn connect(&mut self) -> Result<()> {
            self.record("connect");
            Err(anyhow!("no port selected"))
        }
        fn disconnect(&mut self) -> Result<()> {
            self.record("disconnect");
            Ok(())
        }
        fn send_line(&mut self, line: &str) -> Result<()> {
            self.record(format!("send {line}"));
            Ok(())
        }
        fn set_config(&mut self, cfg: SerialConfig) -> Result<()> {
            self.record(format!("config {}", cfg.summary()));
            Ok(())
        }
        fn cycle_config(&mut self, field: ConfigField, forward: bool) -> Result<()> {
            self.record(format!("cycle {field} {forward}"));
            Ok(())
        }
        fn clear_messages(&mut self) -> Result<()> {
            self.record("clear messages");
            Ok(())
        }
        fn clear_info(&mut self) -> Result<()> {
            self.record("clear info");
            Ok(())
        }
        fn tick(&mut self) -> Result<bool> {
            Ok(false)
        }
        fn shutdown(&mut self) -> Result<()> {
            self.record("shutdown");
            Ok(())
        }
    }

    #[test]
    fn dispatches_messages_in_order_and_stops_on_quit() -> Result<()> {
        let (ui_tx, ui_rx) = flume::unbounded();
        let (core_tx, core_rx) = flume::unbounded();
        let (kill_tx, kill_rx) = flume::bounded(1);
        let recorder = Recorder::default();

        ui_tx.send(UiToCore::RescanPorts)?;
        ui_tx.send(UiToCore::Connect)?;
        ui_tx.send(UiToCore::SendLine("AT".to_string()))?;
        ui_tx.send(UiToCore::SetConfig(SerialConfig::default()))?;
        ui_tx.send(UiToCore::CycleConfig(ConfigField::Parity, false))?;
        ui_tx.send(UiToCore::ClearInfo)?;
        ui_tx.send(UiToCore::Quit)?;
        ui_tx.send(UiToCore::ClearMessages)?;

        run_core_thread(
            ui_rx,
            core_tx,
            kill_tx,
            CoreRuntimeConfig::default(),
            recorder.clone(),
        )?;

        assert_eq!(
            recorder.calls(),
            vec![
                "scan",
                "connect",
                "send AT",
                "config 9600 8N1",
                "cycle Parity false",
                "clear info",
                "shutdown"
            ]
        );
        let replies: Vec<_> = core_rx.try_iter().collect();
        assert_eq!(replies[1], CoreToUi::Error);
        assert_eq!(replies.last(), Some(&CoreToUi::Quit));
        assert!(kill_rx.try_recv().is_ok());
        Ok(())
    }

    #[test]
    fn dropped_ui_sender_shuts_down() -> Result<()> {
        let (ui_tx, ui_rx) = flume::unbounded::<UiToCore>();
        let (core_tx, _core_rx) = flume::unbounded();
        let (kill_tx, _kill_rx) = flume::bounded(1);
        let recorder = Recorder::default();
        drop(ui_tx);
        run_core_thread(
            ui_rx,
            core_tx,
            kill_tx,
            CoreRuntimeConfig::default(),
            recorder.clone(),
        )?;
        assert_eq!(recorder.calls(), vec!["shutdown"]);
        Ok(())
    }
}
