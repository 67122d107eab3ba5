use std::sync::atomic::{AtomicBool, Ordering};

use flume::{Receiver, Sender};

use crate::protocol::config::{ConfigField, SerialConfig};

static REFRESH_PENDING: AtomicBool = AtomicBool::new(false);

/// Messages sent from UI thread to core worker thread.
#[derive(Debug, Clone, PartialEq)]
pub enum UiToCore {
    /// Request an immediate UI redraw without forcing a port rescan.
    Refresh,
    /// Re-enumerate host serial ports.
    RescanPorts,
    /// Open the selected port with the current configuration.
    Connect,
    /// Close the open port.
    Disconnect,
    /// Encode and write a typed line to the open port.
    SendLine(String),
    /// Replace the UART configuration; applied live when a port is open.
    SetConfig(SerialConfig),
    /// Step one setting to its next (`true`) or previous option in its list.
    CycleConfig(ConfigField, bool),
    ClearMessages,
    ClearInfo,
    /// Graceful shutdown request.
    Quit,
}

/// Messages sent from core worker thread back to UI thread.
#[derive(Debug, Clone, PartialEq)]
pub enum CoreToUi {
    /// Core completed a cycle of background work; UI may redraw.
    Tick,
    /// Core applied a refresh; UI may want to redraw sooner.
    Refreshed,
    /// Core encountered an error condition (already stored in Status, provided for wake-up).
    Error,
    /// Core is requesting UI to quit.
    Quit,
}

/// Simple holder passed into UI loop containing the receiving side from core and the sending side to core.
#[derive(Debug, Clone)]
pub struct Bus {
    pub core_rx: Receiver<CoreToUi>,
    pub ui_tx: Sender<UiToCore>,
}

impl Bus {
    pub fn new(core_rx: Receiver<CoreToUi>, ui_tx: Sender<UiToCore>) -> Self {
        Self { core_rx, ui_tx }
    }
}

/// Try to enqueue a refresh message unless one is already pending.
/// Returns `Ok(true)` when a message was sent, `Ok(false)` when it was coalesced.
pub fn request_refresh(sender: &Sender<UiToCore>) -> Result<bool, flume::SendError<UiToCore>> {
    if REFRESH_PENDING
        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .is_err()
    {
        return Ok(false);
    }

    sender.send(UiToCore::Refresh).map(|_| true)
}

/// Mark the refresh flag as cleared so the next request can be queued.
pub fn mark_refresh_complete() {
    REFRESH_PENDING.store(false, Ordering::Release);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_requests_are_coalesced() -> anyhow::Result<()> {
        let (tx, rx) = flume::unbounded();
        mark_refresh_complete();
        assert!(request_refresh(&tx)?);
        assert!(!request_refresh(&tx)?);
        assert_eq!(rx.len(), 1);
        mark_refresh_complete();
        assert!(request_refresh(&tx)?);
        assert_eq!(rx.len(), 2);
        mark_refresh_complete();
        Ok(())
    }
}
