use bytes::Bytes;
use flume::{Receiver, Sender};
use std::{
    io::{self, Read, Write},
    thread,
    time::Duration,
};

use serialport::SerialPort;

use super::{config::SerialConfig, error::PortError};

/// Read timeout of the worker; short so queued commands are picked up promptly.
const READ_TIMEOUT: Duration = Duration::from_millis(50);
const READ_CHUNK: usize = 1024;

#[derive(Debug)]
pub enum RuntimeCommand {
    Reconfigure(SerialConfig),
    Write(Vec<u8>),
    Stop,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeEvent {
    Received(Bytes),
    Sent(Bytes),
    Reconfigured(SerialConfig),
    Error(PortError),
    Stopped,
}

/// Handle to an open port whose I/O runs on a dedicated worker thread.
///
/// Dropping the handle closes the command channel, which also stops the worker.
pub struct PortRuntimeHandle {
    pub port_name: String,
    pub current_cfg: SerialConfig,
    cmd_tx: Sender<RuntimeCommand>,
    pub evt_rx: Receiver<RuntimeEvent>,
    worker: Option<thread::JoinHandle<()>>,
}

impl std::fmt::Debug for PortRuntimeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortRuntimeHandle")
            .field("port_name", &self.port_name)
            .field("current_cfg", &self.current_cfg)
            .finish_non_exhaustive()
    }
}

impl PortRuntimeHandle {
    pub fn spawn(port_name: String, initial: SerialConfig) -> Result<Self, PortError> {
        initial.validate()?;
        let builder = serialport::new(port_name.clone(), initial.baud_rate.value())
            .timeout(READ_TIMEOUT);
        let builder = initial.apply_builder(builder)?;
        let handle = builder
            .open()
            .map_err(|err| {
                log::warn!("open {port_name} failed: {err}");
                PortError::from_serial(&err, PortError::Unknown)
            })?;
        log::info!("opened {port_name} at {}", initial.summary());
        Ok(Self::start(port_name, handle, initial))
    }

    /// Wrap a port that was opened elsewhere. The configuration is applied first.
    pub fn from_existing(
        port_name: String,
        mut handle: Box<dyn SerialPort>,
        initial: SerialConfig,
    ) -> Result<Self, PortError> {
        initial.apply_to_port(handle.as_mut())?;
        handle.set_timeout(READ_TIMEOUT)?;
        Ok(Self::start(port_name, handle, initial))
    }

    fn start(port_name: String, handle: Box<dyn SerialPort>, initial: SerialConfig) -> Self {
        let (cmd_tx, cmd_rx) = flume::unbounded();
        let (evt_tx, evt_rx) = flume::unbounded();
        let thread_name = format!("serial-{}", port_name.rsplit('/').next().unwrap_or("port"));
        let worker = thread::Builder::new()
            .name(thread_name)
            .spawn(move || run_loop(handle, cmd_rx, evt_tx));
        let worker = match worker {
            Ok(worker) => Some(worker),
            Err(err) => {
                log::error!("failed to spawn serial worker: {err}");
                None
            }
        };
        Self {
            port_name,
            current_cfg: initial,
            cmd_tx,
            evt_rx,
            worker,
        }
    }

    pub fn write(&self, bytes: Vec<u8>) -> Result<(), PortError> {
        self.cmd_tx
            .send(RuntimeCommand::Write(bytes))
            .map_err(|_| PortError::NotOpen)
    }

    pub fn reconfigure(&mut self, cfg: SerialConfig) -> Result<(), PortError> {
        cfg.validate()?;
        self.cmd_tx
            .send(RuntimeCommand::Reconfigure(cfg))
            .map_err(|_| PortError::NotOpen)?;
        self.current_cfg = cfg;
        Ok(())
    }

    /// Ask the worker to close the port and wait for it to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let _ = self.cmd_tx.send(RuntimeCommand::Stop);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("serial worker for {} panicked", self.port_name);
            }
        }
    }
}

impl Drop for PortRuntimeHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_loop(
    mut serial: Box<dyn SerialPort>,
    cmd_rx: Receiver<RuntimeCommand>,
    evt_tx: Sender<RuntimeEvent>,
) {
    let mut buf = [0u8; READ_CHUNK];
    loop {
        loop {
            let cmd = match cmd_rx.try_recv() {
                Ok(cmd) => cmd,
                Err(flume::TryRecvError::Empty) => break,
                Err(flume::TryRecvError::Disconnected) => {
                    log::debug!("runtime handle dropped, closing port");
                    return;
                }
            };
            match cmd {
                RuntimeCommand::Reconfigure(cfg) => match cfg.apply_to_port(serial.as_mut()) {
                    Ok(()) => {
                        log::info!("reconfigured port to {}", cfg.summary());
                        let _ = evt_tx.send(RuntimeEvent::Reconfigured(cfg));
                    }
                    Err(err) => {
                        let _ = evt_tx.send(RuntimeEvent::Error(err));
                    }
                },
                RuntimeCommand::Write(bytes) => {
                    match serial.write_all(&bytes).and_then(|_| serial.flush()) {
                        Ok(()) => {
                            log::debug!("tx {} bytes", bytes.len());
                            let _ = evt_tx.send(RuntimeEvent::Sent(bytes.into()));
                        }
                        Err(err) => {
                            log::warn!("write failed: {err}");
                            let code = PortError::from_io(&err, PortError::Write);
                            let _ = evt_tx.send(RuntimeEvent::Error(code));
                            if code.is_fatal() {
                                let _ = evt_tx.send(RuntimeEvent::Stopped);
                                return;
                            }
                        }
                    }
                }
                RuntimeCommand::Stop => {
                    let _ = evt_tx.send(RuntimeEvent::Stopped);
                    return;
                }
            }
        }

        match serial.read(&mut buf) {
            Ok(n) if n > 0 => {
                log::debug!("rx {n} bytes");
                let _ = evt_tx.send(RuntimeEvent::Received(Bytes::copy_from_slice(&buf[..n])));
            }
            Ok(_) => thread::sleep(Duration::from_millis(2)),
            Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::Interrupted) => {}
            Err(e) => {
                log::warn!("read failed: {e}");
                let code = PortError::from_io(&e, PortError::Read);
                let _ = evt_tx.send(RuntimeEvent::Error(code));
                if code.is_fatal() {
                    let _ = evt_tx.send(RuntimeEvent::Stopped);
                    return;
                }
                thread::sleep(READ_TIMEOUT);
            }
        }
    }
}
