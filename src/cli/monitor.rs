//! Headless bridge between stdin/stdout and a serial port.
use anyhow::{anyhow, Result};
use std::future::Future;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::{
    cli::LaunchOptions,
    core::logs::{encode_line, InputMode, LineEnding},
    protocol::runtime::{PortRuntimeHandle, RuntimeEvent},
};

pub async fn run_monitor(port_name: &str, opts: &LaunchOptions) -> Result<()> {
    let runtime = PortRuntimeHandle::spawn(port_name.to_string(), opts.config)
        .map_err(|err| anyhow!("cannot open {port_name}: {err}"))?;
    log::info!("monitoring {port_name} at {}", opts.config.summary());

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let result = bridge(
        &runtime,
        stdin,
        &mut stdout,
        opts.line_ending,
        interrupted(),
    )
    .await;
    runtime.stop();
    result
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
async fn interrupted() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::warn!("cannot listen for Ctrl-C: {err}");
        std::future::pending::<()>().await;
    }
}

/// Copy lines from `input` to the port and received bytes to `output`.
///
/// Returns on end of input, when `shutdown` resolves, or when the port goes
/// away. A read pending on `input` is abandoned on shutdown.
pub async fn bridge<R, W, S>(
    runtime: &PortRuntimeHandle,
    input: R,
    output: &mut W,
    ending: LineEnding,
    shutdown: S,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    S: Future<Output = ()>,
{
    let mut lines = input.lines();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => {
                    if let Some(bytes) = encode_line(&line, InputMode::Ascii, ending) {
                        if !bytes.is_empty() {
                            runtime.write(bytes)?;
                        }
                    }
                }
                None => {
                    log::info!("input closed");
                    break;
                }
            },
            evt = runtime.evt_rx.recv_async() => match evt {
                Ok(RuntimeEvent::Received(bytes)) => {
                    output.write_all(&bytes).await?;
                    output.flush().await?;
                }
                Ok(RuntimeEvent::Error(err)) => {
                    log::error!("{}: {}", runtime.port_name, err.describe());
                    if err.is_fatal() {
                        return Err(anyhow!("{}: {err}", runtime.port_name));
                    }
                }
                Ok(RuntimeEvent::Stopped) | Err(_) => {
                    return Err(anyhow!("{} closed unexpectedly", runtime.port_name));
                }
                Ok(_) => {}
            },
            _ = &mut shutdown => {
                log::info!("interrupted");
                break;
            }
        }
    }

    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::protocol::config::SerialConfig;
    use serialport::{SerialPort, TTYPort};
    use std::{
        io::{Read, Write},
        time::Duration,
    };

    #[tokio::test]
    async fn bridges_both_directions() -> Result<()> {
        let (ours, mut remote) = TTYPort::pair()?;
        remote.set_timeout(Duration::from_secs(2))?;
        let runtime = PortRuntimeHandle::from_existing(
            "pty".to_string(),
            Box::new(ours),
            SerialConfig::default(),
        )?;

        remote.write_all(b"OK")?;
        remote.flush()?;

        let (mut feed, input) = tokio::io::duplex(64);
        let mut output = Vec::new();
        let feeder = async move {
            feed.write_all(b"AT\n").await?;
            tokio::time::sleep(Duration::from_millis(500)).await;
            drop(feed);
            anyhow::Ok(())
        };
        let (bridged, fed) = tokio::join!(
            bridge(
                &runtime,
                BufReader::new(input),
                &mut output,
                LineEnding::Lf,
                std::future::pending(),
            ),
            feeder
        );
        bridged?;
        fed?;

        assert_eq!(output, b"OK");
        let mut sent = [0u8; 3];
        remote.read_exact(&mut sent)?;
        assert_eq!(&sent, b"AT\n");
        Ok(())
    }

    #[tokio::test]
    async fn interrupt_ends_the_bridge_while_input_is_idle() -> Result<()> {
        let (ours, _remote) = TTYPort::pair()?;
        let runtime = PortRuntimeHandle::from_existing(
            "pty".to_string(),
            Box::new(ours),
            SerialConfig::default(),
        )?;

        // The writing half stays alive, so the input never reaches EOF.
        let (_feed, input) = tokio::io::duplex(64);
        let mut output = Vec::new();
        let bridged = tokio::time::timeout(
            Duration::from_secs(2),
            bridge(
                &runtime,
                BufReader::new(input),
                &mut output,
                LineEnding::None,
                tokio::time::sleep(Duration::from_millis(100)),
            ),
        )
        .await;

        assert!(matches!(bridged, Ok(Ok(()))), "{bridged:?}");
        assert!(output.is_empty());
        runtime.stop();
        Ok(())
    }
}
