pub mod context;
pub mod input;
pub mod status;
pub mod ui;

use anyhow::{anyhow, Result};
use parking_lot::RwLock;
use std::{io, sync::Arc, thread, time::Duration};

use ratatui::{backend::CrosstermBackend, prelude::*};

use crate::{
    core::{
        bus::{Bus, CoreToUi, UiToCore},
        runtime::{run_core_thread, CoreRuntimeConfig},
        session::Session,
    },
    tui::{context::TuiContext, status::Status},
};

/// Run the terminal front end until the user quits.
pub fn start(session: Session) -> Result<()> {
    log::info!("TUI starting");

    let app = Arc::new(RwLock::new(Status::new(session)));
    status::init_status(app.clone())?;

    let (core_tx, core_rx) = flume::unbounded::<CoreToUi>();
    let (ui_tx, ui_rx) = flume::unbounded::<UiToCore>();
    let bus = Bus::new(core_rx, ui_tx.clone());

    let (thr_tx, thr_rx) = flume::unbounded::<Result<()>>();
    let (input_kill_tx, input_kill_rx) = flume::bounded::<()>(1);

    let core_handle = thread::Builder::new().name("core".into()).spawn({
        let thr_tx = thr_tx.clone();
        move || {
            let res = run_core_thread(
                ui_rx,
                core_tx,
                input_kill_tx,
                CoreRuntimeConfig::default(),
                TuiContext,
            );
            let _ = thr_tx.send(res);
        }
    })?;

    let input_handle = thread::Builder::new().name("input".into()).spawn({
        let bus = bus.clone();
        move || {
            let res = input::run_input_thread(bus, input_kill_rx);
            let _ = thr_tx.send(res);
        }
    })?;

    let result = run_rendering_loop(bus, thr_rx);

    // The core may still be running when the renderer bailed out on an error.
    let _ = ui_tx.send(UiToCore::Quit);
    if core_handle.join().is_err() {
        log::error!("core thread panicked");
    }
    if input_handle.join().is_err() {
        log::error!("input thread panicked");
    }

    log::info!("TUI stopped");
    result
}

pub(crate) fn run_rendering_loop(
    bus: Bus,
    thr_rx: flume::Receiver<Result<()>>,
) -> Result<()> {
    let mut stdout = io::stdout();
    crossterm::terminal::enable_raw_mode()?;
    crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(&mut stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = (|| {
        loop {
            if let Ok(res) = thr_rx.try_recv() {
                if let Err(err) = res {
                    log::error!("thread exited with error: {err:#}");
                    return Err(err);
                }
                log::info!("a monitored thread exited cleanly; shutting down");
                return Ok(());
            }

            let should_quit = !matches!(
                bus.core_rx.recv_timeout(Duration::from_millis(100)),
                Ok(CoreToUi::Tick)
                    | Ok(CoreToUi::Refreshed)
                    | Ok(CoreToUi::Error)
                    | Err(flume::RecvTimeoutError::Timeout)
            );
            if should_quit {
                break;
            }

            let mut render_err = None;
            terminal.draw(|frame| {
                if let Err(err) = status::read_status(|app| {
                    ui::render_ui(frame, app);
                    Ok(())
                }) {
                    render_err = Some(err);
                }
            })?;
            if let Some(err) = render_err {
                return Err(anyhow!("render failed: {err}"));
            }
        }

        terminal.clear()?;
        Ok(())
    })();

    crossterm::execute!(io::stdout(), crossterm::terminal::LeaveAlternateScreen)?;
    crossterm::terminal::disable_raw_mode()?;

    result
}
