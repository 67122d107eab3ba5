use anyhow::Result;
use chrono::Local;
use log::LevelFilter;
use std::io::{self, Write};

use env_logger::{Builder, Target};

use crate::{
    cli::LaunchOptions,
    core::{logs::LogLevel, session::Session},
    protocol::backend::HostPorts,
};

/// Common initialization used by every entrypoint.
pub fn init_common() {
    let log_file = std::env::var("SERIALCOM_LOG_FILE").ok().or_else(|| {
        #[cfg(debug_assertions)]
        {
            Some(format!("./log_{}.log", Local::now().format("%Y%m%d%H%M%S")))
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    });

    if let Some(path) = log_file {
        if let Err(err) = init_file_logger(&path) {
            eprintln!("Failed to initialize file logger at '{path}': {err}");
            env_logger::init();
        }
    } else {
        env_logger::init();
    }

    crate::i18n::init_i18n();
}

/// Session for the terminal front end, seeded from the command line.
pub fn prepare_session(opts: &LaunchOptions) -> Session {
    let mut session = Session::new(Box::new(HostPorts));
    session.config = opts.config;
    session.line_ending = opts.line_ending;
    session.refresh_ports();
    if let Some(port) = &opts.port {
        if !session.select_by_name(port) {
            session.log(LogLevel::Warning, format!("{port} is not in the port list"));
        }
    }
    session
}

pub fn start_tui(opts: &LaunchOptions) -> Result<()> {
    crate::tui::start(prepare_session(opts))
}

pub async fn start_monitor(port_name: &str, opts: &LaunchOptions) -> Result<()> {
    crate::cli::monitor::run_monitor(port_name, opts).await
}

fn init_file_logger(path: &str) -> io::Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;

    let mut builder = Builder::new();
    builder
        .format(|buf, record| {
            writeln!(
                buf,
                "{}:{} {} [{}] - {}",
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
                record.level(),
                record.args()
            )
        })
        .target(Target::Pipe(Box::new(file)))
        .filter_level(LevelFilter::Debug)
        .parse_default_env()
        .init();

    log::info!("File logger initialized at {path}");

    Ok(())
}
