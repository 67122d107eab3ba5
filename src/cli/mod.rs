pub mod actions;
pub mod monitor;

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::{
    core::logs::LineEnding,
    protocol::config::SerialConfig,
};

pub fn build_command() -> Command {
    Command::new("serialcom")
        .about("Talk to a serial port from the terminal")
        .arg(
            Arg::new("list-ports")
                .long("list-ports")
                .short('l')
                .help("List all available serial ports and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .short('j')
                .help("Output one-shot results in JSON format")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("port")
                .long("port")
                .short('p')
                .help("Port to select on startup")
                .value_name("PORT"),
        )
        .arg(
            Arg::new("baud-rate")
                .long("baud-rate")
                .short('b')
                .help("Baud rate: 1200, 2400, 4800, 9600, 19200, 38400, 57600 or 115200")
                .value_name("BAUD")
                .default_value("9600"),
        )
        .arg(
            Arg::new("data-bits")
                .long("data-bits")
                .help("Data bits: 5, 6, 7 or 8")
                .value_name("BITS")
                .default_value("8"),
        )
        .arg(
            Arg::new("stop-bits")
                .long("stop-bits")
                .help("Stop bits: 1, 1.5 or 2")
                .value_name("BITS")
                .default_value("1"),
        )
        .arg(
            Arg::new("parity")
                .long("parity")
                .help("Parity: none, even, odd, space or mark")
                .value_name("PARITY")
                .default_value("none"),
        )
        .arg(
            Arg::new("flow-control")
                .long("flow-control")
                .help("Flow control: none, hardware or software")
                .value_name("FLOW")
                .default_value("none"),
        )
        .arg(
            Arg::new("line-ending")
                .long("line-ending")
                .help("Terminator appended to sent lines: none, lf, cr or crlf")
                .value_name("ENDING")
                .default_value("none"),
        )
        .arg(
            Arg::new("monitor")
                .long("monitor")
                .short('m')
                .help("Headless mode: bridge stdin/stdout to PORT until EOF or Ctrl-C")
                .value_name("PORT")
                .conflicts_with("list-ports"),
        )
}

/// Parse command line arguments and return ArgMatches.
pub fn parse_args() -> ArgMatches {
    build_command().get_matches()
}

/// Session settings taken from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchOptions {
    pub port: Option<String>,
    pub config: SerialConfig,
    pub line_ending: LineEnding,
}

impl LaunchOptions {
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        fn value<'a>(matches: &'a ArgMatches, id: &str) -> &'a str {
            matches
                .get_one::<String>(id)
                .map(String::as_str)
                .unwrap_or_default()
        }

        let config = SerialConfig {
            baud_rate: value(matches, "baud-rate").parse().context("--baud-rate")?,
            data_bits: value(matches, "data-bits").parse().context("--data-bits")?,
            stop_bits: value(matches, "stop-bits").parse().context("--stop-bits")?,
            parity: value(matches, "parity").parse().context("--parity")?,
            flow_control: value(matches, "flow-control")
                .parse()
                .context("--flow-control")?,
        };

        Ok(Self {
            port: matches.get_one::<String>("port").cloned(),
            config,
            line_ending: value(matches, "line-ending")
                .parse()
                .context("--line-ending")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::config::{BaudRate, DataBits, FlowControl, Parity, StopBits};

    fn parse(args: &[&str]) -> Result<LaunchOptions> {
        let matches = build_command().try_get_matches_from(args)?;
        LaunchOptions::from_matches(&matches)
    }

    #[test]
    fn defaults_are_9600_8n1() -> Result<()> {
        let opts = parse(&["serialcom"])?;
        assert_eq!(opts.config, SerialConfig::default());
        assert_eq!(opts.line_ending, LineEnding::None);
        assert_eq!(opts.port, None);
        Ok(())
    }

    #[test]
    fn explicit_settings_are_parsed() -> Result<()> {
        let opts = parse(&[
            "serialcom",
            "--port",
            "/dev/ttyUSB0",
            "-b",
            "115200",
            "--data-bits",
            "7",
            "--stop-bits",
            "2",
            "--parity",
            "even",
            "--flow-control",
            "hardware",
            "--line-ending",
            "crlf",
        ])?;
        assert_eq!(opts.port.as_deref(), Some("/dev/ttyUSB0"));
        assert_eq!(
            opts.config,
            SerialConfig {
                baud_rate: BaudRate::B115200,
                data_bits: DataBits::Seven,
                stop_bits: StopBits::Two,
                parity: Parity::Even,
                flow_control: FlowControl::Hardware,
            }
        );
        assert_eq!(opts.line_ending, LineEnding::CrLf);
        Ok(())
    }

    #[test]
    fn unsupported_values_are_rejected() {
        assert!(parse(&["serialcom", "--baud-rate", "14400"]).is_err());
        assert!(parse(&["serialcom", "--parity", "maybe"]).is_err());
        assert!(build_command()
            .try_get_matches_from(["serialcom", "--list-ports", "--monitor", "COM1"])
            .is_err());
    }
}
