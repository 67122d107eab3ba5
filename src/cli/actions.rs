use anyhow::Result;
use clap::ArgMatches;

use crate::protocol::tty::{available_ports_sorted, summarize_ports, PortSummary};

/// Run the actions that print something and exit. Returns `true` when one ran.
pub fn run_one_shot_actions(matches: &ArgMatches) -> Result<bool> {
    if matches.get_flag("list-ports") {
        let ports = summarize_ports(&available_ports_sorted());
        println!("{}", format_port_list(&ports, matches.get_flag("json"))?);
        return Ok(true);
    }

    Ok(false)
}

pub fn format_port_list(ports: &[PortSummary], json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(ports)?);
    }

    let width = ports.iter().map(|p| p.label.len()).max().unwrap_or(0);
    Ok(ports
        .iter()
        .map(|p| format!("{:<width$}  {}", p.label, p.port_type))
        .collect::<Vec<_>>()
        .join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port(name: &str, port_type: &str) -> PortSummary {
        PortSummary {
            port_name: name.to_string(),
            label: name.to_string(),
            port_type: port_type.to_string(),
            vid: None,
            pid: None,
            serial_number: None,
            manufacturer: None,
            product: None,
        }
    }

    #[test]
    fn text_listing_aligns_types() -> Result<()> {
        let ports = vec![port("/dev/ttyUSB0", "USB 1a86:7523"), port("COM1", "PCI")];
        assert_eq!(
            format_port_list(&ports, false)?,
            "/dev/ttyUSB0  USB 1a86:7523\nCOM1          PCI"
        );
        assert_eq!(format_port_list(&[], false)?, "");
        Ok(())
    }

    #[test]
    fn json_listing_skips_missing_fields() -> Result<()> {
        let mut usb = port("/dev/ttyACM0", "USB");
        usb.vid = Some(0x2341);
        let out = format_port_list(&[usb], true)?;
        let parsed: serde_json::Value = serde_json::from_str(&out)?;
        assert_eq!(parsed[0]["port_name"], "/dev/ttyACM0");
        assert_eq!(parsed[0]["vid"], 0x2341);
        assert!(parsed[0].get("pid").is_none());
        Ok(())
    }
}
