// Platform-dispatched port enumeration

#[cfg(windows)]
mod tty_windows;
#[cfg(windows)]
use tty_windows::sort_and_dedup_ports;

#[cfg(unix)]
mod tty_unix;
#[cfg(unix)]
use tty_unix::sort_and_dedup_ports;

// Other platforms keep the library's order.
#[cfg(not(any(unix, windows)))]
fn sort_and_dedup_ports(raw_ports: Vec<SerialPortInfo>) -> Vec<SerialPortInfo> {
    raw_ports
}

use serde::Serialize;
use serialport::{SerialPortInfo, SerialPortType};
use std::collections::HashMap;

/// Return the host's serial ports in display order.
pub fn available_ports_sorted() -> Vec<SerialPortInfo> {
    match serialport::available_ports() {
        Ok(raw_ports) => sort_and_dedup_ports(raw_ports),
        Err(err) => {
            log::warn!("port enumeration failed: {err}");
            Vec::new()
        }
    }
}

/// One enumerated port, flattened for display and JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortSummary {
    /// Name passed to the driver when opening the port.
    pub port_name: String,
    /// Name shown in the port list; annotated when basenames collide.
    pub label: String,
    pub port_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vid: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
}

pub fn describe_port_type(port_type: &SerialPortType) -> String {
    match port_type {
        SerialPortType::UsbPort(usb) => {
            let mut text = format!("USB {:04x}:{:04x}", usb.vid, usb.pid);
            if let Some(product) = usb.product.as_deref().filter(|p| !p.trim().is_empty()) {
                text.push(' ');
                text.push_str(product.trim());
            }
            text
        }
        SerialPortType::PciPort => "PCI".to_string(),
        SerialPortType::BluetoothPort => "Bluetooth".to_string(),
        SerialPortType::Unknown => "Unknown".to_string(),
    }
}

fn base_name(name: &str) -> String {
    name.rsplit(['/', '\\'])
        .next()
        .unwrap_or(name)
        .to_lowercase()
}

/// Build display summaries, annotating USB ports whose basenames collide.
pub fn summarize_ports(ports: &[SerialPortInfo]) -> Vec<PortSummary> {
    let mut groups: HashMap<String, usize> = HashMap::new();
    for port in ports {
        *groups.entry(base_name(&port.port_name)).or_default() += 1;
    }

    ports
        .iter()
        .map(|port| {
            let shared = groups
                .get(&base_name(&port.port_name))
                .is_some_and(|count| *count > 1);
            let (vid, pid, serial_number, manufacturer, product) = match &port.port_type {
                SerialPortType::UsbPort(usb) => (
                    Some(usb.vid),
                    Some(usb.pid),
                    usb.serial_number.clone(),
                    usb.manufacturer.clone(),
                    usb.product.clone(),
                ),
                _ => (None, None, None, None, None),
            };
            let label = match (shared, vid, pid) {
                (true, Some(vid), Some(pid)) => {
                    format!("{} (vid:{vid:04x} pid:{pid:04x})", port.port_name)
                }
                _ => port.port_name.clone(),
            };
            PortSummary {
                port_name: port.port_name.clone(),
                label,
                port_type: describe_port_type(&port.port_type),
                vid,
                pid,
                serial_number,
                manufacturer,
                product,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serialport::UsbPortInfo;

    fn usb(name: &str, vid: u16, pid: u16) -> SerialPortInfo {
        SerialPortInfo {
            port_name: name.to_string(),
            port_type: SerialPortType::UsbPort(UsbPortInfo {
                vid,
                pid,
                serial_number: None,
                manufacturer: Some("QinHeng".to_string()),
                product: Some("CH340".to_string()),
            }),
        }
    }

    #[test]
    fn describes_usb_ports_with_ids() {
        let port = usb("/dev/ttyUSB0", 0x1a86, 0x7523);
        assert_eq!(describe_port_type(&port.port_type), "USB 1a86:7523 CH340");
        assert_eq!(describe_port_type(&SerialPortType::PciPort), "PCI");
    }

    #[test]
    fn colliding_basenames_are_annotated_but_keep_openable_name() {
        let ports = vec![
            usb("/dev/cu.usbserial", 0x0403, 0x6001),
            usb("/dev/tty.usbserial", 0x0403, 0x6001),
            usb("/dev/other/cu.usbserial", 0x10c4, 0xea60),
        ];
        let out = summarize_ports(&ports);
        assert_eq!(out[0].label, "/dev/cu.usbserial (vid:0403 pid:6001)");
        assert_eq!(out[0].port_name, "/dev/cu.usbserial");
        assert_eq!(out[1].label, "/dev/tty.usbserial");
        assert_eq!(out[2].label, "/dev/other/cu.usbserial (vid:10c4 pid:ea60)");
    }

    #[test]
    fn json_omits_missing_usb_fields() -> anyhow::Result<()> {
        let ports = vec![SerialPortInfo {
            port_name: "/dev/ttyS0".to_string(),
            port_type: SerialPortType::Unknown,
        }];
        let json = serde_json::to_string(&summarize_ports(&ports))?;
        assert_eq!(
            json,
            r#"[{"port_name":"/dev/ttyS0","label":"/dev/ttyS0","port_type":"Unknown"}]"#
        );
        Ok(())
    }
}
