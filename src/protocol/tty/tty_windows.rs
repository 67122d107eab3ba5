use serialport::{SerialPortInfo, SerialPortType};
use std::{cmp::Ordering, collections::HashSet};

/// De-duplicate by COM name (plus USB ids) and order numerically by COM index.
pub(crate) fn sort_and_dedup_ports(raw_ports: Vec<SerialPortInfo>) -> Vec<SerialPortInfo> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut ports: Vec<SerialPortInfo> = Vec::new();

    for port in raw_ports.into_iter() {
        let up = port.port_name.to_uppercase();
        let base = extract_com_base(&up).unwrap_or(up);
        let key = match &port.port_type {
            SerialPortType::UsbPort(usb) => {
                format!("{base}:vid={:04x}:pid={:04x}", usb.vid, usb.pid)
            }
            _ => base,
        };
        if seen.insert(key) {
            ports.push(port);
        }
    }

    ports.sort_by(|a, b| {
        let ia = com_index(&a.port_name);
        let ib = com_index(&b.port_name);
        match (ia, ib) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.port_name.cmp(&b.port_name),
        }
    });

    ports
}

fn com_index(name: &str) -> Option<u32> {
    name.to_uppercase()
        .strip_prefix("COM")
        .and_then(|rest| rest.parse::<u32>().ok())
}

/// Find `COM<n>` anywhere in the name (handles `NULL_COM3` style aliases).
fn extract_com_base(s: &str) -> Option<String> {
    let start = s.find("COM")?;
    let digits: String = s[start + 3..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        None
    } else {
        Some(format!("COM{digits}"))
    }
}
