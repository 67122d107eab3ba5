use serialport::{SerialPortInfo, SerialPortType};
use std::collections::HashSet;

/// De-duplicate by basename (plus USB ids) and order USB, ACM, ttyS, then the rest.
pub(crate) fn sort_and_dedup_ports(raw_ports: Vec<SerialPortInfo>) -> Vec<SerialPortInfo> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut ports: Vec<SerialPortInfo> = Vec::new();

    for port in raw_ports.into_iter() {
        let base = match port.port_name.rsplit('/').next() {
            Some(b) => b.to_lowercase(),
            None => port.port_name.to_lowercase(),
        };
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

    fn priority(name: &str) -> i32 {
        let n = name.to_lowercase();
        if n.contains("ttyusb") || n.contains("usb") {
            0
        } else if n.contains("acm") {
            1
        } else if n.contains("ttys") || n.contains("serial") {
            2
        } else {
            10
        }
    }

    ports.sort_by(|a, b| {
        let pa = priority(&a.port_name);
        let pb = priority(&b.port_name);
        if pa != pb {
            pa.cmp(&pb)
        } else {
            a.port_name.cmp(&b.port_name)
        }
    });

    ports
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make(name: &str) -> SerialPortInfo {
        SerialPortInfo {
            port_name: name.to_string(),
            port_type: SerialPortType::Unknown,
        }
    }

    #[test]
    fn usb_and_acm_come_before_builtin_uarts() {
        let input = vec![
            make("/dev/ttyS1"),
            make("/dev/ttyS0"),
            make("/dev/pts/3"),
            make("/dev/ttyACM0"),
            make("/dev/ttyUSB0"),
        ];
        let names: Vec<_> = sort_and_dedup_ports(input)
            .into_iter()
            .map(|p| p.port_name)
            .collect();
        assert_eq!(
            names,
            vec![
                "/dev/ttyUSB0",
                "/dev/ttyACM0",
                "/dev/ttyS0",
                "/dev/ttyS1",
                "/dev/pts/3"
            ]
        );
    }

    #[test]
    fn same_device_listed_twice_is_dropped() {
        let input = vec![make("/dev/ttyS0"), make("/sys/class/tty/ttyS0")];
        assert_eq!(sort_and_dedup_ports(input).len(), 1);
    }
}
