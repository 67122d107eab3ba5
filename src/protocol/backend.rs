use serialport::SerialPortInfo;

use super::{config::SerialConfig, error::PortError, runtime::PortRuntimeHandle, tty};

/// Where ports come from and how they are opened.
pub trait PortBackend: Send + Sync {
    fn enumerate(&self) -> Vec<SerialPortInfo>;

    fn open(&self, port_name: &str, cfg: SerialConfig) -> Result<PortRuntimeHandle, PortError>;
}

/// The host's serial devices.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostPorts;

impl PortBackend for HostPorts {
    fn enumerate(&self) -> Vec<SerialPortInfo> {
        tty::available_ports_sorted()
    }

    fn open(&self, port_name: &str, cfg: SerialConfig) -> Result<PortRuntimeHandle, PortError> {
        PortRuntimeHandle::spawn(port_name.to_string(), cfg)
    }
}
