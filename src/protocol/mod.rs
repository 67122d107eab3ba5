pub mod backend;
pub mod config;
pub mod error;
pub mod runtime;
pub mod tty;

pub use backend::{HostPorts, PortBackend};
pub use config::{ConfigField, OptionList, SerialConfig};
pub use error::PortError;
pub use runtime::{PortRuntimeHandle, RuntimeEvent};
