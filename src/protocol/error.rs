use std::io;

/// Error codes reported by the serial connection lifecycle.
///
/// Each code carries a fixed, human-readable description that is shown in the
/// info panel. The underlying library message is only logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("{}", self.describe())]
pub enum PortError {
    DeviceNotFound,
    Permission,
    Open,
    NotOpen,
    Write,
    Read,
    Resource,
    UnsupportedOperation,
    Timeout,
    Unknown,
}

impl PortError {
    pub fn describe(self) -> &'static str {
        match self {
            PortError::DeviceNotFound => "the device does not exist",
            PortError::Permission => {
                "permission denied, or the device is already used by another process"
            }
            PortError::Open => "the device is already open",
            PortError::NotOpen => "the port is not open",
            PortError::Write => "an I/O error occurred while writing data",
            PortError::Read => "an I/O error occurred while reading data",
            PortError::Resource => "the device was removed or became unavailable",
            PortError::UnsupportedOperation => {
                "the requested setting is not supported by the host serial driver"
            }
            PortError::Timeout => "the operation timed out",
            PortError::Unknown => "an unidentified error occurred",
        }
    }

    /// The device is gone and the port has to be closed.
    pub fn is_fatal(self) -> bool {
        matches!(self, PortError::Resource)
    }

    /// Classify an I/O error, using `fallback` for kinds without a dedicated code.
    pub fn from_io(err: &io::Error, fallback: PortError) -> Self {
        #[cfg(unix)]
        if let Some(code) = err.raw_os_error() {
            // EIO, ENXIO and ENODEV show up once a USB adapter has been unplugged.
            match code {
                5 | 6 | 19 => return PortError::Resource,
                16 => return PortError::Open,
                _ => {}
            }
        }

        match err.kind() {
            io::ErrorKind::NotFound => PortError::DeviceNotFound,
            io::ErrorKind::PermissionDenied => PortError::Permission,
            io::ErrorKind::AlreadyExists | io::ErrorKind::AddrInUse => PortError::Open,
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => PortError::Timeout,
            io::ErrorKind::BrokenPipe
            | io::ErrorKind::UnexpectedEof
            | io::ErrorKind::NotConnected
            | io::ErrorKind::ConnectionAborted => PortError::Resource,
            io::ErrorKind::Unsupported | io::ErrorKind::InvalidInput => {
                PortError::UnsupportedOperation
            }
            _ => fallback,
        }
    }

    pub fn from_serial(err: &serialport::Error, fallback: PortError) -> Self {
        match err.kind() {
            serialport::ErrorKind::NoDevice => PortError::DeviceNotFound,
            serialport::ErrorKind::InvalidInput => PortError::UnsupportedOperation,
            serialport::ErrorKind::Unknown => fallback,
            serialport::ErrorKind::Io(kind) => {
                PortError::from_io(&io::Error::new(kind, err.description.clone()), fallback)
            }
        }
    }
}

impl From<serialport::Error> for PortError {
    fn from(err: serialport::Error) -> Self {
        log::debug!("serial library error: {err}");
        PortError::from_serial(&err, PortError::Unknown)
    }
}

impl From<io::Error> for PortError {
    fn from(err: io::Error) -> Self {
        log::debug!("serial I/O error: {err}");
        PortError::from_io(&err, PortError::Unknown)
    }
}
