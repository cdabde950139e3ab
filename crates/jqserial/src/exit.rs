use std::fmt;
use std::io;

use jqserial_device::DeviceError;
use jqserial_frame::FrameError;
use jqserial_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(USAGE, message)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

fn io_code(kind: io::ErrorKind) -> i32 {
    match kind {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound | io::ErrorKind::BrokenPipe => TRANSPORT_ERROR,
        _ => INTERNAL,
    }
}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    CliError::new(io_code(err.kind()), format!("{context}: {err}"))
}

fn serial_code(err: &serialport::Error) -> i32 {
    match err.kind() {
        serialport::ErrorKind::NoDevice => TRANSPORT_ERROR,
        serialport::ErrorKind::InvalidInput => USAGE,
        serialport::ErrorKind::Io(kind) => match io_code(kind) {
            INTERNAL => TRANSPORT_ERROR,
            code => code,
        },
        serialport::ErrorKind::Unknown => TRANSPORT_ERROR,
    }
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Io(source) => io_error(context, source),
        TransportError::Open { ref source, .. } | TransportError::Serial(ref source) => {
            CliError::new(serial_code(source), format!("{context}: {err}"))
        }
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Transport(err) => transport_error(context, err),
        FrameError::Timeout { .. } => CliError::new(TIMEOUT, format!("{context}: {err}")),
        FrameError::ChecksumMismatch { .. }
        | FrameError::TrailingBytes { .. }
        | FrameError::PayloadTooLarge { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
    }
}

pub fn device_error(context: &str, err: DeviceError) -> CliError {
    match err {
        DeviceError::Transport(err) => transport_error(context, err),
        DeviceError::Frame(err) => frame_error(context, err),
        DeviceError::InvalidArgument(_) | DeviceError::ArityMismatch { .. } => {
            CliError::usage(format!("{context}: {err}"))
        }
    }
}

pub fn json_error(context: &str, err: serde_json::Error) -> CliError {
    CliError::new(DATA_INVALID, format!("{context}: {err}"))
}

#[cfg(test)]
mod tests {
    use jqserial_frame::DecodeStage;

    use super::*;

    #[test]
    fn protocol_failures_map_to_distinct_codes() {
        let timeout = DeviceError::Frame(FrameError::Timeout {
            stage: DecodeStage::AwaitingResponse,
            received: 0,
        });
        assert_eq!(device_error("status", timeout).code, TIMEOUT);

        let mismatch = DeviceError::Frame(FrameError::ChecksumMismatch {
            expected: 4,
            actual: 0,
        });
        assert_eq!(device_error("status", mismatch).code, DATA_INVALID);
    }

    #[test]
    fn argument_errors_are_usage() {
        let err = device_error("play", DeviceError::InvalidArgument("folder 100".into()));
        assert_eq!(err.code, USAGE);
        assert_eq!(err.to_string(), "play: invalid argument: folder 100");
    }

    #[test]
    fn missing_port_is_transport_error() {
        let err = TransportError::Open {
            port: "/dev/ttyNOPE".into(),
            source: serialport::Error::new(
                serialport::ErrorKind::Io(io::ErrorKind::NotFound),
                "No such file or directory",
            ),
        };
        assert_eq!(transport_error("open", err).code, TRANSPORT_ERROR);
    }

    #[test]
    fn permission_denied_on_open() {
        let err = TransportError::Open {
            port: "/dev/ttyS0".into(),
            source: serialport::Error::new(
                serialport::ErrorKind::Io(io::ErrorKind::PermissionDenied),
                "Permission denied",
            ),
        };
        assert_eq!(transport_error("open", err).code, PERMISSION_DENIED);
    }
}
