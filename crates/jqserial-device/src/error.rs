use crate::command::Arity;

/// Errors that can occur in device operations.
///
/// Protocol failures (bad checksum, silence) are not errors at this layer:
/// queries report them as zero values. Only local I/O failures and caller
/// mistakes surface here.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] jqserial_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] jqserial_frame::FrameError),

    /// An argument is outside what the module can encode.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A payload did not match the command's arity.
    #[error("{command} takes {expected}, got {actual} payload bytes")]
    ArityMismatch {
        command: &'static str,
        expected: Arity,
        actual: usize,
    },
}

impl DeviceError {
    /// Lift a frame error, surfacing transport failures as such.
    pub fn from_frame(err: jqserial_frame::FrameError) -> Self {
        match err {
            jqserial_frame::FrameError::Transport(err) => DeviceError::Transport(err),
            other => DeviceError::Frame(other),
        }
    }

    /// True when the exchange itself failed: bad checksum, silence or
    /// garbage on the line.
    pub fn is_protocol_failure(&self) -> bool {
        matches!(self, DeviceError::Frame(err) if err.is_protocol_failure())
    }
}

pub type Result<T> = std::result::Result<T, DeviceError>;
