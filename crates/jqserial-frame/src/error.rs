use jqserial_transport::TransportError;

use crate::decoder::DecodeStage;

/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload does not fit the one-byte length field.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The response checksum byte did not match the running sum.
    #[error("checksum mismatch (computed 0x{expected:02X}, received 0x{actual:02X})")]
    ChecksumMismatch { expected: u8, actual: u8 },

    /// The line went quiet before a complete response arrived.
    #[error("response timed out in {stage} after {received} bytes")]
    Timeout { stage: DecodeStage, received: usize },

    /// Extra bytes followed an otherwise valid response.
    #[error("{count} unexpected bytes after response checksum")]
    TrailingBytes { count: usize },

    /// The underlying transport failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

impl FrameError {
    /// True for failures of the exchange itself (bad checksum, silence,
    /// garbage), as opposed to local I/O or caller errors.
    pub fn is_protocol_failure(&self) -> bool {
        matches!(
            self,
            FrameError::ChecksumMismatch { .. }
                | FrameError::Timeout { .. }
                | FrameError::TrailingBytes { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
