use bytes::BytesMut;
use jqserial_transport::Transport;
use tracing::trace;

use crate::codec::encode_frame;
use crate::error::Result;

const INITIAL_BUFFER_CAPACITY: usize = 64;

/// Writes complete request frames to a [`Transport`].
///
/// Holds one reusable encode buffer; the last frame sent stays available
/// for diagnostics.
#[derive(Debug)]
pub struct FrameWriter {
    buf: BytesMut,
}

impl FrameWriter {
    /// Create a new frame writer.
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
        }
    }

    /// Encode and send one frame.
    pub fn send<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
        command: u8,
        payload: &[u8],
    ) -> Result<()> {
        self.buf.clear();
        encode_frame(command, payload, &mut self.buf)?;
        trace!(frame = %hex(&self.buf), "tx");

        transport.write_all(&self.buf)?;
        transport.flush()?;
        Ok(())
    }

    /// Bytes of the most recently sent frame.
    pub fn last_frame(&self) -> &[u8] {
        &self.buf
    }
}

impl Default for FrameWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Space-separated uppercase hex, as used in frame traces.
pub(crate) fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|byte| format!("{byte:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}
