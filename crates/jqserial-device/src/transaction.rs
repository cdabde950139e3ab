use jqserial_frame::{FrameConfig, FrameReader, FrameWriter, Response};
use jqserial_transport::{Clock, Transport};
use tracing::debug;

use crate::error::{DeviceError, Result};

/// Runs single request/response exchanges over one transport.
///
/// Each exchange drains stale input, sends the request frame and, when a
/// reply is expected, reads it back under the configured timeouts. There
/// are no retries at this layer.
#[derive(Debug)]
pub struct TransactionEngine<T, C> {
    transport: T,
    clock: C,
    reader: FrameReader,
    writer: FrameWriter,
}

impl<T: Transport, C: Clock> TransactionEngine<T, C> {
    /// Create an engine with default timing.
    pub fn new(transport: T, clock: C) -> Self {
        Self::with_config(transport, clock, FrameConfig::default())
    }

    /// Create an engine with explicit timing.
    pub fn with_config(transport: T, clock: C, config: FrameConfig) -> Self {
        Self {
            transport,
            clock,
            reader: FrameReader::with_config(config),
            writer: FrameWriter::new(),
        }
    }

    /// Drain unsolicited input, then write one request frame.
    pub fn send(&mut self, command: u8, payload: &[u8]) -> jqserial_frame::Result<()> {
        self.reader.discard_pending(&mut self.transport, &self.clock)?;
        self.writer.send(&mut self.transport, command, payload)
    }

    /// Send a request and read the reply, keeping at most `capacity`
    /// payload bytes.
    ///
    /// A `capacity` of zero sends without waiting for anything and yields
    /// an empty response.
    pub fn execute(
        &mut self,
        command: u8,
        payload: &[u8],
        capacity: usize,
    ) -> jqserial_frame::Result<Response> {
        self.send(command, payload)?;
        if capacity == 0 {
            return Ok(Response {
                command,
                declared_len: 0,
                payload: Default::default(),
                overflow: 0,
            });
        }
        self.reader
            .read_response(&mut self.transport, &self.clock, capacity)
    }

    /// Buffer-filling form of [`execute`](Self::execute).
    ///
    /// `response` is zeroed before anything is read and stays zero unless a
    /// reply with a valid checksum arrives. Returns whether it did. `None`
    /// or an empty buffer makes the call fire-and-forget, which reports
    /// `true` once the request is written. Only transport failures are
    /// returned as errors.
    pub fn transact_into(
        &mut self,
        command: u8,
        payload: &[u8],
        response: Option<&mut [u8]>,
    ) -> Result<bool> {
        let buf = match response {
            Some(buf) if !buf.is_empty() => buf,
            _ => {
                self.send(command, payload).map_err(DeviceError::from_frame)?;
                return Ok(true);
            }
        };
        buf.fill(0);

        let result = self.execute(command, payload, buf.len());
        match settle(command, result)? {
            Some(reply) => {
                reply.copy_into(buf);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Block for `ms` on the engine's clock.
    pub fn delay_ms(&self, ms: u32) {
        self.clock.delay_ms(ms);
    }

    /// Bytes of the most recently sent request frame.
    pub fn last_request(&self) -> &[u8] {
        self.writer.last_frame()
    }

    /// Current timing.
    pub fn config(&self) -> &FrameConfig {
        self.reader.config()
    }

    /// Borrow the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Borrow the clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Take the engine apart.
    pub fn into_parts(self) -> (T, C) {
        (self.transport, self.clock)
    }
}

/// Split an exchange outcome into protocol failures, which become `None`,
/// and local failures, which stay errors.
pub(crate) fn settle(
    command: u8,
    result: jqserial_frame::Result<Response>,
) -> Result<Option<Response>> {
    match result {
        Ok(response) => Ok(Some(response)),
        Err(err) if err.is_protocol_failure() => {
            debug!(command, error = %err, "exchange failed, reporting zeros");
            Ok(None)
        }
        Err(err) => Err(DeviceError::from_frame(err)),
    }
}
