use jqserial_transport::{wait_until_available, Clock, Transport};
use tracing::{debug, trace, warn};

use crate::codec::FrameConfig;
use crate::decoder::{Response, ResponseDecoder};
use crate::error::{FrameError, Result};

/// Reads device responses from a [`Transport`], one byte at a time, under
/// the timing in [`FrameConfig`].
#[derive(Debug, Clone, Default)]
pub struct FrameReader {
    config: FrameConfig,
}

impl FrameReader {
    /// Create a reader with default timing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a reader with explicit timing.
    pub fn with_config(config: FrameConfig) -> Self {
        Self { config }
    }

    /// Current reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// Discard whatever the device sent unprompted.
    ///
    /// Keeps reading while bytes keep arriving within the drain window, up
    /// to `max_drain_bytes`. Returns how many bytes were dropped.
    pub fn discard_pending<T, C>(&self, transport: &mut T, clock: &C) -> Result<usize>
    where
        T: Transport + ?Sized,
        C: Clock + ?Sized,
    {
        let mut dropped = 0usize;
        while dropped < self.config.max_drain_bytes
            && wait_until_available(transport, clock, self.config.drain_window_ms)?
        {
            transport.read()?;
            dropped += 1;
        }
        if dropped > 0 {
            warn!(dropped, "discarded unsolicited bytes before request");
        }
        Ok(dropped)
    }

    /// Read one response, keeping at most `capacity` payload bytes.
    ///
    /// Waits up to `response_timeout_ms` for the device to start answering,
    /// then consumes bytes until the line has been quiet for
    /// `inter_byte_timeout_ms`. Bytes that arrive after the checksum within
    /// that window fail the exchange.
    pub fn read_response<T, C>(
        &self,
        transport: &mut T,
        clock: &C,
        capacity: usize,
    ) -> Result<Response>
    where
        T: Transport + ?Sized,
        C: Clock + ?Sized,
    {
        wait_until_available(transport, clock, self.config.response_timeout_ms)?;

        let mut decoder = ResponseDecoder::new(capacity);
        let mut verdict: Option<Result<Response>> = None;
        let mut trailing = 0usize;

        while trailing < self.config.max_drain_bytes
            && wait_until_available(transport, clock, self.config.inter_byte_timeout_ms)?
        {
            let byte = transport.read()?;
            trace!(byte = format_args!("{byte:02X}"), "rx");
            if decoder.is_done() {
                trailing += 1;
                continue;
            }
            if let Some(result) = decoder.push(byte) {
                verdict = Some(result);
            }
        }

        if trailing >= self.config.max_drain_bytes {
            warn!(trailing, "line still busy after response, giving up");
        }
        let outcome = match verdict {
            None => Err(decoder.timeout()),
            Some(Ok(_)) if trailing > 0 => Err(FrameError::TrailingBytes { count: trailing }),
            Some(result) => result,
        };

        match &outcome {
            Ok(response) => debug!(
                command = response.command,
                len = response.declared_len,
                overflow = response.overflow,
                "response accepted"
            ),
            Err(err) => debug!(error = %err, "response rejected"),
        }
        outcome
    }
}
