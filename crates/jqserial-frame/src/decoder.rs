use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

use crate::codec::HEADER_SIZE;
use crate::error::{FrameError, Result};

/// Where in a response the decoder is (or stopped).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStage {
    /// Nothing received yet.
    AwaitingResponse,
    /// Inside the three positional header bytes.
    Header,
    /// Inside the declared payload.
    Payload,
    /// All payload bytes seen; the next byte is the checksum.
    Checksum,
}

impl fmt::Display for DecodeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DecodeStage::AwaitingResponse => "awaiting response",
            DecodeStage::Header => "header",
            DecodeStage::Payload => "payload",
            DecodeStage::Checksum => "checksum",
        };
        f.write_str(name)
    }
}

/// A response whose checksum verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Header byte at position 1, conventionally the command echo.
    pub command: u8,
    /// Payload length declared by the device.
    pub declared_len: u8,
    /// Payload bytes that fit the caller's capacity.
    pub payload: Bytes,
    /// Payload bytes that were received and summed but did not fit.
    pub overflow: usize,
}

impl Response {
    /// Copy the payload into `buf`, zero-filling whatever it does not cover.
    pub fn copy_into(&self, buf: &mut [u8]) {
        buf.fill(0);
        let n = self.payload.len().min(buf.len());
        buf[..n].copy_from_slice(&self.payload[..n]);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Header,
    Payload { remaining: u8 },
    Checksum,
    Done,
}

/// Incremental, byte-at-a-time response decoder.
///
/// The first three bytes are taken positionally as header; no marker is
/// verified. The byte at position 2 declares how many payload bytes follow.
/// Payload bytes are kept while they fit `capacity`; the rest are consumed
/// and summed but dropped. The byte after the payload is compared against
/// the running sum.
#[derive(Debug)]
pub struct ResponseDecoder {
    state: State,
    capacity: usize,
    sum: u8,
    received: usize,
    command: u8,
    declared_len: u8,
    payload: BytesMut,
    overflow: usize,
}

impl ResponseDecoder {
    /// Create a decoder that keeps at most `capacity` payload bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            state: State::Header,
            capacity,
            sum: 0,
            received: 0,
            command: 0,
            declared_len: 0,
            payload: BytesMut::with_capacity(capacity),
            overflow: 0,
        }
    }

    /// Feed one received byte.
    ///
    /// Returns `Some` exactly once, when the checksum byte is consumed:
    /// `Ok(response)` if it matched, `Err(ChecksumMismatch)` otherwise.
    /// Bytes pushed after that are ignored and `None` is returned.
    pub fn push(&mut self, byte: u8) -> Option<Result<Response>> {
        if self.state == State::Done {
            return None;
        }
        let position = self.received;
        self.received += 1;

        match self.state {
            State::Header => {
                self.sum = self.sum.wrapping_add(byte);
                if position == 1 {
                    self.command = byte;
                }
                if position == HEADER_SIZE - 1 {
                    self.declared_len = byte;
                    self.state = match byte {
                        0 => State::Checksum,
                        n => State::Payload { remaining: n },
                    };
                }
                None
            }
            State::Payload { remaining } => {
                self.sum = self.sum.wrapping_add(byte);
                let offset = position - HEADER_SIZE;
                if offset < self.capacity {
                    self.payload.put_u8(byte);
                } else {
                    self.overflow += 1;
                }
                self.state = match remaining - 1 {
                    0 => State::Checksum,
                    n => State::Payload { remaining: n },
                };
                None
            }
            State::Checksum => {
                self.state = State::Done;
                if byte != self.sum {
                    return Some(Err(FrameError::ChecksumMismatch {
                        expected: self.sum,
                        actual: byte,
                    }));
                }
                Some(Ok(Response {
                    command: self.command,
                    declared_len: self.declared_len,
                    payload: std::mem::take(&mut self.payload).freeze(),
                    overflow: self.overflow,
                }))
            }
            State::Done => None,
        }
    }

    /// Bytes consumed so far.
    pub fn received(&self) -> usize {
        self.received
    }

    /// True once the checksum byte has been consumed.
    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }

    /// The stage the decoder is currently in.
    pub fn stage(&self) -> DecodeStage {
        match self.state {
            State::Header if self.received == 0 => DecodeStage::AwaitingResponse,
            State::Header => DecodeStage::Header,
            State::Payload { .. } => DecodeStage::Payload,
            State::Checksum | State::Done => DecodeStage::Checksum,
        }
    }

    /// The error describing a response that stopped arriving mid-frame.
    pub fn timeout(&self) -> FrameError {
        FrameError::Timeout {
            stage: self.stage(),
            received: self.received,
        }
    }
}

/// Decode one complete response from a byte slice.
///
/// The slice must hold exactly one response: running out of bytes is treated
/// like the line going quiet (`Timeout`), and bytes left after a matching
/// checksum are rejected (`TrailingBytes`).
pub fn decode_frame(bytes: &[u8], capacity: usize) -> Result<Response> {
    let mut decoder = ResponseDecoder::new(capacity);
    for (index, &byte) in bytes.iter().enumerate() {
        if let Some(verdict) = decoder.push(byte) {
            let response = verdict?;
            let trailing = bytes.len() - index - 1;
            if trailing > 0 {
                return Err(FrameError::TrailingBytes { count: trailing });
            }
            return Ok(response);
        }
    }
    Err(decoder.timeout())
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::*;
    use crate::codec::encode_frame;

    fn encode(command: u8, payload: &[u8]) -> Vec<u8> {
        let mut buf = BytesMut::new();
        encode_frame(command, payload, &mut buf).unwrap();
        buf.to_vec()
    }

    #[test]
    fn decode_recovers_every_payload_length() {
        for len in 0..=255usize {
            let command = (len as u8).wrapping_mul(7);
            let payload: Vec<u8> = (0..len).map(|i| (i * 31 + len) as u8).collect();
            let wire = encode(command, &payload);

            let response = decode_frame(&wire, 255).unwrap();
            assert_eq!(response.command, command, "len {len}");
            assert_eq!(response.payload.as_ref(), payload.as_slice(), "len {len}");
            assert_eq!(response.overflow, 0);
        }
    }

    #[test]
    fn any_single_bit_flip_is_rejected() {
        let wire = encode(0x0C, &[0x00, 0x05, 0x7E]);
        for index in 0..wire.len() {
            for bit in 0..8 {
                let mut corrupted = wire.clone();
                corrupted[index] ^= 1 << bit;
                assert!(
                    decode_frame(&corrupted, 4).is_err(),
                    "flip of bit {bit} in byte {index} went undetected"
                );
            }
        }
    }

    #[test]
    fn stopped_status_with_bad_trailer_reads_as_zero() {
        // Header 01 03 00 declares no payload, so the fourth byte is the
        // checksum (expected 0x04, got 0x00).
        let err = decode_frame(&[0x01, 0x03, 0x00, 0x00, 0x00, 0x04], 3).unwrap_err();
        assert!(matches!(
            err,
            FrameError::ChecksumMismatch {
                expected: 0x04,
                actual: 0x00
            }
        ));
    }

    #[test]
    fn status_response_from_device() {
        // AA 01 01 01 AD: status "playing"
        let response = decode_frame(&[0xAA, 0x01, 0x01, 0x01, 0xAD], 1).unwrap();
        assert_eq!(response.command, 0x01);
        assert_eq!(response.declared_len, 1);
        assert_eq!(response.payload.as_ref(), &[0x01]);
    }

    #[test]
    fn marker_is_not_verified() {
        let mut wire = encode(0x09, &[0x02]);
        wire[0] = 0x55;
        let last = wire.len() - 1;
        wire[last] = wire[last].wrapping_sub(0xAA).wrapping_add(0x55);
        let response = decode_frame(&wire, 1).unwrap();
        assert_eq!(response.payload.as_ref(), &[0x02]);
    }

    #[test]
    fn payload_beyond_capacity_is_drained_and_summed() {
        let wire = encode(0x1E, b"SONG0001MP3");
        let response = decode_frame(&wire, 4).unwrap();
        assert_eq!(response.payload.as_ref(), b"SONG");
        assert_eq!(response.overflow, 7);
        assert_eq!(response.declared_len, 11);
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let wire = encode(0x0C, &[0x00, 0x05]);
        let response = decode_frame(&wire, 0).unwrap();
        assert!(response.payload.is_empty());
        assert_eq!(response.overflow, 2);
    }

    #[test]
    fn truncated_response_times_out_in_stage() {
        let wire = encode(0x24, &[0x00, 0x03, 0x15]);

        let err = decode_frame(&[], 3).unwrap_err();
        assert!(matches!(
            err,
            FrameError::Timeout {
                stage: DecodeStage::AwaitingResponse,
                received: 0
            }
        ));

        let err = decode_frame(&wire[..2], 3).unwrap_err();
        assert!(matches!(
            err,
            FrameError::Timeout {
                stage: DecodeStage::Header,
                received: 2
            }
        ));

        let err = decode_frame(&wire[..4], 3).unwrap_err();
        assert!(matches!(
            err,
            FrameError::Timeout {
                stage: DecodeStage::Payload,
                received: 4
            }
        ));

        let err = decode_frame(&wire[..6], 3).unwrap_err();
        assert!(matches!(
            err,
            FrameError::Timeout {
                stage: DecodeStage::Checksum,
                received: 6
            }
        ));
    }

    #[test]
    fn trailing_bytes_rejected() {
        let mut wire = encode(0x01, &[0x02]);
        wire.push(0x00);
        let err = decode_frame(&wire, 1).unwrap_err();
        assert!(matches!(err, FrameError::TrailingBytes { count: 1 }));
    }

    #[test]
    fn push_after_verdict_is_ignored() {
        let mut decoder = ResponseDecoder::new(1);
        let wire = encode(0x01, &[0x00]);
        let mut verdicts = 0;
        for &byte in wire.iter().chain([0xAA, 0x00].iter()) {
            if decoder.push(byte).is_some() {
                verdicts += 1;
            }
        }
        assert_eq!(verdicts, 1);
        assert!(decoder.is_done());
        assert_eq!(decoder.received(), wire.len());
    }

    #[test]
    fn copy_into_zero_fills_short_payload() {
        let response = decode_frame(&encode(0x0C, &[0x00, 0x07]), 4).unwrap();
        let mut buf = [0xEE; 4];
        response.copy_into(&mut buf);
        assert_eq!(buf, [0x00, 0x07, 0x00, 0x00]);
    }
}
