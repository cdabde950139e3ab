use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Start marker that opens every request frame.
pub const MARKER: u8 = 0xAA;

/// Positional header: marker (1) + command (1) + length (1) = 3 bytes.
pub const HEADER_SIZE: usize = 3;

/// Largest payload the one-byte length field can describe.
pub const MAX_PAYLOAD: usize = u8::MAX as usize;

/// Additive checksum: the sum of `bytes`, modulo 256.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |sum, &byte| sum.wrapping_add(byte))
}

/// A command frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The command byte.
    pub command: u8,
    /// The argument bytes.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(command: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            command,
            payload: payload.into(),
        }
    }

    /// The total wire size of this frame (header + payload + checksum).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len() + 1
    }

    /// Encode into a fresh buffer.
    pub fn to_bytes(&self) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(self.wire_size());
        encode_frame(self.command, &self.payload, &mut buf)?;
        Ok(buf.freeze())
    }
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌────────┬─────────┬────────┬──────────────┬──────────┐
/// │ Marker │ Command │ Length │ Payload      │ Checksum │
/// │ 0xAA   │ (1B)    │ (1B)   │ (Length B)   │ (1B)     │
/// └────────┴─────────┴────────┴──────────────┴──────────┘
/// ```
///
/// The checksum is the low byte of the sum of every byte before it.
pub fn encode_frame(command: u8, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }
    let length = payload.len() as u8;
    let sum = MARKER
        .wrapping_add(command)
        .wrapping_add(length)
        .wrapping_add(checksum(payload));

    dst.reserve(HEADER_SIZE + payload.len() + 1);
    dst.put_u8(MARKER);
    dst.put_u8(command);
    dst.put_u8(length);
    dst.put_slice(payload);
    dst.put_u8(sum);
    Ok(())
}

/// Timing for one request/response exchange, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FrameConfig {
    /// Quiet window used to drain unsolicited bytes before sending. Default: 10.
    pub drain_window_ms: u32,
    /// Maximum bytes discarded by one drain. Default: 512.
    pub max_drain_bytes: usize,
    /// Wait for the first response byte after sending. Default: 1000.
    pub response_timeout_ms: u32,
    /// Maximum gap between response bytes. Default: 150.
    pub inter_byte_timeout_ms: u32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            drain_window_ms: 10,
            max_drain_bytes: 512,
            response_timeout_ms: 1000,
            inter_byte_timeout_ms: 150,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(command: u8, payload: &[u8]) -> Vec<u8> {
        let mut buf = BytesMut::new();
        encode_frame(command, payload, &mut buf).unwrap();
        buf.to_vec()
    }

    #[test]
    fn set_volume_frame_is_bit_exact() {
        assert_eq!(encode(0x13, &[0x19]), vec![0xAA, 0x13, 0x01, 0x19, 0xD7]);
    }

    #[test]
    fn zero_argument_frame() {
        // play: AA 02 00 AC
        assert_eq!(encode(0x02, &[]), vec![0xAA, 0x02, 0x00, 0xAC]);
    }

    #[test]
    fn zero_argument_frames_are_identical() {
        assert_eq!(encode(0x02, &[]), encode(0x02, &[]));
    }

    #[test]
    fn checksum_wraps_modulo_256() {
        let payload = [0xFF; 4];
        let frame = encode(0xFF, &payload);
        let expected = (0xAAu32 + 0xFF + 4 + 4 * 0xFF) % 256;
        assert_eq!(*frame.last().unwrap() as u32, expected);
        assert_eq!(checksum(&frame[..frame.len() - 1]), *frame.last().unwrap());
    }

    #[test]
    fn big_endian_word_payload() {
        // play index 258 → 0x01 0x02
        assert_eq!(
            encode(0x07, &258u16.to_be_bytes()),
            vec![0xAA, 0x07, 0x02, 0x01, 0x02, 0xB6]
        );
    }

    #[test]
    fn max_payload_accepted() {
        let payload = vec![0x01; MAX_PAYLOAD];
        let frame = encode(0x1B, &payload);
        assert_eq!(frame.len(), HEADER_SIZE + MAX_PAYLOAD + 1);
        assert_eq!(frame[2], 0xFF);
    }

    #[test]
    fn payload_too_large_rejected() {
        let mut buf = BytesMut::new();
        let err = encode_frame(0x1B, &[0u8; 256], &mut buf).unwrap_err();
        assert!(matches!(
            err,
            FrameError::PayloadTooLarge { size: 256, max: 255 }
        ));
        assert!(buf.is_empty());
    }

    #[test]
    fn frame_wire_size() {
        let frame = Frame::new(0x13, Bytes::from_static(&[20]));
        assert_eq!(frame.wire_size(), 5);
        assert_eq!(frame.to_bytes().unwrap().len(), 5);
    }
}
