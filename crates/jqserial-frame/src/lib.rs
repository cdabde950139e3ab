//! Checksummed command/response framing for JQ8400 serial modules.
//!
//! Every request is framed as:
//! - A start marker `0xAA`
//! - A command byte
//! - A payload length byte (0-255) and the payload itself
//! - An additive checksum: the low 8 bits of the sum of every preceding byte
//!
//! Responses use the same layout. They are decoded positionally one byte at
//! a time, with a bounded wait between bytes, so a stalled or noisy line
//! always ends in a verdict instead of a hang.

pub mod codec;
pub mod decoder;
pub mod error;
pub mod reader;
pub mod writer;

pub use codec::{checksum, encode_frame, Frame, FrameConfig, HEADER_SIZE, MARKER, MAX_PAYLOAD};
pub use decoder::{decode_frame, DecodeStage, Response, ResponseDecoder};
pub use error::{FrameError, Result};
pub use reader::FrameReader;
pub use writer::FrameWriter;
