//! The JQ8400 command table.
//!
//! Each command is a byte on the wire plus the shape of its arguments and
//! of the reply it provokes. Sixteen-bit arguments are sent big-endian.

use std::fmt;

use crate::error::{DeviceError, Result};

/// Shape of a command's argument payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Empty payload.
    None,
    /// One byte.
    Byte,
    /// One big-endian 16-bit value.
    Word,
    /// A fixed number of bytes with a command-specific layout.
    Bytes(u8),
    /// A command-specific, variable-length payload.
    Variable,
}

impl Arity {
    /// Exact payload length, when fixed.
    pub fn payload_len(self) -> Option<usize> {
        match self {
            Arity::None => Some(0),
            Arity::Byte => Some(1),
            Arity::Word => Some(2),
            Arity::Bytes(n) => Some(usize::from(n)),
            Arity::Variable => None,
        }
    }

    /// Whether a payload of `len` bytes fits this arity.
    pub fn accepts(self, len: usize) -> bool {
        match self.payload_len() {
            Some(expected) => expected == len,
            None => len <= jqserial_frame::MAX_PAYLOAD,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::None => f.write_str("no arguments"),
            Arity::Byte => f.write_str("1 byte"),
            Arity::Word => f.write_str("2 bytes"),
            Arity::Bytes(n) => write!(f, "{n} bytes"),
            Arity::Variable => f.write_str("a variable payload"),
        }
    }
}

/// What the module sends back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// Nothing; the command is fire-and-forget.
    None,
    /// One byte.
    Byte,
    /// A 16-bit value in the first two bytes of a four-byte buffer.
    Word,
    /// Hours, minutes, seconds.
    Duration,
    /// Zero-terminated text.
    Text,
}

impl ResponseShape {
    /// Response buffer size used for this shape; `None` for text, whose
    /// size the caller chooses.
    pub fn capacity(self) -> Option<usize> {
        match self {
            ResponseShape::None => Some(0),
            ResponseShape::Byte => Some(1),
            ResponseShape::Word => Some(4),
            ResponseShape::Duration => Some(3),
            ResponseShape::Text => None,
        }
    }
}

/// One entry of the command table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    /// Name used in logs and by the CLI.
    pub name: &'static str,
    /// Byte on the wire.
    pub code: u8,
    /// Argument layout.
    pub arity: Arity,
    /// Reply layout.
    pub response: ResponseShape,
}

impl Command {
    const fn new(name: &'static str, code: u8, arity: Arity, response: ResponseShape) -> Self {
        Self {
            name,
            code,
            arity,
            response,
        }
    }

    /// Reject payloads that do not match this command's arity.
    pub fn check_payload(&self, payload: &[u8]) -> Result<()> {
        if self.arity.accepts(payload.len()) {
            Ok(())
        } else {
            Err(DeviceError::ArityMismatch {
                command: self.name,
                expected: self.arity,
                actual: payload.len(),
            })
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:02X})", self.name, self.code)
    }
}

use Arity as A;
use ResponseShape as R;

pub const STATUS: Command = Command::new("status", 0x01, A::None, R::Byte);
pub const PLAY: Command = Command::new("play", 0x02, A::None, R::None);
pub const PAUSE: Command = Command::new("pause", 0x03, A::None, R::None);
/// The module documents two stop-like commands and no sleep or reset; this
/// byte is used for both.
pub const SLEEP: Command = Command::new("sleep", 0x04, A::None, R::None);
/// Alias of [`SLEEP`]: same byte, same behavior.
pub const RESET: Command = SLEEP;
pub const PREV: Command = Command::new("prev", 0x05, A::None, R::None);
pub const NEXT: Command = Command::new("next", 0x06, A::None, R::None);
pub const PLAY_IDX: Command = Command::new("play-index", 0x07, A::Word, R::None);
/// Payload is the wildcard path built by [`crate::path`].
pub const PLAY_FILE_FOLDER: Command =
    Command::new("play-file-in-folder", 0x08, A::Variable, R::None);
pub const GET_SOURCES: Command = Command::new("get-sources", 0x09, A::None, R::Byte);
pub const GET_SOURCE: Command = Command::new("get-source", 0x0A, A::None, R::Byte);
pub const SOURCE_SET: Command = Command::new("set-source", 0x0B, A::Byte, R::None);
pub const COUNT_FILES: Command = Command::new("count-files", 0x0C, A::None, R::Word);
pub const CURRENT_FILE_IDX: Command =
    Command::new("current-file-index", 0x0D, A::None, R::Word);
pub const PREV_FOLDER: Command = Command::new("prev-folder", 0x0E, A::None, R::None);
pub const NEXT_FOLDER: Command = Command::new("next-folder", 0x0F, A::None, R::None);
pub const STOP: Command = Command::new("stop", 0x10, A::None, R::None);
pub const FIRST_FILE_IN_FOLDER_IDX: Command =
    Command::new("first-file-in-folder", 0x11, A::None, R::Word);
pub const COUNT_IN_FOLDER: Command = Command::new("count-in-folder", 0x12, A::None, R::Word);
pub const VOL_SET: Command = Command::new("set-volume", 0x13, A::Byte, R::None);
pub const VOL_UP: Command = Command::new("volume-up", 0x14, A::None, R::None);
pub const VOL_DN: Command = Command::new("volume-down", 0x15, A::None, R::None);
/// Payload: source byte, then the big-endian file index.
pub const INSERT_IDX: Command = Command::new("interject-index", 0x16, A::Bytes(3), R::None);
pub const LOOP_SET: Command = Command::new("set-loop-mode", 0x18, A::Byte, R::None);
pub const EQ_SET: Command = Command::new("set-equalizer", 0x1A, A::Byte, R::None);
/// Payload: two ASCII characters per entry.
pub const PLAYLIST: Command = Command::new("playlist", 0x1B, A::Variable, R::None);
pub const CURRENT_FILE_NAME: Command =
    Command::new("current-file-name", 0x1E, A::None, R::Text);
pub const SEEK_IDX: Command = Command::new("seek-index", 0x1F, A::Word, R::None);
/// Payload: start minutes, start seconds, end minutes, end seconds.
pub const AB_PLAY: Command = Command::new("ab-loop", 0x20, A::Bytes(4), R::None);
pub const AB_PLAY_STOP: Command = Command::new("ab-loop-clear", 0x21, A::None, R::None);
pub const RWND: Command = Command::new("rewind", 0x22, A::Word, R::None);
pub const FFWD: Command = Command::new("fast-forward", 0x23, A::Word, R::None);
pub const CURRENT_FILE_LEN: Command =
    Command::new("current-file-length", 0x24, A::None, R::Duration);
/// Also switches on once-a-second position reports; see [`CURRENT_FILE_POS_STOP`].
pub const CURRENT_FILE_POS: Command =
    Command::new("current-file-position", 0x25, A::None, R::Duration);
pub const CURRENT_FILE_POS_STOP: Command =
    Command::new("stop-position-reports", 0x26, A::None, R::None);

/// Every distinct command, ordered by code.
pub const COMMANDS: &[Command] = &[
    STATUS,
    PLAY,
    PAUSE,
    SLEEP,
    PREV,
    NEXT,
    PLAY_IDX,
    PLAY_FILE_FOLDER,
    GET_SOURCES,
    GET_SOURCE,
    SOURCE_SET,
    COUNT_FILES,
    CURRENT_FILE_IDX,
    PREV_FOLDER,
    NEXT_FOLDER,
    STOP,
    FIRST_FILE_IN_FOLDER_IDX,
    COUNT_IN_FOLDER,
    VOL_SET,
    VOL_UP,
    VOL_DN,
    INSERT_IDX,
    LOOP_SET,
    EQ_SET,
    PLAYLIST,
    CURRENT_FILE_NAME,
    SEEK_IDX,
    AB_PLAY,
    AB_PLAY_STOP,
    RWND,
    FFWD,
    CURRENT_FILE_LEN,
    CURRENT_FILE_POS,
    CURRENT_FILE_POS_STOP,
];

const ALIASES: &[(&str, Command)] = &[("reset", RESET)];

/// Look up a command by name (`-` and `_` are interchangeable, case-insensitive).
pub fn by_name(name: &str) -> Option<Command> {
    let wanted = name.trim().to_ascii_lowercase().replace('_', "-");
    COMMANDS
        .iter()
        .copied()
        .find(|command| command.name == wanted)
        .or_else(|| {
            ALIASES
                .iter()
                .find(|(alias, _)| *alias == wanted)
                .map(|(_, command)| *command)
        })
}

/// Look up a command by its wire byte.
pub fn by_code(code: u8) -> Option<Command> {
    COMMANDS.iter().copied().find(|command| command.code == code)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn codes_are_unique() {
        let codes: HashSet<u8> = COMMANDS.iter().map(|c| c.code).collect();
        assert_eq!(codes.len(), COMMANDS.len());
    }

    #[test]
    fn names_are_unique() {
        let names: HashSet<&str> = COMMANDS.iter().map(|c| c.name).collect();
        assert_eq!(names.len(), COMMANDS.len());
    }

    #[test]
    fn table_is_sorted_by_code() {
        assert!(COMMANDS.windows(2).all(|w| w[0].code < w[1].code));
    }

    #[test]
    fn sleep_and_reset_share_a_byte() {
        assert_eq!(SLEEP.code, 0x04);
        assert_eq!(RESET, SLEEP);
        assert_eq!(by_name("reset"), Some(SLEEP));
        assert_eq!(by_name("sleep"), Some(SLEEP));
    }

    #[test]
    fn lookup_normalizes_names() {
        assert_eq!(by_name("SET_VOLUME"), Some(VOL_SET));
        assert_eq!(by_name(" count-files "), Some(COUNT_FILES));
        assert_eq!(by_name("nope"), None);
        assert_eq!(by_code(0x13), Some(VOL_SET));
        assert_eq!(by_code(0x17), None);
    }

    #[test]
    fn queries_have_a_response_shape() {
        for command in [STATUS, GET_SOURCES, GET_SOURCE] {
            assert_eq!(command.response, ResponseShape::Byte);
        }
        for command in [COUNT_FILES, CURRENT_FILE_IDX, COUNT_IN_FOLDER, FIRST_FILE_IN_FOLDER_IDX] {
            assert_eq!(command.response.capacity(), Some(4));
        }
        assert_eq!(CURRENT_FILE_LEN.response.capacity(), Some(3));
        assert_eq!(CURRENT_FILE_NAME.response.capacity(), None);
    }

    #[test]
    fn check_payload_enforces_arity() {
        assert!(VOL_SET.check_payload(&[20]).is_ok());
        assert!(PLAY.check_payload(&[]).is_ok());
        assert!(SEEK_IDX.check_payload(&[0, 1]).is_ok());
        assert!(PLAYLIST.check_payload(b"0102").is_ok());

        let err = VOL_SET.check_payload(&[]).unwrap_err();
        assert!(matches!(
            err,
            DeviceError::ArityMismatch {
                command: "set-volume",
                expected: Arity::Byte,
                actual: 0
            }
        ));
        assert!(AB_PLAY.check_payload(&[0, 1, 2]).is_err());
    }

    #[test]
    fn arity_display() {
        assert_eq!(Arity::None.to_string(), "no arguments");
        assert_eq!(Arity::Bytes(3).to_string(), "3 bytes");
    }
}
