//! Payload builders for folder selection and playlists.
//!
//! The module resolves files by a wildcard path: a raw source byte, then
//! slash-separated components that each need a trailing `*`, and a `???`
//! extension. Numbers are written as zero-padded ASCII digits into fixed
//! slots of a literal template.

use crate::error::{DeviceError, Result};

/// Highest folder number the two-digit slot can hold.
pub const MAX_FOLDER: u16 = 99;
/// Highest file number the three-digit slot can hold.
pub const MAX_FILE: u16 = 999;
/// Highest playlist entry the two-digit slot can hold.
pub const MAX_PLAYLIST_ENTRY: u8 = 99;

const FOLDER_FILE_TEMPLATE: [u8; 13] = *b" /00*/000*???";
const FOLDER_TEMPLATE: [u8; 10] = *b" /00*/*???";

/// Path selecting file `file` in folder `folder`, e.g. `src/42*/032*???`.
pub fn folder_file_path(source: u8, folder: u16, file: u16) -> Result<[u8; 13]> {
    check_range("folder", folder, MAX_FOLDER)?;
    check_range("file", file, MAX_FILE)?;

    let mut path = FOLDER_FILE_TEMPLATE;
    path[0] = source;
    write_digits(&mut path[2..4], folder);
    write_digits(&mut path[6..9], file);
    Ok(path)
}

/// Path selecting the first file in folder `folder`, e.g. `src/42*/*???`.
pub fn folder_path(source: u8, folder: u16) -> Result<[u8; 10]> {
    check_range("folder", folder, MAX_FOLDER)?;

    let mut path = FOLDER_TEMPLATE;
    path[0] = source;
    write_digits(&mut path[2..4], folder);
    Ok(path)
}

/// Playlist of file numbers, two digits per entry.
pub fn playlist_by_number(entries: &[u8]) -> Result<Vec<u8>> {
    check_playlist_len(entries.len())?;
    let mut payload = Vec::with_capacity(entries.len() * 2);
    for &entry in entries {
        check_range("playlist entry", u16::from(entry), u16::from(MAX_PLAYLIST_ENTRY))?;
        let mut digits = [0u8; 2];
        write_digits(&mut digits, u16::from(entry));
        payload.extend_from_slice(&digits);
    }
    Ok(payload)
}

/// Playlist of file names; the module matches on the first two characters.
pub fn playlist_by_name<S: AsRef<str>>(names: &[S]) -> Result<Vec<u8>> {
    check_playlist_len(names.len())?;
    let mut payload = Vec::with_capacity(names.len() * 2);
    for name in names {
        let name = name.as_ref();
        match name.as_bytes() {
            [a, b, ..] if a.is_ascii() && b.is_ascii() => payload.extend_from_slice(&[*a, *b]),
            _ => {
                return Err(DeviceError::InvalidArgument(format!(
                    "playlist name '{name}' needs at least two ASCII characters"
                )))
            }
        }
    }
    Ok(payload)
}

fn check_range(what: &str, value: u16, max: u16) -> Result<()> {
    if value > max {
        return Err(DeviceError::InvalidArgument(format!(
            "{what} {value} out of range (0-{max})"
        )));
    }
    Ok(())
}

fn check_playlist_len(len: usize) -> Result<()> {
    let max = jqserial_frame::MAX_PAYLOAD / 2;
    if len > max {
        return Err(DeviceError::InvalidArgument(format!(
            "playlist has {len} entries, at most {max} fit one frame"
        )));
    }
    Ok(())
}

/// Zero-padded decimal, right-aligned in `slot`. Callers range-check first.
fn write_digits(slot: &mut [u8], mut value: u16) {
    for digit in slot.iter_mut().rev() {
        *digit = b'0' + (value % 10) as u8;
        value /= 10;
    }
}
