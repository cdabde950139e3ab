use jqserial_frame::Response;
use jqserial_transport::{Clock, Transport};
use tracing::{debug, warn};

use crate::command::{self, Command};
use crate::config::DeviceConfig;
use crate::error::{DeviceError, Result};
use crate::path;
use crate::state::{CachedSettings, MAX_VOLUME};
use crate::transaction::TransactionEngine;
use crate::types::{Equalizer, LoopMode, Source, Sources};

/// A JQ8400 module on the other end of a transport.
///
/// Operations take `&mut self`, so at most one exchange is ever in flight.
/// Queries follow the module's zero convention: a reply that times out or
/// fails its checksum reads as zero. Only transport failures and arguments
/// the module cannot encode are returned as errors.
#[derive(Debug)]
pub struct Jq8400<T, C> {
    pub(crate) engine: TransactionEngine<T, C>,
    pub(crate) settings: CachedSettings,
    pub(crate) config: DeviceConfig,
}

#[cfg(feature = "serial")]
impl Jq8400<jqserial_transport::SerialTransport, jqserial_transport::MonotonicClock> {
    /// Open a serial port and wrap it with default configuration.
    pub fn open(port: &str, baud_rate: u32) -> Result<Self> {
        Self::open_with_config(port, baud_rate, DeviceConfig::default())
    }

    /// Open a serial port with explicit configuration.
    pub fn open_with_config(port: &str, baud_rate: u32, config: DeviceConfig) -> Result<Self> {
        let transport = jqserial_transport::SerialTransport::open(port, baud_rate)?;
        Ok(Self::with_config(
            transport,
            jqserial_transport::MonotonicClock::new(),
            config,
        ))
    }
}

impl<T: Transport, C: Clock> Jq8400<T, C> {
    pub fn new(transport: T, clock: C) -> Self {
        Self::with_config(transport, clock, DeviceConfig::default())
    }

    pub fn with_config(transport: T, clock: C, config: DeviceConfig) -> Self {
        Self {
            engine: TransactionEngine::with_config(transport, clock, config.frame),
            settings: CachedSettings::default(),
            config,
        }
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Settings as last sent to the module.
    pub fn settings(&self) -> CachedSettings {
        self.settings
    }

    pub fn engine(&self) -> &TransactionEngine<T, C> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut TransactionEngine<T, C> {
        &mut self.engine
    }

    pub fn transport(&self) -> &T {
        self.engine.transport()
    }

    pub fn transport_mut(&mut self) -> &mut T {
        self.engine.transport_mut()
    }

    /// Release the transport and clock.
    pub fn into_parts(self) -> (T, C) {
        self.engine.into_parts()
    }

    // Playback

    pub fn play(&mut self) -> Result<()> {
        self.command(command::PLAY, &[])
    }

    /// Stop, then play from the start of the current track.
    pub fn restart(&mut self) -> Result<()> {
        self.command(command::STOP, &[])?;
        self.command(command::PLAY, &[])
    }

    pub fn pause(&mut self) -> Result<()> {
        self.command(command::PAUSE, &[])
    }

    pub fn stop(&mut self) -> Result<()> {
        self.command(command::STOP, &[])
    }

    pub fn next(&mut self) -> Result<()> {
        self.command(command::NEXT, &[])
    }

    pub fn prev(&mut self) -> Result<()> {
        self.command(command::PREV, &[])
    }

    pub fn next_folder(&mut self) -> Result<()> {
        self.command(command::NEXT_FOLDER, &[])
    }

    pub fn prev_folder(&mut self) -> Result<()> {
        self.command(command::PREV_FOLDER, &[])
    }

    pub fn fast_forward(&mut self, seconds: u16) -> Result<()> {
        self.command(command::FFWD, &seconds.to_be_bytes())
    }

    pub fn rewind(&mut self, seconds: u16) -> Result<()> {
        self.command(command::RWND, &seconds.to_be_bytes())
    }

    /// Play the file with this index in the module's file table (1-based).
    pub fn play_file_by_index(&mut self, index: u16) -> Result<()> {
        self.command(command::PLAY_IDX, &index.to_be_bytes())
    }

    /// Play a file over the current one, then resume.
    ///
    /// Reads the current source first; the module needs it in the request.
    pub fn interject_file_by_index(&mut self, index: u16) -> Result<()> {
        let source = self.source_byte()?;
        let [hi, lo] = index.to_be_bytes();
        self.command(command::INSERT_IDX, &[source, hi, lo])
    }

    /// Select a file without starting playback.
    pub fn seek_file_by_index(&mut self, index: u16) -> Result<()> {
        self.command(command::SEEK_IDX, &index.to_be_bytes())
    }

    /// Play file `file` (0-999) in folder `folder` (0-99) of the current source.
    pub fn play_file_in_folder(&mut self, folder: u16, file: u16) -> Result<()> {
        // Validate before spending an exchange on the source lookup.
        let mut path = path::folder_file_path(0, folder, file)?;
        path[0] = self.source_byte()?;
        self.command(command::PLAY_FILE_FOLDER, &path)
    }

    /// Play the first file in folder `folder` (0-99) of the current source.
    pub fn play_in_folder(&mut self, folder: u16) -> Result<()> {
        let mut path = path::folder_path(0, folder)?;
        path[0] = self.source_byte()?;
        self.command(command::PLAY_FILE_FOLDER, &path)
    }

    /// Loop the current track between two offsets.
    pub fn ab_loop_play(&mut self, start_seconds: u16, end_seconds: u16) -> Result<()> {
        let [start_min, start_sec] = minutes_seconds(start_seconds)?;
        let [end_min, end_sec] = minutes_seconds(end_seconds)?;
        self.command(command::AB_PLAY, &[start_min, start_sec, end_min, end_sec])
    }

    pub fn ab_loop_clear(&mut self) -> Result<()> {
        self.command(command::AB_PLAY_STOP, &[])
    }

    /// Play files by number, in order (entries 0-99).
    pub fn play_sequence_by_number(&mut self, files: &[u8]) -> Result<()> {
        let payload = path::playlist_by_number(files)?;
        self.command(command::PLAYLIST, &payload)
    }

    /// Play files by name, in order. Only the first two characters count.
    pub fn play_sequence_by_name<S: AsRef<str>>(&mut self, names: &[S]) -> Result<()> {
        let payload = path::playlist_by_name(names)?;
        self.command(command::PLAYLIST, &payload)
    }

    /// Send the sleep command, then stop.
    pub fn sleep(&mut self) -> Result<()> {
        self.command(command::SLEEP, &[])?;
        self.command(command::STOP, &[])
    }

    // Settings

    pub fn volume_up(&mut self) -> Result<()> {
        self.settings.volume_up();
        // Sent even at the limit in case the cache has drifted.
        self.command(command::VOL_UP, &[])
    }

    pub fn volume_down(&mut self) -> Result<()> {
        self.settings.volume_down();
        self.command(command::VOL_DN, &[])
    }

    /// Set the volume (0-30). Larger values are clamped.
    pub fn set_volume(&mut self, volume: u8) -> Result<()> {
        let volume = if volume > MAX_VOLUME {
            warn!(requested = volume, max = MAX_VOLUME, "volume clamped");
            MAX_VOLUME
        } else {
            volume
        };
        self.settings.volume = volume;
        self.command(command::VOL_SET, &[volume])
    }

    pub fn set_equalizer(&mut self, equalizer: Equalizer) -> Result<()> {
        self.settings.equalizer = equalizer;
        self.command(command::EQ_SET, &[equalizer.as_byte()])
    }

    pub fn set_loop_mode(&mut self, mode: LoopMode) -> Result<()> {
        self.settings.loop_mode = mode;
        self.command(command::LOOP_SET, &[mode.as_byte()])
    }

    pub fn set_source(&mut self, source: Source) -> Result<()> {
        self.command(command::SOURCE_SET, &[source.as_byte()])
    }

    /// Cached volume.
    pub fn volume(&self) -> u8 {
        self.settings.volume
    }

    /// Cached equalizer.
    pub fn equalizer(&self) -> Equalizer {
        self.settings.equalizer
    }

    /// Cached loop mode.
    pub fn loop_mode(&self) -> LoopMode {
        self.settings.loop_mode
    }

    // Queries

    /// The source currently playing from, or `None` if the module answered
    /// with a byte that names no source (including no answer at all, which
    /// reads as USB).
    pub fn source(&mut self) -> Result<Option<Source>> {
        let byte = self.source_byte()?;
        Ok(Source::try_from(byte).ok())
    }

    /// Sources the module reports as present. Empty when it did not answer.
    pub fn available_sources(&mut self) -> Result<Sources> {
        Ok(Sources(self.query_byte(command::GET_SOURCES)?))
    }

    pub fn source_available(&mut self, source: Source) -> Result<bool> {
        Ok(self.available_sources()?.contains(source))
    }

    /// Files on the current source.
    pub fn count_files(&mut self) -> Result<u16> {
        self.query_word(command::COUNT_FILES)
    }

    /// Files in the folder of the current file.
    pub fn count_files_in_folder(&mut self) -> Result<u16> {
        self.query_word(command::COUNT_IN_FOLDER)
    }

    /// Index of the first file in the folder of the current file.
    pub fn first_file_in_folder_index(&mut self) -> Result<u16> {
        self.query_word(command::FIRST_FILE_IN_FOLDER_IDX)
    }

    pub fn current_file_index(&mut self) -> Result<u16> {
        self.query_word(command::CURRENT_FILE_IDX)
    }

    /// Playback position in seconds.
    ///
    /// Asking for the position also starts once-a-second position reports,
    /// so they are switched off again straight after.
    pub fn current_file_position(&mut self) -> Result<u32> {
        let seconds = self.query_duration(command::CURRENT_FILE_POS)?;
        self.command(command::CURRENT_FILE_POS_STOP, &[])?;
        Ok(seconds)
    }

    /// Length of the current file in seconds.
    pub fn current_file_length(&mut self) -> Result<u32> {
        self.query_duration(command::CURRENT_FILE_LEN)
    }

    /// Name of the current file, cut at `file_name_capacity - 1` bytes.
    pub fn current_file_name(&mut self) -> Result<String> {
        let mut buf = vec![0u8; self.config.file_name_capacity];
        self.query(command::CURRENT_FILE_NAME, &mut buf)?;
        if let Some(last) = buf.last_mut() {
            *last = 0;
        }
        let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
        Ok(String::from_utf8_lossy(&buf[..end]).into_owned())
    }

    /// Send any command byte and return the decoded reply.
    ///
    /// Unlike the typed operations, protocol failures are returned as
    /// [`DeviceError::Frame`] so they can be inspected. A `capacity` of zero
    /// sends without waiting. Known commands are checked against their
    /// arity; unknown bytes are sent as given.
    pub fn send_raw(&mut self, code: u8, payload: &[u8], capacity: usize) -> Result<Response> {
        if let Some(known) = command::by_code(code) {
            known.check_payload(payload)?;
        }
        debug!(code, len = payload.len(), capacity, "raw exchange");
        self.engine
            .execute(code, payload, capacity)
            .map_err(DeviceError::from_frame)
    }

    pub(crate) fn command(&mut self, cmd: Command, payload: &[u8]) -> Result<()> {
        cmd.check_payload(payload)?;
        debug!(command = cmd.name, code = cmd.code, "send");
        self.engine.transact_into(cmd.code, payload, None)?;
        Ok(())
    }

    fn query(&mut self, cmd: Command, buf: &mut [u8]) -> Result<bool> {
        cmd.check_payload(&[])?;
        let answered = self.engine.transact_into(cmd.code, &[], Some(buf))?;
        debug!(command = cmd.name, answered, "query");
        Ok(answered)
    }

    pub(crate) fn query_byte(&mut self, cmd: Command) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.query(cmd, &mut buf)?;
        Ok(buf[0])
    }

    fn query_word(&mut self, cmd: Command) -> Result<u16> {
        let mut buf = [0u8; 4];
        self.query(cmd, &mut buf)?;
        Ok(u16::from_be_bytes([buf[0], buf[1]]))
    }

    fn query_duration(&mut self, cmd: Command) -> Result<u32> {
        let mut buf = [0u8; 3];
        self.query(cmd, &mut buf)?;
        let [hours, minutes, seconds] = buf.map(u32::from);
        Ok(hours * 3600 + minutes * 60 + seconds)
    }

    fn source_byte(&mut self) -> Result<u8> {
        self.query_byte(command::GET_SOURCE)
    }
}

fn minutes_seconds(total: u16) -> Result<[u8; 2]> {
    let minutes = u8::try_from(total / 60).map_err(|_| {
        DeviceError::InvalidArgument(format!("{total}s is past the last loop point (255:59)"))
    })?;
    Ok([minutes, (total % 60) as u8])
}
