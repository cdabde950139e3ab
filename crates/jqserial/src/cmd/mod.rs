use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Subcommand};
use jqserial_device::{DeviceConfig, Equalizer, Jq8400, LoopMode, Source, MAX_VOLUME};
use jqserial_transport::{MonotonicClock, SerialTransport};
use tracing::debug;

use crate::exit::{device_error, io_error, json_error, CliError, CliResult};
use crate::output::OutputFormat;

pub mod info;
pub mod monitor;
pub mod playback;
pub mod ports;
pub mod raw;
pub mod reset;
pub mod settings;
pub mod status;
pub mod version;

pub type Device = Jq8400<SerialTransport, MonotonicClock>;

/// Where and how to reach the module, from the global flags.
#[derive(Debug, Clone)]
pub struct Target {
    pub port: Option<String>,
    pub baud: u32,
    pub config: Option<PathBuf>,
}

impl Target {
    /// Device settings from `--config`, or the defaults.
    pub fn load_config(&self) -> CliResult<DeviceConfig> {
        let Some(path) = &self.config else {
            return Ok(DeviceConfig::default());
        };
        let text = std::fs::read_to_string(path)
            .map_err(|err| io_error(&format!("read {}", path.display()), err))?;
        let config = serde_json::from_str(&text)
            .map_err(|err| json_error(&format!("parse {}", path.display()), err))?;
        debug!(path = %path.display(), "loaded device config");
        Ok(config)
    }

    pub fn open(&self) -> CliResult<Device> {
        self.open_with(|_| {})
    }

    /// Open the port with the loaded config adjusted by `tweak`.
    pub fn open_with(&self, tweak: impl FnOnce(&mut DeviceConfig)) -> CliResult<Device> {
        let mut config = self.load_config()?;
        tweak(&mut config);
        let port = self.port.as_deref().ok_or_else(|| {
            CliError::usage("no serial port given (use --port or JQSERIAL_PORT)")
        })?;
        Jq8400::open_with_config(port, self.baud, config)
            .map_err(|err| device_error(&format!("open {port}"), err))
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show version information.
    Version(VersionArgs),
    /// List serial ports on this host.
    Ports,
    /// Read the playback state.
    Status(StatusArgs),
    /// Read sources, file counts and the current track.
    Info,
    /// Start playback, optionally of a specific file.
    Play(PlayArgs),
    /// Pause playback.
    Pause,
    /// Stop playback.
    Stop,
    /// Skip to the next file.
    Next,
    /// Go back to the previous file.
    Prev,
    /// Jump to the next folder.
    NextFolder,
    /// Jump to the previous folder.
    PrevFolder,
    /// Play the current file from the start.
    Restart,
    /// Stop and let the module sleep.
    Sleep,
    /// Select a file by index without playing it.
    Seek(IndexArgs),
    /// Play a file over the current one, then resume.
    Interject(IndexArgs),
    /// Skip forward within the current file.
    Ffwd(SecondsArgs),
    /// Skip back within the current file.
    Rewind(SecondsArgs),
    /// Loop a section of the current file.
    AbLoop(AbLoopArgs),
    /// Play a list of files in order.
    Playlist(PlaylistArgs),
    /// Set the volume (0-30, up or down).
    Volume(VolumeArgs),
    /// Set the equalizer preset.
    Eq(EqArgs),
    /// Set the loop mode.
    LoopMode(LoopModeArgs),
    /// Switch storage source.
    Source(SourceArgs),
    /// Restore power-on settings and wait for the module to answer.
    Reset,
    /// Send any command byte and show the reply.
    Raw(RawArgs),
    /// Poll the playback state until interrupted.
    Monitor(MonitorArgs),
}

pub fn run(command: Command, target: &Target, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Version(args) => version::run(args),
        Command::Ports => ports::run(format),
        Command::Status(args) => status::run(args, target, format),
        Command::Info => info::run(target, format),
        Command::Play(args) => playback::play(args, target),
        Command::Pause => playback::simple(target, "pause", Device::pause),
        Command::Stop => playback::simple(target, "stop", Device::stop),
        Command::Next => playback::simple(target, "next", Device::next),
        Command::Prev => playback::simple(target, "prev", Device::prev),
        Command::NextFolder => playback::simple(target, "next-folder", Device::next_folder),
        Command::PrevFolder => playback::simple(target, "prev-folder", Device::prev_folder),
        Command::Restart => playback::simple(target, "restart", Device::restart),
        Command::Sleep => playback::simple(target, "sleep", Device::sleep),
        Command::Seek(args) => {
            playback::simple(target, "seek", |dev| dev.seek_file_by_index(args.index))
        }
        Command::Interject(args) => playback::simple(target, "interject", |dev| {
            dev.interject_file_by_index(args.index)
        }),
        Command::Ffwd(args) => {
            playback::simple(target, "ffwd", |dev| dev.fast_forward(args.seconds))
        }
        Command::Rewind(args) => playback::simple(target, "rewind", |dev| dev.rewind(args.seconds)),
        Command::AbLoop(args) => playback::ab_loop(args, target),
        Command::Playlist(args) => playback::playlist(args, target),
        Command::Volume(args) => settings::volume(args, target),
        Command::Eq(args) => settings::equalizer(args, target),
        Command::LoopMode(args) => settings::loop_mode(args, target),
        Command::Source(args) => settings::source(args, target),
        Command::Reset => reset::run(target, format),
        Command::Raw(args) => raw::run(args, target, format),
        Command::Monitor(args) => monitor::run(args, target, format),
    }
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Reads that must agree before playing/paused is reported.
    #[arg(long, value_name = "N")]
    pub checks: Option<u8>,
}

#[derive(Args, Debug)]
pub struct PlayArgs {
    /// File index in the module's file table.
    #[arg(long, conflicts_with_all = ["folder", "file"])]
    pub index: Option<u16>,
    /// Folder number (0-99).
    #[arg(long)]
    pub folder: Option<u16>,
    /// File number within the folder (0-999).
    #[arg(long, requires = "folder")]
    pub file: Option<u16>,
}

#[derive(Args, Debug)]
pub struct IndexArgs {
    /// File index in the module's file table.
    pub index: u16,
}

#[derive(Args, Debug)]
pub struct SecondsArgs {
    /// Seconds to skip.
    #[arg(default_value_t = 10)]
    pub seconds: u16,
}

#[derive(Args, Debug)]
pub struct AbLoopArgs {
    /// Loop start, in seconds.
    #[arg(required_unless_present = "clear")]
    pub start: Option<u16>,
    /// Loop end, in seconds.
    #[arg(required_unless_present = "clear")]
    pub end: Option<u16>,
    /// Stop looping.
    #[arg(long, conflicts_with_all = ["start", "end"])]
    pub clear: bool,
}

#[derive(Args, Debug)]
pub struct PlaylistArgs {
    /// File numbers (0-99), or names with --names.
    #[arg(required = true, num_args = 1..)]
    pub entries: Vec<String>,
    /// Treat entries as file names; only the first two characters count.
    #[arg(long)]
    pub names: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeSetting {
    Up,
    Down,
    Level(u8),
}

impl FromStr for VolumeSetting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" | "+" => Ok(Self::Up),
            "down" | "dn" | "-" => Ok(Self::Down),
            other => match other.parse::<u8>() {
                Ok(level) if level <= MAX_VOLUME => Ok(Self::Level(level)),
                _ => Err(format!("expected 0-{MAX_VOLUME}, up or down, got '{s}'")),
            },
        }
    }
}

#[derive(Args, Debug)]
pub struct VolumeArgs {
    /// 0-30, up or down.
    #[arg(allow_hyphen_values = true)]
    pub level: VolumeSetting,
}

#[derive(Args, Debug)]
pub struct EqArgs {
    /// normal, pop, rock, jazz or classic.
    pub mode: Equalizer,
}

#[derive(Args, Debug)]
pub struct LoopModeArgs {
    /// all, one, one-stop (none), all-random, folder, folder-random,
    /// folder-stop or all-stop.
    pub mode: LoopMode,
}

#[derive(Args, Debug)]
pub struct SourceArgs {
    /// usb, sd or flash (builtin).
    pub source: Source,
}

#[derive(Args, Debug)]
pub struct RawArgs {
    /// Command name (e.g. set-volume) or byte (e.g. 0x13).
    pub command: String,
    /// Payload bytes, decimal or 0x-prefixed hex.
    pub bytes: Vec<String>,
    /// Reply bytes to keep; 0 sends without waiting. Defaults to the
    /// command's reply size.
    #[arg(long, value_name = "N")]
    pub response: Option<usize>,
}

#[derive(Args, Debug)]
pub struct MonitorArgs {
    /// Delay between polls, in milliseconds.
    #[arg(long, default_value_t = 1000, value_name = "MS")]
    pub interval: u64,
    /// Exit after N readings.
    #[arg(long)]
    pub count: Option<usize>,
    /// Only print readings that differ from the previous one.
    #[arg(long)]
    pub changes: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_setting_parses() {
        assert_eq!("up".parse::<VolumeSetting>(), Ok(VolumeSetting::Up));
        assert_eq!("-".parse::<VolumeSetting>(), Ok(VolumeSetting::Down));
        assert_eq!("30".parse::<VolumeSetting>(), Ok(VolumeSetting::Level(30)));
        assert!("31".parse::<VolumeSetting>().is_err());
        assert!("loud".parse::<VolumeSetting>().is_err());
    }

    #[test]
    fn missing_port_is_usage_error() {
        let target = Target {
            port: None,
            baud: 9600,
            config: None,
        };
        let err = target.open().err().expect("no port given");
        assert_eq!(err.code, crate::exit::USAGE);
    }

    #[test]
    fn config_file_is_loaded() {
        let path =
            std::env::temp_dir().join(format!("jqserial-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"status_checks": 4}"#).expect("temp file should be writable");
        let target = Target {
            port: None,
            baud: 9600,
            config: Some(path.clone()),
        };
        let config = target.load_config().expect("config should load");
        assert_eq!(config.status_checks, 4);
        assert_eq!(config.reset_polls, 9);
        let _ = std::fs::remove_file(&path);
    }
}
