//! Typed values exchanged with the module.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DeviceError;

/// Playback state reported by the status query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayStatus {
    Stopped,
    Playing,
    Paused,
    /// A byte the module is not documented to send.
    Unknown(u8),
}

impl PlayStatus {
    pub fn as_byte(self) -> u8 {
        match self {
            PlayStatus::Stopped => 0,
            PlayStatus::Playing => 1,
            PlayStatus::Paused => 2,
            PlayStatus::Unknown(byte) => byte,
        }
    }

    pub fn is_playing(self) -> bool {
        self == PlayStatus::Playing
    }
}

impl From<u8> for PlayStatus {
    fn from(byte: u8) -> Self {
        match byte {
            0 => PlayStatus::Stopped,
            1 => PlayStatus::Playing,
            2 => PlayStatus::Paused,
            other => PlayStatus::Unknown(other),
        }
    }
}

impl fmt::Display for PlayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayStatus::Stopped => f.write_str("stopped"),
            PlayStatus::Playing => f.write_str("playing"),
            PlayStatus::Paused => f.write_str("paused"),
            PlayStatus::Unknown(byte) => write!(f, "unknown (0x{byte:02X})"),
        }
    }
}

/// Generates the byte conversions shared by the settings enums.
macro_rules! byte_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $what:literal {
            $( $variant:ident = $value:literal => [$($alias:literal),+] ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "kebab-case")]
        pub enum $name {
            $( $variant = $value ),+
        }

        impl $name {
            /// Every value, in wire order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Wire byte.
            pub fn as_byte(self) -> u8 {
                self as u8
            }

            /// Canonical lowercase name.
            pub fn name(self) -> &'static str {
                match self {
                    $( $name::$variant => [$($alias),+][0] ),+
                }
            }
        }

        impl TryFrom<u8> for $name {
            type Error = DeviceError;

            fn try_from(byte: u8) -> Result<Self, Self::Error> {
                match byte {
                    $( $value => Ok($name::$variant), )+
                    other => Err(DeviceError::InvalidArgument(format!(
                        concat!("no ", $what, " with value {}"),
                        other
                    ))),
                }
            }
        }

        impl FromStr for $name {
            type Err = DeviceError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
                $(
                    if [$($alias),+].contains(&wanted.as_str()) {
                        return Ok($name::$variant);
                    }
                )+
                if let Ok(byte) = wanted.parse::<u8>() {
                    return $name::try_from(byte);
                }
                Err(DeviceError::InvalidArgument(format!(
                    concat!("unknown ", $what, " '{}'"),
                    s
                )))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

byte_enum! {
    /// Equalizer presets.
    Equalizer, "equalizer" {
        Normal = 0 => ["normal"],
        Pop = 1 => ["pop"],
        Rock = 2 => ["rock"],
        Jazz = 3 => ["jazz"],
        Classic = 4 => ["classic"],
    }
}

byte_enum! {
    /// What happens when a track ends.
    LoopMode, "loop mode" {
        All = 0 => ["all"],
        One = 1 => ["one"],
        OneStop = 2 => ["one-stop", "none"],
        AllRandom = 3 => ["all-random", "random"],
        Folder = 4 => ["folder"],
        FolderRandom = 5 => ["folder-random"],
        FolderStop = 6 => ["folder-stop"],
        AllStop = 7 => ["all-stop"],
    }
}

impl LoopMode {
    /// Play the selected track once and stop.
    pub const NONE: LoopMode = LoopMode::OneStop;
}

byte_enum! {
    /// Storage the module can play from.
    Source, "source" {
        Usb = 0 => ["usb"],
        SdCard = 1 => ["sd", "sd-card", "sdcard"],
        Flash = 2 => ["flash", "builtin"],
    }
}

impl Source {
    /// The on-board flash chip.
    pub const BUILTIN: Source = Source::Flash;

    fn bit(self) -> u8 {
        1 << self.as_byte()
    }
}

/// Set of sources the module reports as present (bit `n` is source `n`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sources(pub u8);

impl Sources {
    /// Nothing present, or the module did not answer.
    pub const NONE: Sources = Sources(0);

    pub fn contains(self, source: Source) -> bool {
        self.0 & source.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// The known sources in this set.
    pub fn iter(self) -> impl Iterator<Item = Source> {
        Source::ALL.iter().copied().filter(move |&s| self.contains(s))
    }
}

impl fmt::Display for Sources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let names: Vec<&str> = self.iter().map(Source::name).collect();
        f.write_str(&names.join(","))
    }
}
