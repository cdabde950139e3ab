use serde::Serialize;

use crate::types::{Equalizer, LoopMode};

/// Loudest volume the module accepts.
pub const MAX_VOLUME: u8 = 30;

/// Volume the module comes up with after a reset.
pub const DEFAULT_VOLUME: u8 = 20;

/// Settings the module cannot be asked about, mirrored on our side.
///
/// Updated optimistically whenever the matching command is sent; the
/// module may disagree if it missed the command or was reset externally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CachedSettings {
    pub volume: u8,
    pub equalizer: Equalizer,
    pub loop_mode: LoopMode,
}

impl Default for CachedSettings {
    fn default() -> Self {
        Self {
            volume: DEFAULT_VOLUME,
            equalizer: Equalizer::Normal,
            loop_mode: LoopMode::OneStop,
        }
    }
}

impl CachedSettings {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn volume_up(&mut self) {
        if self.volume < MAX_VOLUME {
            self.volume += 1;
        }
    }

    pub(crate) fn volume_down(&mut self) {
        self.volume = self.volume.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_power_on() {
        let settings = CachedSettings::default();
        assert_eq!(settings.volume, 20);
        assert_eq!(settings.equalizer, Equalizer::Normal);
        assert_eq!(settings.loop_mode, LoopMode::OneStop);
    }

    #[test]
    fn volume_saturates() {
        let mut settings = CachedSettings {
            volume: MAX_VOLUME,
            ..CachedSettings::default()
        };
        settings.volume_up();
        assert_eq!(settings.volume, MAX_VOLUME);

        settings.volume = 0;
        settings.volume_down();
        assert_eq!(settings.volume, 0);
        settings.volume_up();
        assert_eq!(settings.volume, 1);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut settings = CachedSettings {
            volume: 3,
            equalizer: Equalizer::Jazz,
            loop_mode: LoopMode::All,
        };
        settings.reset();
        assert_eq!(settings, CachedSettings::default());
    }
}
