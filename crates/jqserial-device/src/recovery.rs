//! Retry and agreement policies layered over single exchanges.

use jqserial_transport::{Clock, Transport};
use tracing::{debug, warn};

use crate::command;
use crate::device::Jq8400;
use crate::error::Result;
use crate::state::DEFAULT_VOLUME;
use crate::types::{Equalizer, LoopMode, PlayStatus, Sources};

/// Agreement rule for status reads on a noisy line.
///
/// "Stopped" is trusted on sight. Playing or paused is only believed when
/// every read of a pass returns the same answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusConsensus {
    /// Reads per pass; one or zero trusts the first read.
    pub checks: u8,
    /// Passes before settling for the last reading.
    pub max_passes: u32,
}

impl StatusConsensus {
    pub fn new(checks: u8, max_passes: u32) -> Self {
        Self { checks, max_passes }
    }

    /// Run passes of `read` until they agree.
    pub fn resolve<E, F>(&self, mut read: F) -> std::result::Result<PlayStatus, E>
    where
        F: FnMut() -> std::result::Result<u8, E>,
    {
        if self.checks <= 1 {
            return read().map(PlayStatus::from);
        }

        let mut last = 0u8;
        for pass in 1..=self.max_passes.max(1) {
            let first = read()?;
            if first == 0 {
                return Ok(PlayStatus::Stopped);
            }
            last = first;
            let mut agreed = true;
            for _ in 1..self.checks {
                let reading = read()?;
                if reading == 0 {
                    return Ok(PlayStatus::Stopped);
                }
                agreed &= reading == first;
                last = reading;
            }
            if agreed && matches!(first, 1 | 2) {
                return Ok(PlayStatus::from(first));
            }
            debug!(pass, last, "status reads disagree");
        }

        warn!(
            passes = self.max_passes,
            last, "status never agreed, using last reading"
        );
        Ok(PlayStatus::from(last))
    }
}

impl<T: Transport, C: Clock> Jq8400<T, C> {
    /// Playback state, checked by [`StatusConsensus`] when
    /// `status_checks` is above one.
    pub fn status(&mut self) -> Result<PlayStatus> {
        let consensus = StatusConsensus::new(
            self.config.status_checks,
            self.config.status_max_passes,
        );
        consensus.resolve(|| self.query_byte(command::STATUS))
    }

    /// True while a track is playing.
    pub fn is_busy(&mut self) -> Result<bool> {
        Ok(self.status()?.is_playing())
    }

    /// Bring the module back to power-on settings.
    ///
    /// The module has no reset command, so this stops playback, restores
    /// default volume, equalizer and loop mode, selects the first file, and
    /// then waits for the module to report its sources. The whole sequence
    /// is retried up to `reset_attempts` times. Returns the reported
    /// sources; empty means the module never answered.
    pub fn reset(&mut self) -> Result<Sources> {
        for attempt in 1..=self.config.reset_attempts {
            self.command(command::STOP, &[])?;
            self.engine.delay_ms(self.config.reset_settle_ms);
            self.command(command::RESET, &[])?;
            self.engine.delay_ms(self.config.reset_settle_ms);

            self.set_volume(DEFAULT_VOLUME)?;
            self.set_equalizer(Equalizer::Normal)?;
            self.set_loop_mode(LoopMode::OneStop)?;
            self.seek_file_by_index(1)?;
            self.command(command::STOP, &[])?;

            for _ in 0..self.config.reset_polls {
                let sources = self.available_sources()?;
                if !sources.is_empty() {
                    debug!(attempt, %sources, "module answered after reset");
                    return Ok(sources);
                }
                self.engine.delay_ms(self.config.reset_poll_interval_ms);
            }
            debug!(attempt, "no answer to reset");
        }

        warn!(
            attempts = self.config.reset_attempts,
            "module did not answer after reset"
        );
        Ok(Sources::NONE)
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;
    use jqserial_frame::encode_frame;
    use jqserial_transport::mock::{MockClock, MockTransport};

    use super::*;
    use crate::config::DeviceConfig;
    use crate::state::CachedSettings;

    fn reply(command: u8, payload: &[u8]) -> Vec<u8> {
        let mut buf = BytesMut::new();
        encode_frame(command, payload, &mut buf).expect("payload fits");
        buf.to_vec()
    }

    fn device(config: DeviceConfig) -> Jq8400<MockTransport, MockClock> {
        let clock = MockClock::new();
        Jq8400::with_config(MockTransport::new(clock.clone()), clock, config)
    }

    #[test]
    fn single_check_trusts_first_read() {
        let consensus = StatusConsensus::new(1, 8);
        let mut reads = 0;
        let result = consensus.resolve(|| {
            reads += 1;
            Ok::<_, ()>(2)
        });
        assert_eq!(result, Ok(PlayStatus::Paused));
        assert_eq!(reads, 1);
    }

    #[test]
    fn disagreeing_pass_is_retried() {
        let consensus = StatusConsensus::new(3, 8);
        let readings = [1, 2, 1, 1, 1, 1];
        let mut reads = 0;
        let result = consensus.resolve(|| {
            let value = readings[reads];
            reads += 1;
            Ok::<_, ()>(value)
        });
        assert_eq!(result, Ok(PlayStatus::Playing));
        assert_eq!(reads, 6);
    }

    #[test]
    fn stopped_short_circuits() {
        let consensus = StatusConsensus::new(3, 8);
        let readings = [1, 0, 1];
        let mut reads = 0;
        let result = consensus.resolve(|| {
            let value = readings[reads];
            reads += 1;
            Ok::<_, ()>(value)
        });
        assert_eq!(result, Ok(PlayStatus::Stopped));
        assert_eq!(reads, 2);
    }

    #[test]
    fn sums_that_match_without_agreement_are_rejected() {
        // 1 + 3 adds up to two "paused" readings but is not agreement.
        let consensus = StatusConsensus::new(2, 8);
        let readings = [1, 3, 2, 2];
        let mut reads = 0;
        let result = consensus.resolve(|| {
            let value = readings[reads];
            reads += 1;
            Ok::<_, ()>(value)
        });
        assert_eq!(result, Ok(PlayStatus::Paused));
        assert_eq!(reads, 4);
    }

    #[test]
    fn agreement_on_unknown_value_is_not_accepted() {
        let consensus = StatusConsensus::new(2, 2);
        let mut reads = 0;
        let result = consensus.resolve(|| {
            reads += 1;
            Ok::<_, ()>(7)
        });
        assert_eq!(result, Ok(PlayStatus::Unknown(7)));
        assert_eq!(reads, 4);
    }

    #[test]
    fn exhausted_passes_return_last_reading() {
        let consensus = StatusConsensus::new(2, 3);
        let mut reads = 0u8;
        let result = consensus.resolve(|| {
            reads += 1;
            Ok::<_, ()>(if reads % 2 == 1 { 1 } else { 2 })
        });
        assert_eq!(result, Ok(PlayStatus::Paused));
        assert_eq!(reads, 6);
    }

    #[test]
    fn read_errors_propagate() {
        let consensus = StatusConsensus::new(3, 8);
        let result = consensus.resolve(|| Err::<u8, _>("line gone"));
        assert_eq!(result, Err("line gone"));
    }

    #[test]
    fn status_with_consensus_over_the_wire() {
        let mut dev = device(DeviceConfig {
            status_checks: 3,
            ..DeviceConfig::default()
        });
        for value in [1, 2, 1, 1, 1, 1] {
            dev.transport_mut().reply_to(0x01, reply(0x01, &[value]));
        }
        assert_eq!(dev.status().unwrap(), PlayStatus::Playing);
        assert_eq!(dev.transport().count_sent(0x01), 6);
    }

    #[test]
    fn corrupted_status_reads_as_stopped() {
        let mut dev = device(DeviceConfig::default());
        dev.transport_mut().reply_to(0x01, vec![0x01, 0x03, 0x00, 0x00, 0x00, 0x04]);
        assert_eq!(dev.status().unwrap(), PlayStatus::Stopped);
        assert!(!dev.is_busy().unwrap());
    }

    #[test]
    fn is_busy_when_playing() {
        let mut dev = device(DeviceConfig::default());
        dev.transport_mut().reply_to(0x01, reply(0x01, &[0x01]));
        assert!(dev.is_busy().unwrap());
    }

    #[test]
    fn reset_without_answer_is_bounded() {
        let mut dev = device(DeviceConfig::default());
        dev.set_volume(5).unwrap();
        dev.set_equalizer(Equalizer::Jazz).unwrap();

        assert_eq!(dev.reset().unwrap(), Sources::NONE);
        assert_eq!(dev.transport().count_sent(0x09), 45);
        assert_eq!(dev.transport().count_sent(0x04), 5);
        assert_eq!(dev.settings(), CachedSettings::default());
    }

    #[test]
    fn reset_attempt_sequence() {
        let mut dev = device(DeviceConfig::default());
        dev.transport_mut().reply_to(0x09, reply(0x09, &[0b010]));

        assert_eq!(dev.reset().unwrap(), Sources(0b010));
        assert_eq!(
            dev.transport().sent_commands(),
            vec![0x10, 0x04, 0x13, 0x1A, 0x18, 0x1F, 0x10, 0x09]
        );
        let frames = dev.transport().sent_frames();
        assert_eq!(frames[2], vec![0xAA, 0x13, 0x01, 20, 0xD2]);
        assert_eq!(frames[4][3], 2);
        assert_eq!(frames[5][3..5], [0x00, 0x01]);
    }

    #[test]
    fn reset_retries_until_sources_reported() {
        let mut dev = device(DeviceConfig::default());
        for _ in 0..10 {
            dev.transport_mut().reply_to(0x09, reply(0x09, &[0x00]));
        }
        dev.transport_mut().reply_to(0x09, reply(0x09, &[0b100]));

        assert_eq!(dev.reset().unwrap(), Sources(0b100));
        assert_eq!(dev.transport().count_sent(0x09), 11);
        assert_eq!(dev.transport().count_sent(0x04), 2);
    }
}
