use jqserial_frame::FrameConfig;
use serde::{Deserialize, Serialize};

/// Configuration for a [`Jq8400`](crate::Jq8400).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Timing of each request/response exchange.
    pub frame: FrameConfig,
    /// Status reads that must agree before playing/paused is believed.
    /// One or zero disables the consensus check. Default: 1.
    pub status_checks: u8,
    /// Consensus passes before giving up on agreement. Default: 8.
    pub status_max_passes: u32,
    /// Full reset sequences attempted. Default: 5.
    pub reset_attempts: u8,
    /// Source polls per reset attempt. Default: 9.
    pub reset_polls: u8,
    /// Pause after each stop command during reset. Default: 1.
    pub reset_settle_ms: u32,
    /// Pause between source polls that came back empty. Default: 1.
    pub reset_poll_interval_ms: u32,
    /// Buffer size for the current file name. Default: 32.
    pub file_name_capacity: usize,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            frame: FrameConfig::default(),
            status_checks: 1,
            status_max_passes: 8,
            reset_attempts: 5,
            reset_polls: 9,
            reset_settle_ms: 1,
            reset_poll_interval_ms: 1,
            file_name_capacity: 32,
        }
    }
}
