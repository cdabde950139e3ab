//! Serial control of JQ8400 MP3 player modules.
//!
//! jqserial drives the JQ8400 family over its UART protocol: checksummed
//! command frames, byte-at-a-time response decoding with bounded waits, and
//! the retry policies needed to get reliable answers from the module.
//!
//! # Crate Structure
//!
//! - [`transport`]: Byte transport and clock traits, serial port backend
//! - [`frame`]: Frame encoding and incremental response decoding
//! - [`device`]: Transaction engine and the [`device::Jq8400`] command dispatcher
//!
//! ```no_run
//! # #[cfg(feature = "serial")]
//! # fn main() -> Result<(), jqserial::device::DeviceError> {
//! use jqserial::device::Jq8400;
//!
//! let mut player = Jq8400::open("/dev/ttyUSB0", 9600)?;
//! player.set_volume(18)?;
//! player.play_file_by_index(1)?;
//! println!("{}", player.status()?);
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "serial"))]
//! # fn main() {}
//! ```

/// Re-export transport types.
pub mod transport {
    pub use jqserial_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use jqserial_frame::*;
}

/// Re-export device types.
pub mod device {
    pub use jqserial_device::*;
}
