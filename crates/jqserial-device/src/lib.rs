//! Transaction engine and command dispatcher for JQ8400 serial MP3 modules.
//!
//! This is the "just works" layer. [`Jq8400`] turns operations such as
//! play, seek, set volume or query status into framed transactions, keeps
//! a local copy of the settings the module cannot report, and layers the
//! retry/consensus policies needed to get reliable answers out of a noisy
//! half-duplex line.

pub mod command;
pub mod config;
pub mod device;
pub mod error;
pub mod path;
pub mod recovery;
pub mod state;
pub mod transaction;
pub mod types;

pub use command::{Arity, Command, ResponseShape};
pub use config::DeviceConfig;
pub use device::Jq8400;
pub use error::{DeviceError, Result};
pub use recovery::StatusConsensus;
pub use state::{CachedSettings, MAX_VOLUME};
pub use transaction::TransactionEngine;
pub use types::{Equalizer, LoopMode, PlayStatus, Source, Sources};
