//! Byte-level transport abstraction for JQ8400-family serial modules.
//!
//! The protocol engine needs exactly four primitives from the physical
//! channel: write a byte, ask how many bytes are waiting, read a byte, and a
//! monotonic millisecond clock. This crate defines those primitives as the
//! [`Transport`] and [`Clock`] traits and provides:
//! - [`wait_until_available`], the only blocking wait in the stack
//! - [`SerialTransport`], backed by the `serialport` crate (feature `serial`)
//! - [`mock::MockTransport`], a scripted transport on virtual time (feature `mock`)
//!
//! This is the lowest layer of jqserial. Everything else builds on top of it.

pub mod error;
pub mod traits;
pub mod waiter;

#[cfg(feature = "serial")]
pub mod serial;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::{Result, TransportError};
pub use traits::{Clock, MonotonicClock, Transport};
pub use waiter::{elapsed_ms, wait_until_available};

#[cfg(feature = "serial")]
pub use serial::{list_ports, PortInfo, SerialTransport, DEFAULT_BAUD_RATE};
