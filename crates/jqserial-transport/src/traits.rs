use std::time::Instant;

use crate::error::Result;

/// A half-duplex byte channel with availability polling.
///
/// Implementations must not block in [`available`](Transport::available).
/// [`read`](Transport::read) is only called after `available` reported at
/// least one byte.
pub trait Transport {
    /// Write a single byte.
    fn write(&mut self, byte: u8) -> Result<()>;

    /// Write a run of bytes in order.
    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        for &byte in bytes {
            self.write(byte)?;
        }
        Ok(())
    }

    /// Push buffered output onto the wire.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    /// Number of received bytes ready to be read.
    fn available(&mut self) -> Result<usize>;

    /// Read one received byte.
    fn read(&mut self) -> Result<u8>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn write(&mut self, byte: u8) -> Result<()> {
        (**self).write(byte)
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write_all(bytes)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn available(&mut self) -> Result<usize> {
        (**self).available()
    }

    fn read(&mut self) -> Result<u8> {
        (**self).read()
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write(&mut self, byte: u8) -> Result<()> {
        (**self).write(byte)
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write_all(bytes)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn available(&mut self) -> Result<usize> {
        (**self).available()
    }

    fn read(&mut self) -> Result<u8> {
        (**self).read()
    }
}

/// A monotonic millisecond counter plus a fixed delay primitive.
///
/// `now_ms` is a free-running `u32` that wraps after ~49.7 days; callers
/// must compare instants with wrapping subtraction (see
/// [`elapsed_ms`](crate::elapsed_ms)).
pub trait Clock {
    /// Milliseconds since an arbitrary origin, wrapping on overflow.
    fn now_ms(&self) -> u32;

    /// Block for a fixed number of milliseconds.
    fn delay_ms(&self, ms: u32);
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }

    fn delay_ms(&self, ms: u32) {
        (**self).delay_ms(ms)
    }
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Create a clock whose origin is now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u32 {
        // Truncation is the wraparound.
        self.origin.elapsed().as_millis() as u32
    }

    fn delay_ms(&self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_clock_advances_across_delay() {
        let clock = MonotonicClock::new();
        let start = clock.now_ms();
        clock.delay_ms(5);
        assert!(clock.now_ms().wrapping_sub(start) >= 5);
    }

    #[test]
    fn boxed_transport_forwards_to_inner() {
        let clock = crate::mock::MockClock::new();
        let mut boxed: Box<dyn Transport> =
            Box::new(crate::mock::MockTransport::new(clock.clone()));
        boxed.write_all(&[0xAA, 0x02, 0x00, 0xAC]).unwrap();
        assert_eq!(boxed.available().unwrap(), 0);
    }
}
