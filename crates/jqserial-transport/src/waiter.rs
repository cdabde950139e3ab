use tracing::trace;

use crate::error::Result;
use crate::traits::{Clock, Transport};

/// Milliseconds from `since` to `now` on a wrapping `u32` clock.
pub fn elapsed_ms(since: u32, now: u32) -> u32 {
    now.wrapping_sub(since)
}

/// Spin until the transport has at least one byte ready, or `max_wait_ms`
/// has elapsed.
///
/// Returns `Ok(true)` when data became available. The transport is always
/// polled at least once, so `max_wait_ms == 0` is a non-blocking check.
/// This never sleeps; it polls `available()` against the clock.
pub fn wait_until_available<T, C>(transport: &mut T, clock: &C, max_wait_ms: u32) -> Result<bool>
where
    T: Transport + ?Sized,
    C: Clock + ?Sized,
{
    let start = clock.now_ms();
    loop {
        if transport.available()? > 0 {
            return Ok(true);
        }
        if elapsed_ms(start, clock.now_ms()) >= max_wait_ms {
            trace!(max_wait_ms, "no data before deadline");
            return Ok(false);
        }
    }
}
