//! Scripted transport for deterministic testing of the protocol engine.
//!
//! [`MockTransport`] plays the device side of the wire on a shared
//! [`MockClock`]. Written bytes are grouped into request frames using the
//! length byte at offset 2; when a frame completes, the next scripted reply
//! for its command byte is scheduled on the inbound queue. Every empty
//! `available()` poll advances virtual time by one millisecond, so timeout
//! paths run instantly and land on exact, assertable instants.
//!
//! # Example
//!
//! ```
//! use jqserial_transport::mock::{MockClock, MockTransport};
//! use jqserial_transport::Transport;
//!
//! let clock = MockClock::new();
//! let mut mock = MockTransport::new(clock.clone());
//! // Status request (0x01) is answered with "playing".
//! mock.reply_to(0x01, [0xAA, 0x01, 0x01, 0x01, 0xAD]);
//!
//! mock.write_all(&[0xAA, 0x01, 0x00, 0xAB]).unwrap();
//! assert_eq!(mock.available().unwrap(), 5);
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::error::{Result, TransportError};
use crate::traits::{Clock, Transport};

/// Virtual millisecond clock shared between a test and its transport.
#[derive(Debug, Clone, Default)]
pub struct MockClock {
    now: Arc<AtomicU32>,
}

impl MockClock {
    /// A clock starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// A clock starting at `ms`.
    pub fn starting_at(ms: u32) -> Self {
        Self {
            now: Arc::new(AtomicU32::new(ms)),
        }
    }

    /// Move virtual time forward, wrapping on overflow.
    pub fn advance(&self, ms: u32) {
        let now = self.now.load(Ordering::SeqCst);
        self.now.store(now.wrapping_add(ms), Ordering::SeqCst);
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u32 {
        self.now.load(Ordering::SeqCst)
    }

    fn delay_ms(&self, ms: u32) {
        self.advance(ms);
    }
}

/// One scripted device reply.
#[derive(Debug, Clone, Default)]
pub struct Reply {
    bytes: Vec<u8>,
    delay_ms: u32,
    stall: Option<(usize, u32)>,
}

impl Reply {
    /// A reply whose bytes are all ready as soon as the request completes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            ..Self::default()
        }
    }

    /// Delay the whole reply by `ms` after the request completes.
    pub fn after(mut self, ms: u32) -> Self {
        self.delay_ms = ms;
        self
    }

    /// Hold back bytes from index `index` onward by an extra `ms`.
    pub fn stall_at(mut self, index: usize, ms: u32) -> Self {
        self.stall = Some((index, ms));
        self
    }
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    ready_at: u32,
    byte: u8,
}

/// A scripted [`Transport`] for testing protocol engines without hardware.
#[derive(Debug)]
pub struct MockTransport {
    clock: MockClock,
    inbound: VecDeque<Pending>,
    replies: HashMap<u8, VecDeque<Reply>>,
    fallback: HashMap<u8, Reply>,
    partial: Vec<u8>,
    sent: Vec<Vec<u8>>,
    polls: usize,
}

impl MockTransport {
    /// Create a mock with no scripted replies; every request is met with silence.
    pub fn new(clock: MockClock) -> Self {
        Self {
            clock,
            inbound: VecDeque::new(),
            replies: HashMap::new(),
            fallback: HashMap::new(),
            partial: Vec::new(),
            sent: Vec::new(),
            polls: 0,
        }
    }

    /// The clock this transport advances.
    pub fn clock(&self) -> MockClock {
        self.clock.clone()
    }

    /// Queue a one-shot reply for the next request carrying `command`.
    pub fn reply_to(&mut self, command: u8, bytes: impl Into<Vec<u8>>) {
        self.reply_with(command, Reply::new(bytes));
    }

    /// Queue a one-shot [`Reply`] for the next request carrying `command`.
    pub fn reply_with(&mut self, command: u8, reply: Reply) {
        self.replies.entry(command).or_default().push_back(reply);
    }

    /// Reply to `command` with `bytes` whenever no one-shot reply is queued.
    pub fn always_reply(&mut self, command: u8, bytes: impl Into<Vec<u8>>) {
        self.fallback.insert(command, Reply::new(bytes));
    }

    /// Make bytes available right now, unsolicited.
    pub fn inject(&mut self, bytes: &[u8]) {
        self.inject_after(0, bytes);
    }

    /// Make bytes available `ms` from now, unsolicited.
    pub fn inject_after(&mut self, ms: u32, bytes: &[u8]) {
        let ready_at = self.clock.now_ms().wrapping_add(ms);
        self.inbound
            .extend(bytes.iter().map(|&byte| Pending { ready_at, byte }));
    }

    /// Every complete request frame written so far, in order.
    pub fn sent_frames(&self) -> &[Vec<u8>] {
        &self.sent
    }

    /// Command bytes of every complete request frame, in order.
    pub fn sent_commands(&self) -> Vec<u8> {
        self.sent.iter().map(|frame| frame[1]).collect()
    }

    /// How many complete requests carried `command`.
    pub fn count_sent(&self, command: u8) -> usize {
        self.sent.iter().filter(|frame| frame[1] == command).count()
    }

    /// Forget recorded requests.
    pub fn clear_sent(&mut self) {
        self.sent.clear();
    }

    /// Inbound bytes not yet read, ready or not.
    pub fn pending_inbound(&self) -> usize {
        self.inbound.len()
    }

    /// Number of `available()` calls made so far.
    pub fn polls(&self) -> usize {
        self.polls
    }

    fn ready_count(&self) -> usize {
        let now = self.clock.now_ms();
        self.inbound
            .iter()
            .take_while(|pending| is_due(pending.ready_at, now))
            .count()
    }

    fn complete_request(&mut self) {
        let frame = std::mem::take(&mut self.partial);
        let command = frame[1];
        self.sent.push(frame);

        let reply = self
            .replies
            .get_mut(&command)
            .and_then(VecDeque::pop_front)
            .or_else(|| self.fallback.get(&command).cloned());

        if let Some(reply) = reply {
            let start = self.clock.now_ms().wrapping_add(reply.delay_ms);
            for (index, &byte) in reply.bytes.iter().enumerate() {
                let stall = match reply.stall {
                    Some((at, ms)) if index >= at => ms,
                    _ => 0,
                };
                self.inbound.push_back(Pending {
                    ready_at: start.wrapping_add(stall),
                    byte,
                });
            }
        }
    }
}

fn is_due(ready_at: u32, now: u32) -> bool {
    (now.wrapping_sub(ready_at) as i32) >= 0
}

impl Transport for MockTransport {
    fn write(&mut self, byte: u8) -> Result<()> {
        self.partial.push(byte);
        if self.partial.len() >= 3 && self.partial.len() == 4 + usize::from(self.partial[2]) {
            self.complete_request();
        }
        Ok(())
    }

    fn available(&mut self) -> Result<usize> {
        self.polls += 1;
        let ready = self.ready_count();
        if ready == 0 {
            self.clock.advance(1);
        }
        Ok(ready)
    }

    fn read(&mut self) -> Result<u8> {
        let now = self.clock.now_ms();
        match self.inbound.front() {
            Some(pending) if is_due(pending.ready_at, now) => {
                let byte = pending.byte;
                self.inbound.pop_front();
                Ok(byte)
            }
            _ => Err(TransportError::Io(std::io::Error::from(
                std::io::ErrorKind::WouldBlock,
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_completion_schedules_reply() {
        let clock = MockClock::new();
        let mut mock = MockTransport::new(clock);
        mock.reply_to(0x0C, [0xAA, 0x0C, 0x02, 0x00, 0x05, 0xBF]);

        mock.write_all(&[0xAA, 0x0C, 0x00]).unwrap();
        assert!(mock.sent_frames().is_empty());
        mock.write(0xB6).unwrap();

        assert_eq!(mock.sent_commands(), vec![0x0C]);
        assert_eq!(mock.available().unwrap(), 6);
        assert_eq!(mock.read().unwrap(), 0xAA);
        assert_eq!(mock.pending_inbound(), 5);
    }

    #[test]
    fn one_shot_replies_fall_back_to_always_reply() {
        let mut mock = MockTransport::new(MockClock::new());
        mock.reply_to(0x01, [0x01]);
        mock.always_reply(0x01, [0x02]);

        for _ in 0..3 {
            mock.write_all(&[0xAA, 0x01, 0x00, 0xAB]).unwrap();
        }
        let received: Vec<u8> = (0..3).map(|_| mock.read().unwrap()).collect();
        assert_eq!(received, vec![0x01, 0x02, 0x02]);
        assert_eq!(mock.count_sent(0x01), 3);
    }

    #[test]
    fn stalled_bytes_are_not_ready_early() {
        let clock = MockClock::new();
        let mut mock = MockTransport::new(clock.clone());
        mock.reply_with(0x01, Reply::new([1, 2, 3, 4]).stall_at(2, 200));

        mock.write_all(&[0xAA, 0x01, 0x00, 0xAB]).unwrap();
        assert_eq!(mock.available().unwrap(), 2);
        mock.read().unwrap();
        mock.read().unwrap();
        assert!(mock.read().is_err());

        clock.advance(200);
        assert_eq!(mock.available().unwrap(), 2);
    }

    #[test]
    fn empty_poll_advances_clock() {
        let clock = MockClock::new();
        let mut mock = MockTransport::new(clock.clone());
        assert_eq!(mock.available().unwrap(), 0);
        assert_eq!(mock.available().unwrap(), 0);
        assert_eq!(clock.now_ms(), 2);
    }
}
