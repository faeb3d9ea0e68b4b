//! Pull-side input sources
//!
//! Engines only ever see a read function: `FnMut() -> Option<Sample>`.
//! It must return immediately, with `None` when nothing new arrived.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use tracing::debug;

use crate::core::clock::{Clock, MonotonicClock};
use crate::types::{Sample, Token};

/// Bounded key buffer: push side for event handlers, pull side for engines
#[derive(Debug, Clone)]
pub struct KeyBuffer {
    tx: Sender<Sample>,
    rx: Receiver<Sample>,
}

/// Cloneable push handle for a [`KeyBuffer`]
#[derive(Debug, Clone)]
pub struct KeySender {
    tx: Sender<Sample>,
}

impl KeyBuffer {
    /// Create buffer holding at most `capacity` pending samples
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity.max(1));
        Self { tx, rx }
    }

    /// Handle for the producer side
    pub fn sender(&self) -> KeySender {
        KeySender { tx: self.tx.clone() }
    }

    /// Non-blocking read of the oldest pending sample
    pub fn read(&self) -> Option<Sample> {
        self.rx.try_recv().ok()
    }

    /// Drop everything pending (e.g. presses made before the window opened)
    pub fn clear(&self) -> usize {
        self.rx.try_iter().count()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl KeySender {
    /// Stamp `token` with the process clock and enqueue it
    pub fn push(&self, token: Token) -> bool {
        self.push_at(token, MonotonicClock::seconds())
    }

    /// Enqueue with an explicit timestamp. Returns false if the buffer
    /// was full or closed; the press is dropped.
    pub fn push_at(&self, token: Token, timestamp: f64) -> bool {
        match self.tx.try_send(Sample::new(token, timestamp)) {
            Ok(()) => true,
            Err(TrySendError::Full(s)) => {
                debug!(token = %s.token, "key buffer full, press dropped");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Replays `(offset_s, token)` events relative to the first poll.
///
/// Each poll yields at most one event whose scheduled time has passed,
/// stamped with its scheduled time.
#[derive(Debug)]
pub struct ScriptedSource<C: Clock> {
    clock: C,
    events: Vec<(f64, Token)>,
    cursor: usize,
    armed_at: Option<f64>,
}

impl<C: Clock> ScriptedSource<C> {
    pub fn new(clock: C, mut events: Vec<(f64, Token)>) -> Self {
        events.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self {
            clock,
            events,
            cursor: 0,
            armed_at: None,
        }
    }

    /// Fix the script origin explicitly instead of at first poll
    pub fn arm_at(&mut self, t0: f64) {
        self.armed_at = Some(t0);
    }

    pub fn read(&mut self) -> Option<Sample> {
        let now = self.clock.now();
        let t0 = *self.armed_at.get_or_insert(now);
        let (offset, token) = *self.events.get(self.cursor)?;
        let due = t0 + offset;
        if due <= now {
            self.cursor += 1;
            Some(Sample::new(token, due))
        } else {
            None
        }
    }

    /// Events not yet delivered
    pub fn remaining(&self) -> usize {
        self.events.len() - self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::SimulatedClock;
    use std::time::Duration;

    #[test]
    fn test_key_buffer_fifo() {
        let buf = KeyBuffer::new(8);
        let tx = buf.sender();
        assert!(tx.push_at(Token::Rock, 1.0));
        assert!(tx.push_at(Token::Paper, 2.0));

        assert_eq!(buf.read(), Some(Sample::new(Token::Rock, 1.0)));
        assert_eq!(buf.read(), Some(Sample::new(Token::Paper, 2.0)));
        assert_eq!(buf.read(), None);
    }

    #[test]
    fn test_key_buffer_drops_when_full() {
        let buf = KeyBuffer::new(2);
        let tx = buf.sender();
        assert!(tx.push_at(Token::Rock, 0.0));
        assert!(tx.push_at(Token::Rock, 0.1));
        assert!(!tx.push_at(Token::Paper, 0.2));
        assert_eq!(buf.len(), 2);
    }

    #[test]
    fn test_key_buffer_clear() {
        let buf = KeyBuffer::new(4);
        let tx = buf.sender();
        tx.push(Token::Scissors);
        tx.push(Token::Scissors);
        assert_eq!(buf.clear(), 2);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_key_buffer_push_from_thread() {
        let buf = KeyBuffer::new(16);
        let tx = buf.sender();
        std::thread::spawn(move || {
            for _ in 0..5 {
                tx.push(Token::Paper);
            }
        })
        .join()
        .unwrap();
        assert_eq!(buf.clear(), 5);
    }

    #[test]
    fn test_scripted_source_releases_on_schedule() {
        let clock = SimulatedClock::new();
        let mut src = ScriptedSource::new(&clock, vec![(0.5, Token::Paper), (0.1, Token::Rock)]);

        assert_eq!(src.read(), None); // arms at t=0
        clock.advance(Duration::from_millis(100));
        assert_eq!(src.read().map(|s| s.token), Some(Token::Rock));
        assert_eq!(src.read(), None);
        clock.advance(Duration::from_millis(400));
        let s = src.read().unwrap();
        assert_eq!(s.token, Token::Paper);
        assert!((s.timestamp - 0.5).abs() < 1e-9);
        assert_eq!(src.remaining(), 0);
    }
}
