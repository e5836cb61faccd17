//! Frame Relay
//!
//! Bounded, drop-oldest hand-off of rendered frames from the detector
//! callback context to the display loop.
//!
//! # Overview
//!
//! ```text
//! Detector callback ──push()──> [ oldest … newest ] ──try_pop()──> Display loop
//!                                  capacity N
//! ```
//!
//! `push` never blocks and never rejects: when the relay is full the oldest
//! unconsumed frame is evicted to admit the new one. `try_pop` never blocks
//! either, so neither side can stall the other. A bounded capacity of 1–2
//! caps both memory and staleness when the display loop falls behind.

use parking_lot::Mutex;
use std::collections::VecDeque;
use thiserror::Error;
use tracing::trace;

/// Default relay capacity
pub const DEFAULT_RELAY_CAPACITY: usize = 2;

/// Relay construction errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayError {
    /// Capacity must be at least one frame
    #[error("Relay capacity must be at least 1")]
    ZeroCapacity,
}

/// Relay counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    /// Frames accepted by `push`
    pub frames_pushed: u64,
    /// Frames handed out by `try_pop`
    pub frames_popped: u64,
    /// Frames evicted unconsumed to make room
    pub frames_dropped: u64,
}

impl RelayStats {
    /// Fraction of pushed frames that were never consumed
    pub fn drop_rate(&self) -> f64 {
        if self.frames_pushed == 0 {
            0.0
        } else {
            self.frames_dropped as f64 / self.frames_pushed as f64
        }
    }
}

struct RelayInner<T> {
    queue: VecDeque<T>,
    stats: RelayStats,
}

/// Bounded drop-oldest frame buffer shared by one producer and one consumer
pub struct FrameRelay<T> {
    capacity: usize,
    inner: Mutex<RelayInner<T>>,
}

impl<T> FrameRelay<T> {
    /// Create a relay holding at most `capacity` frames
    pub fn new(capacity: usize) -> Result<Self, RelayError> {
        if capacity == 0 {
            return Err(RelayError::ZeroCapacity);
        }

        Ok(Self {
            capacity,
            inner: Mutex::new(RelayInner {
                queue: VecDeque::with_capacity(capacity),
                stats: RelayStats::default(),
            }),
        })
    }

    /// Accept a frame, evicting the oldest one if full.
    ///
    /// Returns the evicted frame, if any.
    pub fn push(&self, frame: T) -> Option<T> {
        let mut inner = self.inner.lock();

        let evicted = if inner.queue.len() >= self.capacity {
            inner.stats.frames_dropped += 1;
            inner.queue.pop_front()
        } else {
            None
        };

        inner.queue.push_back(frame);
        inner.stats.frames_pushed += 1;

        if evicted.is_some() {
            trace!(
                "Relay full (capacity {}), dropped oldest frame",
                self.capacity
            );
        }

        evicted
    }

    /// Take the oldest buffered frame, if any
    pub fn try_pop(&self) -> Option<T> {
        let mut inner = self.inner.lock();
        let frame = inner.queue.pop_front();
        if frame.is_some() {
            inner.stats.frames_popped += 1;
        }
        frame
    }

    /// Take the newest frame and discard anything older
    pub fn pop_latest(&self) -> Option<T> {
        let mut inner = self.inner.lock();
        let frame = inner.queue.pop_back();
        if frame.is_some() {
            inner.stats.frames_popped += 1;
            let stale = inner.queue.len() as u64;
            inner.stats.frames_dropped += stale;
            inner.queue.clear();
        }
        frame
    }

    /// Maximum number of buffered frames
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of frames currently buffered
    pub fn len(&self) -> usize {
        self.inner.lock().queue.len()
    }

    /// True when no frame is waiting
    pub fn is_empty(&self) -> bool {
        self.inner.lock().queue.is_empty()
    }

    /// Snapshot of the relay counters
    pub fn stats(&self) -> RelayStats {
        self.inner.lock().stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_capacity_rejected() {
        assert_eq!(
            FrameRelay::<u32>::new(0).err(),
            Some(RelayError::ZeroCapacity)
        );
    }

    #[test]
    fn test_fifo_within_capacity() {
        let relay = FrameRelay::new(3).unwrap();
        assert!(relay.push(1).is_none());
        assert!(relay.push(2).is_none());

        assert_eq!(relay.try_pop(), Some(1));
        assert_eq!(relay.try_pop(), Some(2));
        assert_eq!(relay.try_pop(), None);
    }

    #[test]
    fn test_drop_oldest_keeps_most_recent() {
        let relay = FrameRelay::new(2).unwrap();
        for frame in 0..7 {
            relay.push(frame);
        }

        assert_eq!(relay.len(), 2);
        assert_eq!(relay.try_pop(), Some(5));
        assert_eq!(relay.try_pop(), Some(6));
        assert!(relay.is_empty());

        let stats = relay.stats();
        assert_eq!(stats.frames_pushed, 7);
        assert_eq!(stats.frames_dropped, 5);
        assert_eq!(stats.frames_popped, 2);
    }

    #[test]
    fn test_push_returns_evicted_frame() {
        let relay = FrameRelay::new(1).unwrap();
        assert_eq!(relay.push("a"), None);
        assert_eq!(relay.push("b"), Some("a"));
        assert_eq!(relay.try_pop(), Some("b"));
    }

    #[test]
    fn test_pop_latest_discards_backlog() {
        let relay = FrameRelay::new(4).unwrap();
        for frame in 0..4 {
            relay.push(frame);
        }

        assert_eq!(relay.pop_latest(), Some(3));
        assert!(relay.is_empty());
        assert_eq!(relay.stats().frames_dropped, 3);
    }

    #[test]
    fn test_drop_rate() {
        let relay = FrameRelay::new(1).unwrap();
        assert_eq!(relay.stats().drop_rate(), 0.0);
        relay.push(1);
        relay.push(2);
        assert_eq!(relay.stats().drop_rate(), 0.5);
    }
}
