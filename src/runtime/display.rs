//! Display loop
//!
//! Polls the frame relay at a fixed rate and hands whatever frame is
//! available to a [`FrameDisplay`]. An empty relay is not an error; the
//! loop simply waits for the next tick.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use crate::landmarks::RenderedFrame;
use crate::relay::FrameRelay;

/// Display configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DisplayConfig {
    /// Relay polls per second
    #[serde(default = "default_poll_fps")]
    pub poll_fps: u32,
}

fn default_poll_fps() -> u32 {
    60
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            poll_fps: default_poll_fps(),
        }
    }
}

impl DisplayConfig {
    /// Interval between polls; a zero rate is treated as 1 fps
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(1) / self.poll_fps.max(1)
    }
}

/// Consumer of relayed frames
pub trait FrameDisplay: Send {
    /// Present one frame
    fn show(&mut self, frame: &RenderedFrame);
}

/// Headless display that only tracks what it was given
#[derive(Debug, Default)]
pub struct FrameLogDisplay {
    frames_shown: u64,
    last_timestamp_ms: Option<u64>,
}

impl FrameLogDisplay {
    /// Create an empty display
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames presented so far
    pub fn frames_shown(&self) -> u64 {
        self.frames_shown
    }

    /// Timestamp of the last frame presented
    pub fn last_timestamp_ms(&self) -> Option<u64> {
        self.last_timestamp_ms
    }
}

impl FrameDisplay for FrameLogDisplay {
    fn show(&mut self, frame: &RenderedFrame) {
        self.frames_shown += 1;
        self.last_timestamp_ms = Some(frame.timestamp_ms);
        trace!(
            "Frame {}ms ({}x{}, {} bytes)",
            frame.timestamp_ms,
            frame.width,
            frame.height,
            frame.data.len()
        );
    }
}

/// Display loop counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayStats {
    /// Poll ticks
    pub polls: u64,
    /// Frames shown
    pub frames_shown: u64,
    /// Ticks that found the relay empty
    pub empty_polls: u64,
}

/// Fixed-rate relay consumer
pub struct DisplayLoop {
    relay: Arc<FrameRelay<RenderedFrame>>,
    poll_interval: Duration,
}

impl DisplayLoop {
    /// Create a loop polling `relay` per `config`
    pub fn new(relay: Arc<FrameRelay<RenderedFrame>>, config: &DisplayConfig) -> Self {
        Self {
            relay,
            poll_interval: config.poll_interval(),
        }
    }

    /// Poll interval in use
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Run until `cancel` fires
    pub async fn run<D: FrameDisplay + ?Sized>(
        &self,
        display: &mut D,
        cancel: CancellationToken,
    ) -> DisplayStats {
        let mut stats = DisplayStats::default();
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("Display loop started ({:?} poll interval)", self.poll_interval);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    stats.polls += 1;
                    match self.relay.try_pop() {
                        Some(frame) => {
                            display.show(&frame);
                            stats.frames_shown += 1;
                        }
                        None => stats.empty_polls += 1,
                    }
                }
            }
        }

        debug!("Display loop stopped: {:?}", stats);
        stats
    }
}
