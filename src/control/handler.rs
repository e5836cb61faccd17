//! Detection callback handling
//!
//! [`DetectionSink`] is the single capability the detector is given. The
//! production implementation, [`DetectionHandler`], relays the rendered frame
//! to the display loop and then drives the control loop.

use std::sync::Arc;
use tracing::{trace, warn};

use super::control_loop::{ControlLoop, FrameOutcome};
use crate::input::MouseSink;
use crate::landmarks::{DetectionEvent, RenderedFrame};
use crate::relay::FrameRelay;

/// Receiver of detector results.
///
/// The detector calls this from its own callback context, one event at a
/// time, never re-entrantly.
pub trait DetectionSink: Send {
    /// Consume one detection event
    fn on_detection(&mut self, event: DetectionEvent);
}

/// Relays frames and drives cursor control for each detection
pub struct DetectionHandler<S: MouseSink> {
    relay: Arc<FrameRelay<RenderedFrame>>,
    control: ControlLoop<S>,
    last_timestamp_ms: Option<u64>,
    out_of_order: u64,
    last_outcome: Option<FrameOutcome>,
}

impl<S: MouseSink> DetectionHandler<S> {
    /// Create a handler feeding `relay` and `control`
    pub fn new(relay: Arc<FrameRelay<RenderedFrame>>, control: ControlLoop<S>) -> Self {
        Self {
            relay,
            control,
            last_timestamp_ms: None,
            out_of_order: 0,
            last_outcome: None,
        }
    }

    /// The control loop
    pub fn control(&self) -> &ControlLoop<S> {
        &self.control
    }

    /// Outcome of the most recent accepted event
    pub fn last_outcome(&self) -> Option<FrameOutcome> {
        self.last_outcome
    }

    /// Events ignored because their timestamp went backwards
    pub fn out_of_order_events(&self) -> u64 {
        self.out_of_order
    }

    /// Shut the control loop down, releasing any held button
    pub fn shutdown(&mut self) -> bool {
        self.control.shutdown()
    }
}

impl<S: MouseSink> DetectionSink for DetectionHandler<S> {
    fn on_detection(&mut self, event: DetectionEvent) {
        let DetectionEvent {
            hands,
            rendered_frame,
            timestamp_ms,
        } = event;

        self.relay.push(rendered_frame);

        if let Some(last) = self.last_timestamp_ms {
            if timestamp_ms < last {
                self.out_of_order += 1;
                warn!(
                    "Detection at {}ms arrived after {}ms, ignoring for cursor control",
                    timestamp_ms, last
                );
                return;
            }
        }
        self.last_timestamp_ms = Some(timestamp_ms);

        let outcome = self.control.process(&hands);
        trace!("Detection {}ms: {:?}", timestamp_ms, outcome);
        self.last_outcome = Some(outcome);
    }
}
