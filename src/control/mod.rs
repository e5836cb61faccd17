//! Cursor control orchestration
//!
//! # Data Flow
//!
//! ```text
//! Detector callback
//!   └─> DetectionHandler::on_detection(event)
//!       ├─> FrameRelay::push(rendered_frame)        → display loop
//!       └─> ControlLoop::process(hands)
//!           ├─> CursorMapper → SmoothingFilter → MouseSink::set_position
//!           └─> PinchGesture → MouseSink::press / release
//! ```
//!
//! The control loop is single-writer: only the detector callback touches
//! it. The relay is the only structure shared with the display loop.

mod control_loop;
mod handler;

pub use control_loop::{
    ControlConfig, ControlLoop, ControlLoopConfig, ControlStats, FrameOutcome, TrackingState,
};
pub use handler::{DetectionHandler, DetectionSink};
