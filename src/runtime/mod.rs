//! Runtime wiring
//!
//! The two execution contexts of the pipeline:
//!
//! - the detector, which calls a [`DetectionSink`](crate::control::DetectionSink)
//!   once per processed frame ([`ReplayDetector`] replays a recording)
//! - the [`DisplayLoop`], which polls the frame relay on the async runtime

mod display;
mod replay;

pub use display::{DisplayConfig, DisplayLoop, DisplayStats, FrameDisplay, FrameLogDisplay};
pub use replay::{
    Detector, RecordedDetection, ReplayDetector, ReplayError, ReplaySummary, MAX_REPLAY_GAP,
};
