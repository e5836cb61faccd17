//! Landmark data model
//!
//! Types exchanged with the external hand detector: normalized landmark
//! points, the fixed 21-point hand set, and per-frame detection events.

mod event;
mod hand;

pub use event::{DetectionEvent, RenderedFrame, RENDERED_FRAME_BPP};
pub use hand::{HandLandmark, HandLandmarkSet, LandmarkError, NormalizedPoint, LANDMARKS_PER_HAND};
