//! # landmark-cursor
//!
//! Hand-landmark cursor control: turns per-frame hand detections into
//! pointer moves and pinch-to-click button events.
//!
//! # Architecture
//!
//! ```text
//! landmark-cursor
//!   ├─> Detector (external, or a replayed recording)
//!   │     └─> DetectionHandler (one call per processed frame)
//!   │           ├─> FrameRelay ──> DisplayLoop
//!   │           └─> ControlLoop
//!   │                 ├─> CursorMapper → SmoothingFilter ──> MouseSink::set_position
//!   │                 └─> PinchGesture ────────────────────> MouseSink::press/release
//!   └─> ScreenGeometryProvider (queried once at startup)
//! ```
//!
//! # Threading
//!
//! The detector callback and the display loop run in different execution
//! contexts. The [`relay::FrameRelay`] is the only state they share; all
//! control state is owned by the [`control::ControlLoop`] and touched only
//! from the detector callback.
//!
//! # Example
//!
//! ```rust
//! use landmark_cursor::control::{ControlLoop, ControlLoopConfig, TrackingState};
//! use landmark_cursor::cursor::ScreenGeometry;
//! use landmark_cursor::input::{MouseAction, RecordingMouseSink};
//! use landmark_cursor::landmarks::{HandLandmarkSet, NormalizedPoint};
//!
//! let sink = RecordingMouseSink::new();
//! let mut control = ControlLoop::with_geometry(
//!     ControlLoopConfig::default(),
//!     ScreenGeometry::new(1280, 720).ok(),
//!     Some(sink.clone()),
//! );
//!
//! let hand = HandLandmarkSet::uniform(NormalizedPoint::new(0.5, 0.5, 0.0));
//! let outcome = control.process(&[hand]);
//!
//! assert_eq!(outcome.state, TrackingState::Tracking);
//! assert!(matches!(sink.actions()[0], MouseAction::Move { .. }));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Configuration loading and validation
pub mod config;

/// Detection handling and the cursor control state machine
pub mod control;

/// Region mapping and smoothing
pub mod cursor;

/// Pinch gesture detection
pub mod gesture;

/// Mouse and screen capabilities
pub mod input;

/// Landmark and detection event types
pub mod landmarks;

/// Drop-oldest frame relay
pub mod relay;

/// Replay detector and display loop
pub mod runtime;

/// Utility functions
pub mod utils;
