//! Cursor positioning
//!
//! Converts the control landmark of the tracked hand into a stabilized
//! absolute screen position.
//!
//! # Architecture
//!
//! ```text
//! NormalizedPoint (camera frame)
//!   └─> CursorMapper       crop to active region, scale to screen
//!       └─> SmoothingFilter  EMA with velocity-adaptive α
//!           └─> ScreenPosition (clamped integer pixels)
//! ```
//!
//! Filter state is held in [`CursorState`] and [`VelocityState`], owned by
//! the control loop and passed in by reference on every frame.

mod mapper;
mod smoothing;

pub use mapper::{ActiveRegion, CursorMapper, MappingError, ScreenGeometry};
pub use smoothing::{
    CursorState, ScreenPosition, SmoothingConfig, SmoothingFilter, SmoothingMode, VelocityState,
};
