//! Hand gestures
//!
//! Only one gesture is recognised: a pinch between two fingertips, mapped to
//! holding a mouse button.

mod pinch;

pub use pinch::{PinchConfig, PinchEvent, PinchGesture, PinchState};
