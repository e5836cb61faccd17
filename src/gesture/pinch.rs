//! Pinch-to-click detection
//!
//! Edge-triggered: the button sink hears exactly one press when two
//! fingertips come within the threshold and one release when they separate,
//! no matter how many frames the pinch is held.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::input::MouseButton;
use crate::landmarks::{HandLandmark, HandLandmarkSet, NormalizedPoint};

/// Pinch gesture configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PinchConfig {
    /// Enable pinch-to-click
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// The two landmarks whose distance is measured
    #[serde(default = "default_landmarks")]
    pub landmarks: (HandLandmark, HandLandmark),

    /// Normalized distance below which the fingers count as pinched
    #[serde(default = "default_distance_threshold")]
    pub distance_threshold: f64,

    /// Button held while pinched
    #[serde(default)]
    pub button: MouseButton,
}

fn default_enabled() -> bool {
    true
}
fn default_landmarks() -> (HandLandmark, HandLandmark) {
    (HandLandmark::ThumbTip, HandLandmark::IndexFingerTip)
}
fn default_distance_threshold() -> f64 {
    0.08
}

impl Default for PinchConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            landmarks: default_landmarks(),
            distance_threshold: default_distance_threshold(),
            button: MouseButton::default(),
        }
    }
}

/// Button transition produced by one gesture update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinchEvent {
    /// Fingers just closed
    Pressed,
    /// Fingers just opened
    Released,
    /// No transition this frame
    Unchanged,
}

/// Whether the pinch button is logically held down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PinchState {
    is_held: bool,
}

impl PinchState {
    /// Button is up
    pub fn new() -> Self {
        Self::default()
    }

    /// True while the button is held
    pub fn is_held(&self) -> bool {
        self.is_held
    }

    /// Drop the hold; returns `Released` only if the button was down
    pub fn force_release(&mut self) -> PinchEvent {
        if self.is_held {
            self.is_held = false;
            PinchEvent::Released
        } else {
            PinchEvent::Unchanged
        }
    }
}

/// Pinch detector over two configured landmarks
#[derive(Debug, Clone, Copy)]
pub struct PinchGesture {
    landmarks: (HandLandmark, HandLandmark),
    threshold: f64,
}

impl PinchGesture {
    /// Create a detector for the given landmark pair and threshold
    pub fn new(landmarks: (HandLandmark, HandLandmark), threshold: f64) -> Self {
        Self {
            landmarks,
            threshold,
        }
    }

    /// Detector matching a pinch configuration
    pub fn from_config(config: &PinchConfig) -> Self {
        Self::new(config.landmarks, config.distance_threshold)
    }

    /// Distance threshold
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Update from a full hand
    pub fn update(&self, hand: &HandLandmarkSet, state: &mut PinchState) -> PinchEvent {
        let a = hand.get(self.landmarks.0);
        let b = hand.get(self.landmarks.1);
        self.update_points(&a, &b, state)
    }

    /// Update from two landmark positions
    pub fn update_points(
        &self,
        a: &NormalizedPoint,
        b: &NormalizedPoint,
        state: &mut PinchState,
    ) -> PinchEvent {
        self.update_distance(a.planar_distance(b), state)
    }

    /// Update from a precomputed fingertip distance
    pub fn update_distance(&self, distance: f64, state: &mut PinchState) -> PinchEvent {
        // NaN compares false and reads as "not pinching"
        let is_pinching = distance < self.threshold;

        match (is_pinching, state.is_held) {
            (true, false) => {
                state.is_held = true;
                debug!("Pinch closed (distance {:.4})", distance);
                PinchEvent::Pressed
            }
            (false, true) => {
                state.is_held = false;
                debug!("Pinch opened (distance {:.4})", distance);
                PinchEvent::Released
            }
            _ => PinchEvent::Unchanged,
        }
    }
}
