//! Cursor Control State Machine
//!
//! ```text
//!            frame with ≥1 hand
//!   ┌──────┐ ─────────────────> ┌──────────┐
//!   │ Idle │                    │ Tracking │ ──┐ frame with ≥1 hand:
//!   └──────┘ <───────────────── └──────────┘ <─┘  map → smooth → move
//!            frame with 0 hands                    pinch → press/release
//! ```
//!
//! Entering `Idle` clears the velocity history so stale motion never leaks
//! across a tracking gap. The last cursor position is kept, so reacquiring
//! the hand continues smoothing from where the pointer is.
//!
//! All state is owned here and mutated only from the detector callback,
//! which is serialized by the detector runtime. Internal state is updated
//! before each sink call, so a failed OS write never desynchronizes the
//! state machine.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::mem::Discriminant;
use tracing::{debug, info, trace, warn};

use crate::cursor::{
    ActiveRegion, CursorMapper, CursorState, MappingError, ScreenGeometry, ScreenPosition,
    SmoothingConfig, SmoothingFilter, VelocityState,
};
use crate::gesture::{PinchConfig, PinchEvent, PinchGesture, PinchState};
use crate::input::{MouseSink, ScreenGeometryProvider};
use crate::landmarks::{HandLandmark, HandLandmarkSet};

/// `[control]` configuration section
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlConfig {
    /// Master switch for cursor control
    #[serde(default = "default_enable_mouse_control")]
    pub enable_mouse_control: bool,

    /// Landmark that drives the pointer
    #[serde(default = "default_control_landmark")]
    pub control_landmark: HandLandmark,

    /// Snap to the hand (no smoothing) on the first frame after a tracking gap
    #[serde(default)]
    pub resnap_on_reacquire: bool,
}

fn default_enable_mouse_control() -> bool {
    true
}
fn default_control_landmark() -> HandLandmark {
    HandLandmark::MiddleFingerMcp
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            enable_mouse_control: default_enable_mouse_control(),
            control_landmark: default_control_landmark(),
            resnap_on_reacquire: false,
        }
    }
}

/// Everything the control loop needs from configuration
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControlLoopConfig {
    /// Control switches and landmark
    pub control: ControlConfig,
    /// Camera active region
    pub region: ActiveRegion,
    /// Smoothing filter
    pub smoothing: SmoothingConfig,
    /// Pinch gesture
    pub pinch: PinchConfig,
}

/// Whether a hand is being tracked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackingState {
    /// No hand in the last frame
    Idle,
    /// Hand present, cursor and gesture active
    Tracking,
}

/// Result of processing one detection frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameOutcome {
    /// State after the frame
    pub state: TrackingState,
    /// Position sent to the sink, if any
    pub position: Option<ScreenPosition>,
    /// Button transition, if any
    pub pinch: PinchEvent,
}

impl FrameOutcome {
    fn idle() -> Self {
        Self {
            state: TrackingState::Idle,
            position: None,
            pinch: PinchEvent::Unchanged,
        }
    }

    fn skipped() -> Self {
        Self {
            state: TrackingState::Tracking,
            position: None,
            pinch: PinchEvent::Unchanged,
        }
    }
}

/// Control loop counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlStats {
    /// Detection frames received
    pub frames: u64,
    /// Frames with at least one hand
    pub tracking_frames: u64,
    /// Tracking frames whose cursor effect was skipped
    pub skipped_frames: u64,
    /// Idle → Tracking transitions
    pub hands_acquired: u64,
    /// Tracking → Idle transitions
    pub hands_lost: u64,
    /// Positions sent to the sink
    pub positions_emitted: u64,
    /// Press events sent
    pub presses: u64,
    /// Release events sent
    pub releases: u64,
    /// Sink calls that returned an error
    pub sink_failures: u64,
}

/// Landmark-to-cursor control state machine
pub struct ControlLoop<S: MouseSink> {
    config: ControlLoopConfig,
    geometry: Option<ScreenGeometry>,
    sink: Option<S>,

    mapper: CursorMapper,
    filter: SmoothingFilter,
    pinch: PinchGesture,

    tracking: TrackingState,
    cursor: CursorState,
    velocity: VelocityState,
    pinch_state: PinchState,

    stats: ControlStats,
    reported_mapping_errors: HashSet<Discriminant<MappingError>>,
    shut_down: bool,
}

impl<S: MouseSink> ControlLoop<S> {
    /// Build the loop, querying screen geometry once.
    ///
    /// Cursor control is disabled for the lifetime of the loop when it is
    /// switched off in configuration or the geometry is unavailable.
    pub fn new(
        config: ControlLoopConfig,
        geometry_provider: &dyn ScreenGeometryProvider,
        sink: S,
    ) -> Self {
        if !config.control.enable_mouse_control {
            info!("Mouse control is disabled by configuration");
            return Self::with_geometry(config, None, None);
        }

        match geometry_provider.screen_resolution() {
            Ok(geometry) => {
                info!(
                    "Screen resolution: {}x{}, mouse control enabled",
                    geometry.width(),
                    geometry.height()
                );
                Self::with_geometry(config, Some(geometry), Some(sink))
            }
            Err(e) => {
                warn!("Could not get screen resolution ({}), mouse control disabled", e);
                Self::with_geometry(config, None, None)
            }
        }
    }

    /// Loop that ignores all frames
    pub fn disabled(config: ControlLoopConfig) -> Self {
        Self::with_geometry(config, None, None)
    }

    /// Build the loop from an already known geometry.
    ///
    /// Control is enabled only when both geometry and sink are present.
    pub fn with_geometry(
        config: ControlLoopConfig,
        geometry: Option<ScreenGeometry>,
        sink: Option<S>,
    ) -> Self {
        let (geometry, sink) = match (geometry, sink) {
            (Some(g), Some(s)) => (Some(g), Some(s)),
            _ => (None, None),
        };

        let cursor = geometry
            .as_ref()
            .map(CursorState::centered)
            .unwrap_or_default();

        Self {
            mapper: CursorMapper::new(config.region),
            filter: SmoothingFilter::new(config.smoothing),
            pinch: PinchGesture::from_config(&config.pinch),
            config,
            geometry,
            sink,
            tracking: TrackingState::Idle,
            cursor,
            velocity: VelocityState::new(),
            pinch_state: PinchState::new(),
            stats: ControlStats::default(),
            reported_mapping_errors: HashSet::new(),
            shut_down: false,
        }
    }

    /// True when frames drive the pointer
    pub fn is_enabled(&self) -> bool {
        self.sink.is_some() && self.geometry.is_some() && !self.shut_down
    }

    /// Current tracking state
    pub fn state(&self) -> TrackingState {
        self.tracking
    }

    /// Screen geometry in use, when enabled
    pub fn geometry(&self) -> Option<ScreenGeometry> {
        self.geometry
    }

    /// Smoothing state
    pub fn cursor_state(&self) -> &CursorState {
        &self.cursor
    }

    /// Velocity history
    pub fn velocity_state(&self) -> &VelocityState {
        &self.velocity
    }

    /// Pinch button state
    pub fn pinch_state(&self) -> &PinchState {
        &self.pinch_state
    }

    /// Counters
    pub fn stats(&self) -> ControlStats {
        self.stats
    }

    /// Process one detection frame's hands (possibly none)
    pub fn process(&mut self, hands: &[HandLandmarkSet]) -> FrameOutcome {
        self.stats.frames += 1;

        if !self.is_enabled() {
            return FrameOutcome::idle();
        }

        let Some(hand) = hands.first() else {
            self.enter_idle();
            return FrameOutcome::idle();
        };

        if self.tracking == TrackingState::Idle {
            debug!("Hand acquired ({} detected)", hands.len());
            self.tracking = TrackingState::Tracking;
            self.stats.hands_acquired += 1;
        }
        self.stats.tracking_frames += 1;

        let Some(position) = self.update_cursor(hand) else {
            self.stats.skipped_frames += 1;
            return FrameOutcome::skipped();
        };

        let pinch = self.update_pinch(hand);

        FrameOutcome {
            state: TrackingState::Tracking,
            position: Some(position),
            pinch,
        }
    }

    /// Release a held pinch and stop reacting to frames.
    ///
    /// Returns true if a release was emitted. Calling again is a no-op.
    pub fn shutdown(&mut self) -> bool {
        if self.shut_down {
            return false;
        }
        self.shut_down = true;

        let released = self.pinch_state.force_release() == PinchEvent::Released;
        if released {
            info!("Releasing held {:?} button on shutdown", self.config.pinch.button);
            self.emit_button(PinchEvent::Released);
        }

        debug!("Control loop shut down: {:?}", self.stats);
        released
    }

    fn enter_idle(&mut self) {
        if self.tracking == TrackingState::Tracking {
            debug!("Hand lost, tracking idle");
            self.tracking = TrackingState::Idle;
            self.stats.hands_lost += 1;

            if self.config.control.resnap_on_reacquire {
                self.cursor.reset();
            }
        }
        self.velocity.clear();
    }

    fn update_cursor(&mut self, hand: &HandLandmarkSet) -> Option<ScreenPosition> {
        let geometry = self.geometry?;
        let landmark = hand.get(self.config.control.control_landmark);

        let raw = match self.mapper.map(&landmark, &geometry) {
            Ok(raw) => raw,
            Err(e) => {
                self.report_mapping_error(&e);
                return None;
            }
        };

        let position =
            self.filter
                .update(raw, &landmark, &mut self.cursor, &mut self.velocity, &geometry);

        trace!(
            "Cursor: landmark=({:.4}, {:.4}) raw=({:.1}, {:.1}) -> ({}, {})",
            landmark.x,
            landmark.y,
            raw.0,
            raw.1,
            position.x,
            position.y
        );

        if let Some(sink) = self.sink.as_mut() {
            if let Err(e) = sink.set_position(position.x, position.y) {
                self.stats.sink_failures += 1;
                warn!("Failed to set mouse position: {}", e);
            }
        }
        self.stats.positions_emitted += 1;

        Some(position)
    }

    fn update_pinch(&mut self, hand: &HandLandmarkSet) -> PinchEvent {
        if !self.config.pinch.enabled {
            return PinchEvent::Unchanged;
        }

        let event = self.pinch.update(hand, &mut self.pinch_state);
        self.emit_button(event);
        event
    }

    fn emit_button(&mut self, event: PinchEvent) {
        let button = self.config.pinch.button;
        let Some(sink) = self.sink.as_mut() else {
            return;
        };

        let result = match event {
            PinchEvent::Pressed => {
                self.stats.presses += 1;
                sink.press(button)
            }
            PinchEvent::Released => {
                self.stats.releases += 1;
                sink.release(button)
            }
            PinchEvent::Unchanged => return,
        };

        if let Err(e) = result {
            self.stats.sink_failures += 1;
            warn!("Failed to send {:?} for {:?}: {}", event, button, e);
        }
    }

    /// Warn once per error variant, debug afterwards; true if it warned
    fn report_mapping_error(&mut self, error: &MappingError) -> bool {
        if !self.reported_mapping_errors.insert(std::mem::discriminant(error)) {
            debug!("Skipping cursor update: {}", error);
            false
        } else {
            warn!(
                "Skipping cursor update: {} (further occurrences logged at debug)",
                error
            );
            true
        }
    }
}

impl<S: MouseSink> Drop for ControlLoop<S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{InputError, MockMouseSink, MockScreenGeometryProvider, MouseButton};
    use crate::landmarks::NormalizedPoint;
    use mockall::predicate::eq;
    use mockall::Sequence;

    fn hd() -> ScreenGeometry {
        ScreenGeometry::new(1920, 1080).unwrap()
    }

    fn hand_at(x: f64, y: f64, pinch_distance: f64) -> HandLandmarkSet {
        HandLandmarkSet::uniform(NormalizedPoint::new(x, y, 0.0))
            .with(HandLandmark::ThumbTip, NormalizedPoint::new(0.5, 0.5, 0.0))
            .with(
                HandLandmark::IndexFingerTip,
                NormalizedPoint::new(0.5 + pinch_distance, 0.5, 0.0),
            )
    }

    fn quiet_sink() -> MockMouseSink {
        let mut sink = MockMouseSink::new();
        sink.expect_set_position().returning(|_, _| Ok(()));
        sink.expect_press().returning(|_| Ok(()));
        sink.expect_release().returning(|_| Ok(()));
        sink
    }

    #[test]
    fn test_first_frame_moves_to_mapped_position() {
        let mut sink = MockMouseSink::new();
        sink.expect_set_position()
            .with(eq(640), eq(392))
            .times(1)
            .returning(|_, _| Ok(()));

        let mut control =
            ControlLoop::with_geometry(ControlLoopConfig::default(), Some(hd()), Some(sink));
        let outcome = control.process(&[hand_at(0.5, 0.5, 0.2)]);

        assert_eq!(outcome.state, TrackingState::Tracking);
        assert_eq!(outcome.position, Some(ScreenPosition { x: 640, y: 392 }));
        assert_eq!(outcome.pinch, PinchEvent::Unchanged);
    }

    #[test]
    fn test_geometry_unavailable_disables_control() {
        let mut provider = MockScreenGeometryProvider::new();
        provider
            .expect_screen_resolution()
            .times(1)
            .returning(|| Err(InputError::ScreenUnavailable("no display".into())));

        let mut sink = MockMouseSink::new();
        sink.expect_set_position().never();

        let mut control = ControlLoop::new(ControlLoopConfig::default(), &provider, sink);
        assert!(!control.is_enabled());

        let outcome = control.process(&[hand_at(0.5, 0.5, 0.2)]);
        assert_eq!(outcome.position, None);
    }

    #[test]
    fn test_disabled_by_config_never_queries_geometry() {
        let mut provider = MockScreenGeometryProvider::new();
        provider.expect_screen_resolution().never();

        let mut config = ControlLoopConfig::default();
        config.control.enable_mouse_control = false;

        let control = ControlLoop::new(config, &provider, MockMouseSink::new());
        assert!(!control.is_enabled());
    }

    #[test]
    fn test_cursor_seeded_at_screen_center() {
        let mut provider = MockScreenGeometryProvider::new();
        provider
            .expect_screen_resolution()
            .returning(|| Ok(ScreenGeometry::new(1920, 1080).unwrap()));

        let control = ControlLoop::new(ControlLoopConfig::default(), &provider, quiet_sink());
        assert!(control.is_enabled());
        assert_eq!(control.cursor_state().last(), Some((960.0, 540.0)));
        assert!(control.cursor_state().is_first_sample());
    }

    #[test]
    fn test_pinch_press_and_release_once_each() {
        let mut seq = Sequence::new();
        let mut sink = MockMouseSink::new();
        sink.expect_set_position().returning(|_, _| Ok(()));
        sink.expect_press()
            .with(eq(MouseButton::Left))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        sink.expect_release()
            .with(eq(MouseButton::Left))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let mut control =
            ControlLoop::with_geometry(ControlLoopConfig::default(), Some(hd()), Some(sink));

        let events: Vec<_> = [0.2, 0.05, 0.05, 0.05, 0.2]
            .iter()
            .map(|d| control.process(&[hand_at(0.5, 0.5, *d)]).pinch)
            .collect();

        assert_eq!(
            events,
            vec![
                PinchEvent::Unchanged,
                PinchEvent::Pressed,
                PinchEvent::Unchanged,
                PinchEvent::Unchanged,
                PinchEvent::Released
            ]
        );
        assert_eq!(control.stats().presses, 1);
        assert_eq!(control.stats().releases, 1);
    }

    #[test]
    fn test_pinch_disabled() {
        let mut sink = MockMouseSink::new();
        sink.expect_set_position().returning(|_, _| Ok(()));
        sink.expect_press().never();

        let mut config = ControlLoopConfig::default();
        config.pinch.enabled = false;

        let mut control = ControlLoop::with_geometry(config, Some(hd()), Some(sink));
        let outcome = control.process(&[hand_at(0.5, 0.5, 0.0)]);
        assert_eq!(outcome.pinch, PinchEvent::Unchanged);
        assert!(!control.pinch_state().is_held());
    }

    #[test]
    fn test_hand_loss_clears_velocity_keeps_position() {
        let mut control = ControlLoop::with_geometry(
            ControlLoopConfig::default(),
            Some(hd()),
            Some(quiet_sink()),
        );

        control.process(&[hand_at(0.5, 0.5, 0.2)]);
        assert!(control.velocity_state().previous().is_some());
        let last = control.cursor_state().last();

        let outcome = control.process(&[]);
        assert_eq!(outcome.state, TrackingState::Idle);
        assert_eq!(control.state(), TrackingState::Idle);
        assert!(control.velocity_state().previous().is_none());
        assert_eq!(control.cursor_state().last(), last);
        assert!(!control.cursor_state().is_first_sample());

        let stats = control.stats();
        assert_eq!(stats.hands_acquired, 1);
        assert_eq!(stats.hands_lost, 1);
    }

    #[test]
    fn test_resnap_on_reacquire() {
        let mut config = ControlLoopConfig::default();
        config.control.resnap_on_reacquire = true;
        config.smoothing = SmoothingConfig::fixed(0.1);

        let mut control = ControlLoop::with_geometry(config, Some(hd()), Some(quiet_sink()));
        control.process(&[hand_at(0.5, 0.5, 0.2)]);
        control.process(&[]);
        assert!(control.cursor_state().is_first_sample());

        // Full-frame corner maps to the screen corner with no smoothing lag
        let outcome = control.process(&[hand_at(0.95, 0.95, 0.2)]);
        assert_eq!(outcome.position, Some(ScreenPosition { x: 1919, y: 1079 }));
    }

    #[test]
    fn test_degenerate_region_skips_frame_and_gesture() {
        let mut sink = MockMouseSink::new();
        sink.expect_set_position().never();
        sink.expect_press().never();

        let mut config = ControlLoopConfig::default();
        config.region = ActiveRegion::new(0.6, 0.5, 0.0, 0.0);

        let mut control = ControlLoop::with_geometry(config, Some(hd()), Some(sink));
        for _ in 0..3 {
            let outcome = control.process(&[hand_at(0.5, 0.5, 0.0)]);
            assert_eq!(outcome.position, None);
            assert_eq!(outcome.pinch, PinchEvent::Unchanged);
        }
        assert_eq!(control.stats().skipped_frames, 3);
        assert!(control.is_enabled());
    }

    #[test]
    fn test_mapping_errors_warn_once_per_kind() {
        let mut control =
            ControlLoop::<MockMouseSink>::with_geometry(ControlLoopConfig::default(), Some(hd()), None);

        let nan = MappingError::NonFinitePoint(f64::NAN, 0.5);
        let degenerate = MappingError::DegenerateRegion {
            active_width: 0.0,
            active_height: 1.0,
        };

        assert!(control.report_mapping_error(&nan));
        assert!(!control.report_mapping_error(&nan));
        // A different kind still gets its own warning
        assert!(control.report_mapping_error(&degenerate));
        assert!(!control.report_mapping_error(&degenerate));
    }

    #[test]
    fn test_sink_failure_does_not_desync_state() {
        let mut sink = MockMouseSink::new();
        sink.expect_set_position()
            .returning(|_, _| Err(InputError::QueueFull));
        sink.expect_press()
            .times(1)
            .returning(|_| Err(InputError::QueueFull));
        sink.expect_release().times(1).returning(|_| Ok(()));

        let mut control =
            ControlLoop::with_geometry(ControlLoopConfig::default(), Some(hd()), Some(sink));

        let outcome = control.process(&[hand_at(0.5, 0.5, 0.0)]);
        assert_eq!(outcome.pinch, PinchEvent::Pressed);
        assert!(control.pinch_state().is_held());
        assert!(control.cursor_state().last().is_some());

        // Still held: no second press attempt
        control.process(&[hand_at(0.5, 0.5, 0.0)]);
        control.process(&[hand_at(0.5, 0.5, 0.2)]);

        assert_eq!(control.stats().sink_failures, 4);
    }

    #[test]
    fn test_shutdown_releases_held_pinch_once() {
        let mut sink = MockMouseSink::new();
        sink.expect_set_position().returning(|_, _| Ok(()));
        sink.expect_press().times(1).returning(|_| Ok(()));
        sink.expect_release().times(1).returning(|_| Ok(()));

        let mut control =
            ControlLoop::with_geometry(ControlLoopConfig::default(), Some(hd()), Some(sink));
        control.process(&[hand_at(0.5, 0.5, 0.0)]);
        assert!(control.pinch_state().is_held());

        assert!(control.shutdown());
        assert!(!control.shutdown());
        assert!(!control.is_enabled());

        // Frames after shutdown are ignored
        let outcome = control.process(&[hand_at(0.5, 0.5, 0.0)]);
        assert_eq!(outcome.pinch, PinchEvent::Unchanged);
    }

    #[test]
    fn test_drop_releases_held_pinch() {
        let mut sink = MockMouseSink::new();
        sink.expect_set_position().returning(|_, _| Ok(()));
        sink.expect_press().times(1).returning(|_| Ok(()));
        sink.expect_release().times(1).returning(|_| Ok(()));

        let mut control =
            ControlLoop::with_geometry(ControlLoopConfig::default(), Some(hd()), Some(sink));
        control.process(&[hand_at(0.5, 0.5, 0.0)]);
        drop(control);
    }

    #[test]
    fn test_only_first_hand_is_used() {
        let mut sink = MockMouseSink::new();
        sink.expect_set_position()
            .with(eq(0), eq(0))
            .times(1)
            .returning(|_, _| Ok(()));

        let mut control =
            ControlLoop::with_geometry(ControlLoopConfig::default(), Some(hd()), Some(sink));
        control.process(&[hand_at(0.0, 0.0, 0.2), hand_at(1.0, 1.0, 0.2)]);
    }
}
