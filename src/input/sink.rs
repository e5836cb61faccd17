//! Mouse Sinks
//!
//! The mouse sink is the only place where cursor control touches the OS.
//! Every call is fire-and-forget from the control loop's point of view: a
//! failed write is reported through the returned `Result`, logged by the
//! caller, and never retried.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::input::error::Result;

/// Mouse button identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    /// Left mouse button
    #[default]
    Left,
    /// Middle mouse button
    Middle,
    /// Right mouse button
    Right,
}

impl MouseButton {
    /// X11 core protocol button number
    pub fn x11_button(&self) -> u8 {
        match self {
            MouseButton::Left => 1,
            MouseButton::Middle => 2,
            MouseButton::Right => 3,
        }
    }
}

/// Absolute pointer and button output
#[cfg_attr(test, mockall::automock)]
pub trait MouseSink: Send {
    /// Move the pointer to absolute screen pixels
    fn set_position(&mut self, x: i32, y: i32) -> Result<()>;

    /// Press and hold a button
    fn press(&mut self, button: MouseButton) -> Result<()>;

    /// Release a held button
    fn release(&mut self, button: MouseButton) -> Result<()>;
}

impl<S: MouseSink + ?Sized> MouseSink for Box<S> {
    fn set_position(&mut self, x: i32, y: i32) -> Result<()> {
        (**self).set_position(x, y)
    }

    fn press(&mut self, button: MouseButton) -> Result<()> {
        (**self).press(button)
    }

    fn release(&mut self, button: MouseButton) -> Result<()> {
        (**self).release(button)
    }
}

/// Sink that only logs, for dry runs
#[derive(Debug, Default)]
pub struct LoggingMouseSink {
    moves: u64,
}

impl LoggingMouseSink {
    /// Create a logging sink
    pub fn new() -> Self {
        Self::default()
    }
}

impl MouseSink for LoggingMouseSink {
    fn set_position(&mut self, x: i32, y: i32) -> Result<()> {
        self.moves += 1;
        debug!("[dry-run] move #{} to ({}, {})", self.moves, x, y);
        Ok(())
    }

    fn press(&mut self, button: MouseButton) -> Result<()> {
        info!("[dry-run] press {:?}", button);
        Ok(())
    }

    fn release(&mut self, button: MouseButton) -> Result<()> {
        info!("[dry-run] release {:?}", button);
        Ok(())
    }
}

/// One recorded sink call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseAction {
    /// `set_position`
    Move {
        /// X coordinate
        x: i32,
        /// Y coordinate
        y: i32,
    },
    /// `press`
    Press(MouseButton),
    /// `release`
    Release(MouseButton),
}

/// Sink that records every call into a shared log.
///
/// Clones share the same log, so one clone can be handed to the control loop
/// while another is inspected.
#[derive(Debug, Clone, Default)]
pub struct RecordingMouseSink {
    actions: Arc<Mutex<Vec<MouseAction>>>,
}

impl RecordingMouseSink {
    /// Create an empty recording sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far
    pub fn actions(&self) -> Vec<MouseAction> {
        self.actions.lock().clone()
    }

    /// Recorded button transitions only
    pub fn button_actions(&self) -> Vec<MouseAction> {
        self.actions
            .lock()
            .iter()
            .copied()
            .filter(|a| !matches!(a, MouseAction::Move { .. }))
            .collect()
    }

    /// Most recent pointer position
    pub fn last_position(&self) -> Option<(i32, i32)> {
        self.actions.lock().iter().rev().find_map(|a| match a {
            MouseAction::Move { x, y } => Some((*x, *y)),
            _ => None,
        })
    }
}

impl MouseSink for RecordingMouseSink {
    fn set_position(&mut self, x: i32, y: i32) -> Result<()> {
        self.actions.lock().push(MouseAction::Move { x, y });
        Ok(())
    }

    fn press(&mut self, button: MouseButton) -> Result<()> {
        self.actions.lock().push(MouseAction::Press(button));
        Ok(())
    }

    fn release(&mut self, button: MouseButton) -> Result<()> {
        self.actions.lock().push(MouseAction::Release(button));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_x11_button_numbers() {
        assert_eq!(MouseButton::Left.x11_button(), 1);
        assert_eq!(MouseButton::Middle.x11_button(), 2);
        assert_eq!(MouseButton::Right.x11_button(), 3);
    }

    #[test]
    fn test_recording_sink_shares_log_between_clones() {
        let recorder = RecordingMouseSink::new();
        let mut sink: Box<dyn MouseSink> = Box::new(recorder.clone());

        sink.set_position(10, 20).unwrap();
        sink.press(MouseButton::Left).unwrap();
        sink.set_position(11, 21).unwrap();
        sink.release(MouseButton::Left).unwrap();

        assert_eq!(recorder.actions().len(), 4);
        assert_eq!(recorder.last_position(), Some((11, 21)));
        assert_eq!(
            recorder.button_actions(),
            vec![
                MouseAction::Press(MouseButton::Left),
                MouseAction::Release(MouseButton::Left)
            ]
        );
    }

    #[test]
    fn test_button_from_config_name() {
        #[derive(Deserialize)]
        struct Holder {
            button: MouseButton,
        }
        let holder: Holder = toml::from_str("button = \"right\"").unwrap();
        assert_eq!(holder.button, MouseButton::Right);
    }
}
