//! Queued mouse sink
//!
//! Moves OS calls off the detector callback path: commands are pushed into
//! a bounded `crossbeam-channel` queue and executed by a dedicated worker
//! thread.
//!
//! ```text
//! ControlLoop ──try_send──> [bounded queue] ──> worker thread ──> inner sink
//! ```
//!
//! No call ever blocks. Pointer moves may only fill the first `depth`
//! slots and are dropped beyond that, since the next frame supersedes them.
//! The last [`BUTTON_RESERVE`] slots are kept for press/release, so button
//! edges still get through while moves are backed up; a button command is
//! only dropped when the reserve itself is exhausted. Dropping the sink
//! closes the queue and joins the worker, so everything queued (including a
//! final release) reaches the OS before teardown completes.

use crossbeam_channel::{bounded, Sender, TrySendError};
use std::thread::JoinHandle;
use tracing::{debug, warn};

use crate::input::error::{InputError, Result};
use crate::input::sink::{MouseButton, MouseSink};

/// Default queue depth
pub const DEFAULT_QUEUE_DEPTH: usize = 64;

/// Queue slots only button commands may use
pub const BUTTON_RESERVE: usize = 4;

#[derive(Debug, Clone, Copy)]
enum MouseCommand {
    Move(i32, i32),
    Press(MouseButton),
    Release(MouseButton),
}

impl MouseCommand {
    fn apply<S: MouseSink + ?Sized>(self, sink: &mut S) -> Result<()> {
        match self {
            MouseCommand::Move(x, y) => sink.set_position(x, y),
            MouseCommand::Press(button) => sink.press(button),
            MouseCommand::Release(button) => sink.release(button),
        }
    }
}

/// Sink wrapper executing commands on a worker thread
pub struct QueuedMouseSink {
    tx: Option<Sender<MouseCommand>>,
    worker: Option<JoinHandle<u64>>,
    move_depth: usize,
}

impl QueuedMouseSink {
    /// Start the worker thread around `inner`
    pub fn spawn<S>(inner: S, depth: usize) -> Result<Self>
    where
        S: MouseSink + 'static,
    {
        if depth == 0 {
            return Err(InputError::InvalidConfig(
                "mouse command queue depth must be at least 1".to_string(),
            ));
        }

        let (tx, rx) = bounded::<MouseCommand>(depth + BUTTON_RESERVE);

        let worker = std::thread::Builder::new()
            .name("mouse-sink".to_string())
            .spawn(move || {
                let mut inner = inner;
                let mut failures = 0u64;
                for command in rx.iter() {
                    if let Err(e) = command.apply(&mut inner) {
                        failures += 1;
                        warn!("Mouse sink {:?} failed: {}", command, e);
                    }
                }
                debug!("Mouse sink worker exiting ({} failures)", failures);
                failures
            })?;

        Ok(Self {
            tx: Some(tx),
            worker: Some(worker),
            move_depth: depth,
        })
    }

    fn sender(&self) -> Result<&Sender<MouseCommand>> {
        self.tx.as_ref().ok_or(InputError::QueueDisconnected)
    }

    fn try_send(&self, command: MouseCommand) -> Result<()> {
        match self.sender()?.try_send(command) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                debug!("Mouse command queue full, dropping {:?}", command);
                Err(InputError::QueueFull)
            }
            Err(TrySendError::Disconnected(_)) => Err(InputError::QueueDisconnected),
        }
    }

    /// Close the queue and wait for queued commands to run.
    ///
    /// Returns the number of failed sink calls seen by the worker.
    pub fn shutdown(&mut self) -> u64 {
        self.tx.take();
        match self.worker.take() {
            Some(handle) => handle.join().unwrap_or_else(|_| {
                warn!("Mouse sink worker panicked");
                0
            }),
            None => 0,
        }
    }
}

impl MouseSink for QueuedMouseSink {
    fn set_position(&mut self, x: i32, y: i32) -> Result<()> {
        // Single producer: the length can only shrink between check and send
        if self.sender()?.len() >= self.move_depth {
            debug!("Mouse command queue full, dropping move to ({}, {})", x, y);
            return Err(InputError::QueueFull);
        }
        self.try_send(MouseCommand::Move(x, y))
    }

    fn press(&mut self, button: MouseButton) -> Result<()> {
        self.try_send(MouseCommand::Press(button))
    }

    fn release(&mut self, button: MouseButton) -> Result<()> {
        self.try_send(MouseCommand::Release(button))
    }
}

impl Drop for QueuedMouseSink {
    fn drop(&mut self) {
        self.shutdown();
    }
}
