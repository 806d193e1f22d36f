//! FIFO command queue deferring work until the engine is ready.

use std::collections::VecDeque;

/// Work the session defers to the engine queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Apply settings, build ad units and wire page controls.
    Initialize,
    /// Run an auction for the stored ad units.
    RequestBids,
}

/// Commands pushed before the engine signals readiness wait; once ready they are
/// handed out in push order, including commands pushed while draining.
#[derive(Debug, Default)]
pub struct CommandQueue {
    ready: bool,
    pending: VecDeque<Command>,
}

impl CommandQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command) {
        log::debug!("Queued engine command: {:?}", command);
        self.pending.push_back(command);
    }

    /// Mark the engine ready. Idempotent.
    pub fn mark_ready(&mut self) {
        self.ready = true;
    }

    /// Next command to run, or `None` if the engine is not ready or nothing is pending.
    pub fn next_ready(&mut self) -> Option<Command> {
        if self.ready {
            self.pending.pop_front()
        } else {
            None
        }
    }
}
