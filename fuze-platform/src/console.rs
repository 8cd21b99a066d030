//! Console attachment state shared by the platform providers.

use fuze_core::error::{FuzeError, Result};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleState {
    #[default]
    Detached,
    AttachedToParent,
    AllocatedOwn,
}

impl ConsoleState {
    pub fn is_bound(self) -> bool {
        !matches!(self, ConsoleState::Detached)
    }
}

/// Single-writer bookkeeping for the console state machine.
#[derive(Debug, Default)]
pub struct ConsoleTracker {
    state: ConsoleState,
    stdin_bound: bool,
}

impl ConsoleTracker {
    pub fn state(&self) -> ConsoleState {
        self.state
    }

    pub fn stdin_bound(&self) -> bool {
        self.stdin_bound
    }

    /// Record a successful attach or allocation.
    pub fn bound(&mut self, state: ConsoleState, with_stdin: bool) {
        debug!(from = ?self.state, to = ?state, with_stdin, "console bound");
        if state.is_bound() {
            self.state = state;
        }
        self.stdin_bound |= with_stdin;
    }

    /// Mark stdin as bound on an already bound console.
    pub fn bind_stdin(&mut self) {
        self.stdin_bound = true;
    }

    /// Move back to `Detached`, returning the state that was released.
    pub fn release(&mut self) -> Result<ConsoleState> {
        if !self.state.is_bound() {
            return Err(FuzeError::Console(
                "release requested while no console is attached".to_string(),
            ));
        }
        let previous = self.state;
        debug!(from = ?previous, "console released");
        self.state = ConsoleState::Detached;
        self.stdin_bound = false;
        Ok(previous)
    }
}
