//! Reentrancy Guard
//!
//! Rejects any call into the pool while another pool operation is still
//! running, e.g. from a token program invoked mid-operation.

use std::cell::Cell;

use solana_program::msg;

use crate::error::LendingError;

/// Reentrancy guard states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReentrancyState {
    /// Not entered - ready for new operation
    NotEntered = 0,
    /// Entered - operation in progress
    Entered = 1,
}

#[derive(Debug)]
pub struct ReentrancyGuard {
    state: Cell<ReentrancyState>,
    operation_count: Cell<u64>,
}

impl Default for ReentrancyGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self {
            state: Cell::new(ReentrancyState::NotEntered),
            operation_count: Cell::new(0),
        }
    }

    pub fn state(&self) -> ReentrancyState {
        self.state.get()
    }

    /// Enter guarded section
    pub fn enter(&self) -> Result<(), LendingError> {
        match self.state.get() {
            ReentrancyState::NotEntered => {
                self.state.set(ReentrancyState::Entered);
                self.operation_count
                    .set(self.operation_count.get().wrapping_add(1));
                Ok(())
            }
            ReentrancyState::Entered => {
                msg!("Reentrancy detected during operation {}", self.operation_count.get());
                Err(LendingError::ReentrancyDetected)
            }
        }
    }

    /// Exit guarded section
    pub fn exit(&self) -> Result<(), LendingError> {
        match self.state.get() {
            ReentrancyState::Entered => {
                self.state.set(ReentrancyState::NotEntered);
                Ok(())
            }
            state => {
                msg!("Invalid exit state: {:?}", state);
                Err(LendingError::InvalidGuardState)
            }
        }
    }

    pub fn is_entered(&self) -> bool {
        self.state.get() == ReentrancyState::Entered
    }

    /// Number of guarded operations started so far
    pub fn operation_count(&self) -> u64 {
        self.operation_count.get()
    }
}

/// Holds the guard for the duration of one operation
pub struct ReentrancyContext<'a> {
    guard: &'a ReentrancyGuard,
}

impl<'a> ReentrancyContext<'a> {
    /// Create new context and enter guard
    pub fn new(guard: &'a ReentrancyGuard) -> Result<Self, LendingError> {
        guard.enter()?;
        Ok(Self { guard })
    }

    /// Exit guard (called automatically on drop)
    pub fn exit(self) -> Result<(), LendingError> {
        self.guard.exit()
    }
}

impl<'a> Drop for ReentrancyContext<'a> {
    fn drop(&mut self) {
        if self.guard.is_entered() {
            let _ = self.guard.exit();
        }
    }
}
