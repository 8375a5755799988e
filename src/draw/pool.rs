use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

use crate::shared::AppError;

struct PoolState {
    remaining: Vec<u32>,
    rng: StdRng,
}

/// Bag of unique numbers drawn without replacement.
///
/// Shared between the scheduler and its draw task; every operation takes the
/// internal lock, so `draw` and `reset` may run on different tasks.
pub struct NumberPool {
    state: Mutex<PoolState>,
}

impl Default for NumberPool {
    fn default() -> Self {
        Self::new()
    }
}

impl NumberPool {
    /// Creates an empty pool with a generator seeded from the OS
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            state: Mutex::new(PoolState {
                remaining: Vec::new(),
                rng,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PoolState> {
        // the state is a plain Vec, still consistent after a panic elsewhere
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the contents with 1..=max_number
    pub fn reset(&self, max_number: u32) -> Result<(), AppError> {
        if max_number < 1 {
            return Err(AppError::InvalidConfiguration(
                "max_number must be >= 1".to_string(),
            ));
        }

        let mut state = self.lock();
        state.remaining = (1..=max_number).collect();
        debug!(max_number = max_number, "Number pool reset");
        Ok(())
    }

    /// Shuffles everything left and removes the last value
    pub fn draw(&self) -> Result<u32, AppError> {
        let mut state = self.lock();
        let PoolState { remaining, rng } = &mut *state;

        remaining.shuffle(rng);
        remaining.pop().ok_or(AppError::EmptyPool)
    }

    /// Puts back a value that was drawn but never delivered
    pub(crate) fn restore(&self, value: u32) {
        let mut state = self.lock();
        if !state.remaining.contains(&value) {
            state.remaining.push(value);
        }
    }

    pub fn remaining(&self) -> usize {
        self.lock().remaining.len()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn contains(&self, value: u32) -> bool {
        self.lock().remaining.contains(&value)
    }
}
