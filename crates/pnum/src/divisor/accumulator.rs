//! Running divisor sum shared by the sum workers of one evaluation.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use num_bigint::BigUint;

/// State guarded by the accumulator mutex.
#[derive(Debug)]
pub struct SumState {
    pub sum: BigUint,
    /// Sum workers that have finished, for any reason.
    pub completed: usize,
}

/// Divisor sum plus completion counter behind one mutex, with a condition
/// variable signalled each time a worker finishes.
///
/// The sum never decreases: workers only add divisor pairs.
#[derive(Debug)]
pub struct SharedDivisorSum {
    target: BigUint,
    state: Mutex<SumState>,
    finished: Condvar,
}

impl SharedDivisorSum {
    pub fn new(target: BigUint, seed: BigUint) -> Self {
        Self {
            target,
            state: Mutex::new(SumState {
                sum: seed,
                completed: 0,
            }),
            finished: Condvar::new(),
        }
    }

    /// The number whose divisors are being summed.
    pub fn target(&self) -> &BigUint {
        &self.target
    }

    /// Lock the state, ignoring poisoning. No worker panics while holding the
    /// lock with a partially applied pair.
    pub fn lock(&self) -> MutexGuard<'_, SumState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a divisor pair. Returns true if the sum now exceeds the target.
    pub fn add_pair(&self, factor: &BigUint, cofactor: &BigUint) -> bool {
        let mut state = self.lock();
        state.sum += factor;
        state.sum += cofactor;
        state.sum > self.target
    }

    /// Record that one worker has finished and wake the waiter.
    pub fn finish(&self) {
        let mut state = self.lock();
        state.completed += 1;
        self.finished.notify_one();
    }

    /// Block until the next `finish`, releasing the lock while waiting.
    pub fn wait<'a>(&self, guard: MutexGuard<'a, SumState>) -> MutexGuard<'a, SumState> {
        self.finished
            .wait(guard)
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn into_sum(self) -> BigUint {
        self.state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .sum
    }
}

/// Calls [`SharedDivisorSum::finish`] on drop, so a worker is counted as
/// finished on every exit path, unwinding included.
pub(crate) struct CompletionGuard<'a>(pub(crate) &'a SharedDivisorSum);

impl Drop for CompletionGuard<'_> {
    fn drop(&mut self) {
        self.0.finish();
    }
}
