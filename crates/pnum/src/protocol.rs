//! Message types exchanged between calculation workers and the supervisor.
//!
//! Workers never touch supervisor state directly. Each worker owns a sender
//! half of the event channel and announces discoveries and range exhaustion;
//! the supervisor is the only consumer.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

/// Stable position of a calculation worker in the supervisor's pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotIndex(usize);

impl SlotIndex {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Half-open range of prime exponents `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExponentRange {
    pub start: u64,
    pub end: u64,
}

impl ExponentRange {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// The range immediately following this one, with the given width.
    pub fn next(&self, width: u64) -> Self {
        Self {
            start: self.end,
            end: self.end.saturating_add(width),
        }
    }
}

impl std::fmt::Display for ExponentRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// A perfect number found by a calculation worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    pub slot: SlotIndex,
    pub exponent: u64,
    pub value: BigUint,
}

/// Events from calculation workers to the supervisor.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    /// A candidate in the worker's range is perfect.
    Found(Discovery),

    /// The worker processed every prime in its range. This is its last act.
    /// Only the worker owning `slot` sends this.
    Exhausted { slot: SlotIndex, range: ExponentRange },

    /// The worker stopped early because it was cancelled.
    Stopped { slot: SlotIndex, range: ExponentRange },

    /// The worker hit a fatal error; its thread result carries the cause.
    Failed { slot: SlotIndex, range: ExponentRange },
}

impl WorkerEvent {
    /// Whether the sending worker has terminated and its slot is free.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WorkerEvent::Exhausted { .. }
                | WorkerEvent::Stopped { .. }
                | WorkerEvent::Failed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_range_is_contiguous() {
        let first = ExponentRange::new(2, 12);
        let second = first.next(10);
        assert_eq!(second, ExponentRange::new(12, 22));
        assert_eq!(second.next(10).start, second.end);
    }

    #[test]
    fn next_range_saturates() {
        let last = ExponentRange::new(u64::MAX - 3, u64::MAX - 1);
        assert_eq!(last.next(10), ExponentRange::new(u64::MAX - 1, u64::MAX));
    }

    #[test]
    fn slot_index_serializes_transparent() {
        assert_eq!(serde_json::to_string(&SlotIndex::new(3)).unwrap(), "3");
        assert_eq!(
            serde_json::from_str::<SlotIndex>("7").unwrap(),
            SlotIndex::new(7)
        );
    }

    #[test]
    fn terminal_events() {
        let slot = SlotIndex::new(0);
        let range = ExponentRange::new(2, 12);
        let found = WorkerEvent::Found(Discovery {
            slot,
            exponent: 2,
            value: BigUint::from(6u32),
        });

        assert!(!found.is_terminal());
        assert!(WorkerEvent::Exhausted { slot, range }.is_terminal());
        assert!(WorkerEvent::Stopped { slot, range }.is_terminal());
        assert!(WorkerEvent::Failed { slot, range }.is_terminal());
    }
}
