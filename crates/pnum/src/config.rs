//! Search parameters.

use std::num::NonZeroUsize;

/// Calculation worker slots in the reference configuration.
pub const DEFAULT_SLOTS: NonZeroUsize = NonZeroUsize::new(1).unwrap();

/// Sum workers spawned per candidate.
pub const DEFAULT_SUM_WORKERS: NonZeroUsize = NonZeroUsize::new(9).unwrap();

/// Exponents handed out per assignment.
pub const DEFAULT_RANGE_WIDTH: u64 = 10;

pub const DEFAULT_FIRST_EXPONENT: u64 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Calculation worker slots in the pool.
    pub slots: NonZeroUsize,
    /// Sum workers per divisor-sum evaluation.
    pub sum_workers: NonZeroUsize,
    /// Width of each assigned exponent range.
    pub range_width: u64,
    /// Start of the first assigned range.
    pub first_exponent: u64,
    /// Stop handing out ranges after this many assignments. `None` searches
    /// forever.
    pub assignment_budget: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            slots: DEFAULT_SLOTS,
            sum_workers: DEFAULT_SUM_WORKERS,
            range_width: DEFAULT_RANGE_WIDTH,
            first_exponent: DEFAULT_FIRST_EXPONENT,
            assignment_budget: None,
        }
    }
}

impl SearchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slots(mut self, slots: NonZeroUsize) -> Self {
        self.slots = slots;
        self
    }

    pub fn with_sum_workers(mut self, sum_workers: NonZeroUsize) -> Self {
        self.sum_workers = sum_workers;
        self
    }

    pub fn with_range_width(mut self, range_width: u64) -> Self {
        self.range_width = range_width;
        self
    }

    pub fn with_first_exponent(mut self, first_exponent: u64) -> Self {
        self.first_exponent = first_exponent;
        self
    }

    pub fn with_assignment_budget(mut self, budget: u64) -> Self {
        self.assignment_budget = Some(budget);
        self
    }
}
