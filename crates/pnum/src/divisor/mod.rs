//! Parallel proper-divisor sums.
//!
//! One [`DivisorSumEvaluator`] call owns an independent accumulator and set
//! of sum workers; concurrent calls from different calculation workers share
//! nothing.

mod accumulator;
mod evaluator;
mod partition;
mod worker;

pub use accumulator::{SharedDivisorSum, SumState};
pub use evaluator::{DivisorSumEvaluator, Evaluation, Outcome};
pub use partition::{FactorRange, factor_ranges, partition, trial_bound};
pub use worker::{SumExit, SumWorker};
