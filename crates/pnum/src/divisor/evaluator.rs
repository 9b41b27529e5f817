//! Divisor-sum evaluation of a single candidate.
//!
//! Flow:
//! 1. Compute the trial bound `ceil(sqrt(n))` and split `[2, bound)` across
//!    the sum workers
//! 2. Spawn the workers inside a thread scope, all sharing one accumulator
//! 3. Wait until every worker has finished or the sum has passed `n`
//! 4. Cancel the remaining workers and join them all
//! 5. Classify `n` from the final sum

use std::num::NonZeroUsize;
use std::thread;

use num_bigint::BigUint;
use num_traits::{One, Zero};
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::accumulator::SharedDivisorSum;
use super::partition::{partition, trial_bound};
use super::worker::{SumExit, SumWorker};
use crate::error::{Result, SearchError};

/// How a candidate's proper-divisor sum compares to the candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Perfect,
    Deficient,
    Abundant,
    /// The parent token was cancelled before the sum was conclusive.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// Final value of the shared divisor sum.
    pub sum: BigUint,
    pub outcome: Outcome,
    /// True if waiting stopped because the sum passed the candidate.
    pub early_exit: bool,
}

impl Evaluation {
    pub fn is_perfect(&self) -> bool {
        self.outcome == Outcome::Perfect
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DivisorSumEvaluator {
    workers: NonZeroUsize,
}

impl DivisorSumEvaluator {
    pub fn new(workers: NonZeroUsize) -> Self {
        Self { workers }
    }

    /// Decide whether `n` is perfect.
    ///
    /// Every spawned sum worker is joined before this returns, on every path.
    /// The square root of a perfect square lies outside the trial interval and
    /// is counted once up front, so each divisor contributes exactly once.
    pub fn evaluate(&self, n: &BigUint, parent: &CancellationToken) -> Result<Evaluation> {
        if *n < BigUint::from(2u32) {
            return Ok(Evaluation {
                sum: BigUint::zero(),
                outcome: Outcome::Deficient,
                early_exit: false,
            });
        }

        let (bound, is_square) = trial_bound(n);
        let mut seed = BigUint::one();
        if is_square {
            seed += &bound;
        }

        let ranges = partition(&BigUint::from(2u32), &bound, self.workers);
        let shared = SharedDivisorSum::new(n.clone(), seed);
        let cancel = parent.child_token();

        tracing::debug!(
            bits = n.bits(),
            workers = self.workers.get(),
            "Evaluating candidate"
        );

        let (early_exit, interrupted) = thread::scope(|scope| -> Result<(bool, bool)> {
            let mut handles = Vec::with_capacity(ranges.len());
            for (index, range) in ranges.into_iter().enumerate() {
                info!("Assigning work to sum thread {}", index);

                let worker = SumWorker::new(index, n, range, &shared, cancel.clone());
                let spawned = thread::Builder::new()
                    .name(format!("sum-worker-{index}"))
                    .spawn_scoped(scope, move || worker.run());

                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(source) => {
                        // The scope still joins the workers already running.
                        cancel.cancel();
                        return Err(SearchError::SpawnSumWorker { index, source });
                    }
                }
            }

            let early_exit = wait_for_workers(&shared, handles.len());
            cancel.cancel();

            let mut interrupted = false;
            for handle in handles {
                match handle.join() {
                    Ok(exit) => interrupted |= exit == SumExit::Cancelled,
                    Err(payload) => std::panic::resume_unwind(payload),
                }
            }
            Ok((early_exit, interrupted))
        })?;

        let sum = shared.into_sum();
        let outcome = if sum > *n {
            Outcome::Abundant
        } else if interrupted && !early_exit {
            Outcome::Cancelled
        } else if sum == *n {
            Outcome::Perfect
        } else {
            Outcome::Deficient
        };

        Ok(Evaluation {
            sum,
            outcome,
            early_exit,
        })
    }

    pub fn is_perfect(&self, n: &BigUint) -> Result<bool> {
        Ok(self.evaluate(n, &CancellationToken::new())?.is_perfect())
    }
}

/// Block until `workers` sum workers have finished or the shared sum has
/// passed the target. Returns true in the latter case.
fn wait_for_workers(shared: &SharedDivisorSum, workers: usize) -> bool {
    let mut state = shared.lock();
    loop {
        info!("{} sum threads complete", state.completed);

        if state.completed == workers {
            return false;
        }
        if state.sum > *shared.target() {
            info!("sum is too large; terminating children");
            return true;
        }

        state = shared.wait(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluator(workers: usize) -> DivisorSumEvaluator {
        DivisorSumEvaluator::new(NonZeroUsize::new(workers).unwrap())
    }

    fn evaluate(n: u64) -> Evaluation {
        evaluator(9)
            .evaluate(&BigUint::from(n), &CancellationToken::new())
            .unwrap()
    }

    /// Sum of proper divisors by brute force.
    fn aliquot_sum(n: u64) -> u64 {
        (1..n).filter(|d| n % d == 0).sum()
    }

    #[test]
    fn known_perfect_numbers() {
        for n in [6u64, 28, 496, 8128, 33_550_336] {
            let evaluation = evaluate(n);
            assert_eq!(evaluation.outcome, Outcome::Perfect, "n = {n}");
            assert_eq!(evaluation.sum, BigUint::from(n));
            assert!(!evaluation.early_exit);
        }
    }

    #[test]
    fn non_perfect_numbers_never_match() {
        for n in 2..600u64 {
            if [6, 28, 496].contains(&n) {
                continue;
            }
            let evaluation = evaluate(n);
            assert!(!evaluation.is_perfect(), "n = {n}");
            assert_ne!(evaluation.sum, BigUint::from(n), "n = {n}");
        }
    }

    #[test]
    fn deficient_sums_are_exact() {
        for n in 2..400u64 {
            let expected = aliquot_sum(n);
            if expected >= n {
                continue;
            }
            let evaluation = evaluate(n);
            assert_eq!(evaluation.outcome, Outcome::Deficient, "n = {n}");
            assert_eq!(evaluation.sum, BigUint::from(expected), "n = {n}");
        }
    }

    #[test]
    fn perfect_squares_count_root_once() {
        // 1 + 2 + 4 + 8 = 15; 1 + 3 = 4; 1 + 5 = 6
        assert_eq!(evaluate(16).sum, BigUint::from(15u32));
        assert_eq!(evaluate(9).sum, BigUint::from(4u32));
        assert_eq!(evaluate(25).sum, BigUint::from(6u32));
        assert_eq!(evaluate(4).sum, BigUint::from(3u32));
    }

    #[test]
    fn abundant_numbers_exceed() {
        for n in [12u64, 18, 20, 24, 945, 2_096_128] {
            let evaluation = evaluate(n);
            assert_eq!(evaluation.outcome, Outcome::Abundant, "n = {n}");
            assert!(evaluation.sum > BigUint::from(n));
        }
    }

    #[test]
    fn non_perfect_candidate_is_abundant() {
        // p = 11: 2^11 - 1 = 23 * 89, so the candidate is abundant.
        let n = crate::candidate::euclid_euler(11);
        let evaluation = evaluator(9).evaluate(&n, &CancellationToken::new()).unwrap();
        assert_eq!(evaluation.outcome, Outcome::Abundant);
        assert!(evaluation.sum > n);
    }

    #[test]
    fn overflow_cancels_remaining_workers() {
        // The trial interval runs to about 1.86e9. Scanning it in full would
        // take minutes; the first worker passes n after the factors 2, 3, 4.
        let n = BigUint::from(3u64 << 60);
        let start = std::time::Instant::now();
        let evaluation = evaluator(9).evaluate(&n, &CancellationToken::new()).unwrap();

        assert_eq!(evaluation.outcome, Outcome::Abundant);
        assert!(evaluation.early_exit);
        assert!(evaluation.sum > n);
        assert!(
            start.elapsed() < std::time::Duration::from_secs(10),
            "siblings kept scanning: {:?}",
            start.elapsed()
        );
    }

    #[test]
    fn many_workers_share_one_sum() {
        let evaluator = evaluator(64);
        let cancel = CancellationToken::new();

        // 5 * 7 * 11 * 13 * 17 * 19 * 23 has 128 divisors and is deficient.
        let n = BigUint::from(37_182_145u64);
        let evaluation = evaluator.evaluate(&n, &cancel).unwrap();
        assert_eq!(evaluation.outcome, Outcome::Deficient);
        assert_eq!(evaluation.sum, BigUint::from(32_490_815u64));
        assert!(!evaluation.early_exit);

        let n = BigUint::from(33_550_336u64);
        let evaluation = evaluator.evaluate(&n, &cancel).unwrap();
        assert_eq!(evaluation.outcome, Outcome::Perfect);
        assert_eq!(evaluation.sum, n);

        let n = BigUint::from(720_720u64);
        let evaluation = evaluator.evaluate(&n, &cancel).unwrap();
        assert_eq!(evaluation.outcome, Outcome::Abundant);
        assert!(evaluation.sum > n);
    }

    #[test]
    fn trivial_inputs() {
        assert_eq!(evaluate(0).outcome, Outcome::Deficient);
        assert_eq!(evaluate(1).outcome, Outcome::Deficient);
        assert_eq!(evaluate(1).sum, BigUint::zero());
        // 2 and 3 have an empty trial interval.
        assert_eq!(evaluate(2).sum, BigUint::one());
        assert_eq!(evaluate(3).sum, BigUint::one());
    }

    #[test]
    fn result_is_independent_of_worker_count() {
        for workers in 1..=16 {
            let evaluator = evaluator(workers);
            assert!(evaluator.is_perfect(&BigUint::from(8128u32)).unwrap());
            assert!(!evaluator.is_perfect(&BigUint::from(8127u32)).unwrap());
        }
    }

    #[test]
    fn cancelled_parent_interrupts_perfect_candidate() {
        let parent = CancellationToken::new();
        parent.cancel();

        // A perfect number never crosses the target, so without cancellation
        // it would run to natural completion.
        let evaluation = evaluator(9)
            .evaluate(&BigUint::from(33_550_336u64), &parent)
            .unwrap();
        assert_eq!(evaluation.outcome, Outcome::Cancelled);
        assert!(!evaluation.early_exit);
        assert_eq!(evaluation.sum, BigUint::one());
    }

    #[test]
    fn evaluation_does_not_cancel_parent() {
        let parent = CancellationToken::new();
        evaluator(4)
            .evaluate(&BigUint::from(945u32), &parent)
            .unwrap();
        assert!(!parent.is_cancelled());
    }
}
