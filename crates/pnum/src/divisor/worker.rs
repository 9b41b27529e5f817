//! Trial division over one factor range.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::Zero;
use tokio_util::sync::CancellationToken;

use super::accumulator::{CompletionGuard, SharedDivisorSum};
use super::partition::FactorRange;

/// Why a sum worker stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SumExit {
    /// Every factor in the range was examined.
    Exhausted,
    /// The shared sum passed the target after this worker's last addition.
    Exceeded,
    /// Cancellation was observed before the range was exhausted.
    Cancelled,
}

pub struct SumWorker<'a> {
    index: usize,
    n: &'a BigUint,
    range: FactorRange,
    shared: &'a SharedDivisorSum,
    cancel: CancellationToken,
}

impl<'a> SumWorker<'a> {
    pub fn new(
        index: usize,
        n: &'a BigUint,
        range: FactorRange,
        shared: &'a SharedDivisorSum,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            index,
            n,
            range,
            shared,
            cancel,
        }
    }

    /// Divide `n` by every factor in the range, adding each divisor pair to
    /// the shared sum. Counts itself as finished on return.
    ///
    /// Cancellation is polled once per factor, outside the accumulator lock.
    pub fn run(self) -> SumExit {
        let _done = CompletionGuard(self.shared);
        let FactorRange { start, end } = self.range;

        let mut factor = start;
        let mut examined = 0u64;
        let exit = loop {
            if factor >= end {
                break SumExit::Exhausted;
            }
            if self.cancel.is_cancelled() {
                break SumExit::Cancelled;
            }

            let (cofactor, remainder) = self.n.div_rem(&factor);
            if remainder.is_zero() && self.shared.add_pair(&factor, &cofactor) {
                break SumExit::Exceeded;
            }

            factor += 1u32;
            examined += 1;
        };

        tracing::trace!(worker = self.index, examined, ?exit, "Sum worker finished");
        exit
    }
}
