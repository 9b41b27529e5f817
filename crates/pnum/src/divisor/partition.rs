//! Splitting the trial-division interval across sum workers.

use std::num::NonZeroUsize;

use num_bigint::BigUint;
use num_traits::{One, Zero};

/// Contiguous half-open interval of trial factors `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactorRange {
    pub start: BigUint,
    pub end: BigUint,
}

impl FactorRange {
    pub fn new(start: BigUint, end: BigUint) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> BigUint {
        if self.end > self.start {
            &self.end - &self.start
        } else {
            BigUint::zero()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Upper bound of the trial-division interval: `ceil(sqrt(n))`, plus whether
/// `n` is a perfect square (in which case the bound *is* the root).
pub fn trial_bound(n: &BigUint) -> (BigUint, bool) {
    let root = n.sqrt();
    if &root * &root == *n {
        (root, true)
    } else {
        (root + 1u32, false)
    }
}

/// Partition `[start, end)` into `parts` contiguous ranges of equal width.
///
/// The remainder of the division is folded into the first range, so the
/// ranges cover the interval exactly once. An empty or inverted interval
/// yields `parts` empty ranges anchored at `start`.
pub fn partition(start: &BigUint, end: &BigUint, parts: NonZeroUsize) -> Vec<FactorRange> {
    let span = FactorRange::new(start.clone(), end.clone()).len();
    let count = BigUint::from(parts.get());
    let width = &span / &count;
    let remainder = &span % &count;

    let mut ranges = Vec::with_capacity(parts.get());
    let mut cursor = start.clone();
    for i in 0..parts.get() {
        let mut next = &cursor + &width;
        if i == 0 {
            next += &remainder;
        }
        ranges.push(FactorRange::new(cursor, next.clone()));
        cursor = next;
    }
    ranges
}

/// Trial factors for `n`: `[2, ceil(sqrt(n)))` split into `parts` ranges.
pub fn factor_ranges(n: &BigUint, parts: NonZeroUsize) -> Vec<FactorRange> {
    let (bound, _) = trial_bound(n);
    let two = BigUint::one() + 1u32;
    partition(&two, &bound, parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn big(n: u64) -> BigUint {
        BigUint::from(n)
    }

    fn assert_exact_cover(ranges: &[FactorRange], start: &BigUint, end: &BigUint) {
        assert_eq!(&ranges[0].start, start);
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].end, pair[1].start, "gap or overlap in {ranges:?}");
            assert!(pair[0].start <= pair[0].end);
        }
        let last = ranges.last().unwrap();
        assert_eq!(&last.end, end);

        let total = ranges
            .iter()
            .fold(BigUint::zero(), |acc, range| acc + range.len());
        assert_eq!(total, end - start);
    }

    #[test]
    fn trial_bound_rounds_up() {
        assert_eq!(trial_bound(&big(6)), (big(3), false));
        assert_eq!(trial_bound(&big(28)), (big(6), false));
        assert_eq!(trial_bound(&big(16)), (big(4), true));
        assert_eq!(trial_bound(&big(17)), (big(5), false));
        assert_eq!(trial_bound(&big(1)), (big(1), true));
    }

    #[test]
    fn remainder_goes_to_first_range() {
        let ranges = partition(&big(2), &big(25), parts(4));
        let widths: Vec<BigUint> = ranges.iter().map(FactorRange::len).collect();
        assert_eq!(widths, vec![big(8), big(5), big(5), big(5)]);
        assert_exact_cover(&ranges, &big(2), &big(25));
    }

    #[test]
    fn narrow_interval_leaves_empty_tail() {
        // ceil(sqrt(6)) = 3: the single factor 2 lands in the first range.
        let ranges = factor_ranges(&big(6), parts(9));
        assert_eq!(ranges.len(), 9);
        assert_eq!(ranges[0], FactorRange::new(big(2), big(3)));
        assert!(ranges[1..].iter().all(FactorRange::is_empty));
    }

    #[test]
    fn inverted_interval_is_empty() {
        let ranges = partition(&big(2), &big(1), parts(3));
        assert!(ranges.iter().all(FactorRange::is_empty));
        assert!(ranges.iter().all(|r| r.start == big(2)));
    }

    #[test]
    fn exact_cover_for_many_sizes() {
        for n in 4..2_000u64 {
            for k in 1..=12 {
                let ranges = factor_ranges(&big(n), parts(k));
                assert_eq!(ranges.len(), k);
                let (bound, _) = trial_bound(&big(n));
                assert_exact_cover(&ranges, &big(2), &bound);
            }
        }
    }

    #[test]
    fn cover_for_large_candidate() {
        let n = crate::candidate::euclid_euler(61);
        let ranges = factor_ranges(&n, parts(9));
        let (bound, square) = trial_bound(&n);
        assert!(!square);
        assert_exact_cover(&ranges, &big(2), &bound);
    }
}
