//! Prime exponents and the Euclid-Euler candidates built from them.

use num_bigint::BigUint;

use crate::protocol::ExponentRange;

/// Deterministic primality test for exponents (6k ± 1 trial division).
pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n < 4 {
        return true;
    }
    if n % 2 == 0 || n % 3 == 0 {
        return false;
    }
    let mut i = 5u64;
    while i.checked_mul(i).is_some_and(|sq| sq <= n) {
        if n % i == 0 || n % (i + 2) == 0 {
            return false;
        }
        i += 6;
    }
    true
}

/// Smallest prime `>= n`, or `None` if it does not fit in a `u64`.
pub fn next_prime(n: u64) -> Option<u64> {
    if n <= 2 {
        return Some(2);
    }
    let mut candidate = if n % 2 == 0 { n.checked_add(1)? } else { n };
    while !is_prime(candidate) {
        candidate = candidate.checked_add(2)?;
    }
    Some(candidate)
}

/// Iterator over the primes of an exponent range, in increasing order.
#[derive(Debug, Clone)]
pub struct Primes {
    next: Option<u64>,
    end: u64,
}

impl Primes {
    pub fn in_range(range: ExponentRange) -> Self {
        Self {
            next: next_prime(range.start),
            end: range.end,
        }
    }
}

impl Iterator for Primes {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        let p = self.next.filter(|&p| p < self.end)?;
        self.next = p.checked_add(1).and_then(next_prime);
        Some(p)
    }
}

/// Build `(2^p - 1) * 2^(p - 1)`: the integer with `p` one-bits starting at
/// bit `p - 1`.
pub fn euclid_euler(p: u64) -> BigUint {
    let mut n = BigUint::default();
    if p == 0 {
        return n;
    }
    for bit in (p - 1)..(2 * p - 1) {
        n.set_bit(bit, true);
    }
    n
}
