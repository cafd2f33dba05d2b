#![cfg_attr(feature = "guest", no_std)]

/// Largest index whose Fibonacci number fits in an `i64`.
pub const MAX_EXACT_INDEX: i64 = 92;

/// Computes the n'th Fibonacci number iteratively.
///
/// Indices `n <= 1` are returned unchanged, which makes `fib(0) == 0` and
/// `fib(1) == 1`. Negative indices fall into the same branch and are not a
/// meaningful input.
///
/// Past [`MAX_EXACT_INDEX`] the additions wrap at 64 bits and the result is
/// no longer the Fibonacci number; use [`checked_fib`] to detect that.
pub fn fib(n: i64) -> i64 {
    if n <= 1 {
        return n;
    }

    let mut a: i64 = 0;
    let mut b: i64 = 1;
    for _ in 2..=n {
        // Naturally overflow at 64 bits
        let c = a.wrapping_add(b);
        a = b;
        b = c;
    }

    b
}

/// Like [`fib`], but returns `None` once a term no longer fits in an `i64`.
pub fn checked_fib(n: i64) -> Option<i64> {
    if n <= 1 {
        return Some(n);
    }

    let mut a: i64 = 0;
    let mut b: i64 = 1;
    for _ in 2..=n {
        let c = a.checked_add(b)?;
        a = b;
        b = c;
    }

    Some(b)
}

// [0, 1, 2, 3] = |0 1|
//                |2 3|
type Matrix2x2 = [u64; 4];

const IDENTITY: Matrix2x2 = [1, 0, 0, 1];

fn matmul(a: Matrix2x2, b: Matrix2x2) -> Matrix2x2 {
    [
        a[0].wrapping_mul(b[0]).wrapping_add(a[1].wrapping_mul(b[2])),
        a[0].wrapping_mul(b[1]).wrapping_add(a[1].wrapping_mul(b[3])),
        a[2].wrapping_mul(b[0]).wrapping_add(a[3].wrapping_mul(b[2])),
        a[2].wrapping_mul(b[1]).wrapping_add(a[3].wrapping_mul(b[3])),
    ]
}

fn fast_matexp(mut b: Matrix2x2, mut e: u64) -> Matrix2x2 {
    let mut acc = IDENTITY;

    while e > 0 {
        if e % 2 == 1 {
            acc = matmul(b, acc);
        }
        b = matmul(b, b);
        e /= 2;
    }
    acc
}

/// Computes the n'th Fibonacci number in O(log n) multiplications.
///
/// `|0 1|^n` is `|F(n-1) F(n)  |`, so the answer is the top-right entry.
/// `|1 1|`      `|F(n)   F(n+1)|`
///
/// Arithmetic wraps modulo 2^64.
pub fn fastfib(n: u64) -> u64 {
    fast_matexp([0, 1, 1, 1], n)[1]
}

#[cfg(test)]
mod test {
    use test_log::test;

    use super::*;

    const F92: i64 = 7_540_113_804_746_346_429;

    #[test]
    fn base_cases() {
        assert_eq!(fib(0), 0);
        assert_eq!(fib(1), 1);
        assert_eq!(fib(2), 1);
    }

    #[test]
    fn known_values() {
        assert_eq!(fib(10), 55);
        assert_eq!(fib(20), 6765);
        assert_eq!(fib(29), 514_229);
        assert_eq!(fib(50), 12_586_269_025);
        assert_eq!(fib(MAX_EXACT_INDEX), F92);
    }

    #[test]
    fn recurrence_holds() {
        for n in 2..=50 {
            assert_eq!(fib(n), fib(n - 1) + fib(n - 2), "n = {n}");
        }
    }

    #[test]
    fn repeated_calls_agree() {
        for n in [0, 7, 30, 92] {
            assert_eq!(fib(n), fib(n));
        }
    }

    #[test]
    fn non_positive_indices_are_returned_unchanged() {
        assert_eq!(fib(0), 0);
        assert_eq!(fib(-1), -1);
        assert_eq!(fib(i64::MIN), i64::MIN);
        assert_eq!(checked_fib(-5), Some(-5));
    }

    #[test]
    fn wraps_past_exact_range() {
        // F(93) = F(92) + F(91) exceeds i64::MAX.
        let expected = F92.wrapping_add(fib(91));
        assert_eq!(fib(93), expected);
        assert!(fib(93) < 0);
    }

    #[test]
    fn checked_detects_overflow() {
        assert_eq!(checked_fib(30), Some(832_040));
        assert_eq!(checked_fib(MAX_EXACT_INDEX), Some(F92));
        assert_eq!(checked_fib(MAX_EXACT_INDEX + 1), None);
        assert_eq!(checked_fib(1_000), None);
    }

    #[test]
    fn checked_matches_unchecked_in_range() {
        for n in 0..=MAX_EXACT_INDEX {
            assert_eq!(checked_fib(n), Some(fib(n)), "n = {n}");
        }
    }

    #[test]
    fn fastfib_matches_iterative() {
        for n in 0..=MAX_EXACT_INDEX {
            assert_eq!(fastfib(n as u64) as i64, fib(n), "n = {n}");
        }
    }

    #[test]
    fn fastfib_is_total() {
        // Only needs to terminate without panicking; the value is wrapped.
        let _ = fastfib(u64::MAX);
        assert_eq!(fastfib(0), 0);
        assert_eq!(fastfib(1), 1);
    }
}
