//! Dense integer encodings of (partial) permutations and orientation vectors.
//!
//! A partial permutation of `k` values drawn from `n` symbols is ranked with a
//! generalised Lehmer code: the digit at position `i` is the value minus the
//! number of smaller values already seen, and its place value is the number of
//! ways to fill the remaining positions, the falling factorial
//! `P(n - 1 - i, k - 1 - i)`. Ranks are lexicographic and cover
//! `0..P(n, k)` exactly. For `k == n` this is the ordinary Lehmer code.

use crate::FACT_UNTIL_19;

/// The number of ordered selections of `k` items out of `n`, `n! / (n - k)!`.
///
/// # Panics
///
/// If `k > n` or `n > 19`.
#[must_use]
pub const fn falling_factorial(n: u8, k: u8) -> u64 {
    assert!(k <= n && (n as usize) < FACT_UNTIL_19.len());
    FACT_UNTIL_19[n as usize] / FACT_UNTIL_19[(n - k) as usize]
}

/// Rank a partial permutation of distinct `values`, each below `n`. Runs in
/// O(k) by tracking seen values in a bitmap and popcounting the ones below
/// the current value.
///
/// # Panics
///
/// If `n > 19`. Duplicated values or values not below `n` produce
/// meaningless ranks in release builds.
#[must_use]
pub fn rank_partial_permutation(values: &[u8], n: u8) -> u64 {
    let k = values.len() as u8;
    debug_assert!(k <= n && n < 32);
    let mut seen = 0_u32;
    let mut rank = 0;
    for (i, &value) in values.iter().enumerate() {
        debug_assert!(value < n && seen & (1 << value) == 0);
        let smaller_seen = (seen & ((1 << value) - 1)).count_ones();
        let digit = u64::from(u32::from(value) - smaller_seen);
        rank += digit * falling_factorial(n - 1 - i as u8, k - 1 - i as u8);
        seen |= 1 << value;
    }
    rank
}

/// The inverse of [`rank_partial_permutation`].
#[must_use]
pub fn unrank_partial_permutation(mut rank: u64, n: u8, k: u8) -> Vec<u8> {
    let mut remaining = (0..n).collect::<Vec<u8>>();
    let mut values = Vec::with_capacity(k as usize);
    for i in 0..k {
        let place_value = falling_factorial(n - 1 - i, k - 1 - i);
        let digit = (rank / place_value) as usize;
        rank %= place_value;
        values.push(remaining.remove(digit));
    }
    values
}

/// Rank a vector of digits in the given base, the first digit being the most
/// significant.
#[must_use]
pub fn rank_orientations(digits: &[u8], base: u8) -> u64 {
    digits.iter().fold(0, |acc, &digit| {
        debug_assert!(digit < base);
        acc * u64::from(base) + u64::from(digit)
    })
}

/// The inverse of [`rank_orientations`].
#[must_use]
pub fn unrank_orientations(mut rank: u64, base: u8, len: usize) -> Vec<u8> {
    let mut digits = vec![0; len];
    for digit in digits.iter_mut().rev() {
        *digit = (rank % u64::from(base)) as u8;
        rank /= u64::from(base);
    }
    digits
}

/// Permutation parity, 1 if the number of inversions is odd.
#[must_use]
pub fn permutation_parity(perm: &[u8]) -> u8 {
    let mut inversions = 0_u32;
    for i in 0..perm.len() {
        for j in (i + 1)..perm.len() {
            if perm[j] < perm[i] {
                inversions += 1;
            }
        }
    }
    (inversions % 2) as u8
}
