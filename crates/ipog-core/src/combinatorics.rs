//! Combinatorial indexing helpers.
//!
//! Binomial coefficients, lexicographic k-subset enumeration and ranking, and
//! a mixed-radix Cartesian product. Ranking is what lets the coverage map
//! address parameter combinations with a dense array index instead of hashing.

use std::iter::FusedIterator;

use crate::{IpogError, Result};

/// Precomputed table of binomial coefficients `C(n, k)` for `n <= max_n`,
/// `k <= max_k`, built with Pascal's rule.
#[derive(Debug, Clone)]
pub struct BinomialCoefficient {
    max_n: usize,
    max_k: usize,
    table: Vec<usize>,
}

impl BinomialCoefficient {
    /// Build the table. Fails if any entry does not fit in a `usize`, which is
    /// how infeasible (strength, parameter count) pairs are rejected up front.
    pub fn new(max_n: usize, max_k: usize) -> Result<Self> {
        let stride = max_k + 1;
        let mut table = vec![0usize; (max_n + 1) * stride];
        for n in 0..=max_n {
            for k in 0..=max_k.min(n) {
                table[n * stride + k] = if k == 0 || k == n {
                    1
                } else {
                    let left = table[(n - 1) * stride + k];
                    let right = table[(n - 1) * stride + k - 1];
                    left.checked_add(right)
                        .ok_or(IpogError::BinomialOverflow { n, k })?
                };
            }
        }
        Ok(Self { max_n, max_k, table })
    }

    /// `C(n, k)`. Zero whenever `k > n`.
    ///
    /// # Panics
    /// If `k <= n` and `(n, k)` lies outside the precomputed table.
    #[inline]
    pub fn choose(&self, n: usize, k: usize) -> usize {
        if k > n {
            return 0;
        }
        assert!(
            n <= self.max_n && k <= self.max_k,
            "C({n}, {k}) is outside the precomputed table ({}, {})",
            self.max_n,
            self.max_k
        );
        self.table[n * (self.max_k + 1) + k]
    }

    pub fn max_n(&self) -> usize {
        self.max_n
    }

    pub fn max_k(&self) -> usize {
        self.max_k
    }
}

/// Advance a strictly increasing k-subset of `{0..n-1}` to its lexicographic
/// successor in place.
///
/// Returns `false` once the last subset `{n-k, .., n-1}` has been passed; the
/// slice contents are unspecified afterwards. Starting from `{0, .., k-1}` and
/// looping until `false` visits every k-subset exactly once.
pub fn next_combination(subset: &mut [usize], n: usize) -> bool {
    let k = subset.len();
    for i in (0..k).rev() {
        if subset[i] + k < n + i {
            subset[i] += 1;
            for j in i + 1..k {
                subset[j] = subset[j - 1] + 1;
            }
            return true;
        }
    }
    false
}

/// 0-based lexicographic rank of `subset` among all k-subsets of `n` elements.
pub fn k_subset_lex_rank(subset: &[usize], n: usize, binom: &BinomialCoefficient) -> Result<usize> {
    let mut next_free = 0;
    for &element in subset {
        if element >= n || element < next_free {
            return Err(IpogError::InvalidSubsetElement {
                element,
                k: subset.len(),
                n,
            });
        }
        next_free = element + 1;
    }
    Ok(lex_rank(subset, n, binom))
}

/// Rank of a subset already known to be strictly increasing and below `n`.
pub(crate) fn lex_rank(subset: &[usize], n: usize, binom: &BinomialCoefficient) -> usize {
    let k = subset.len();
    let mut rank = 0;
    let mut next_free = 0;
    for (i, &element) in subset.iter().enumerate() {
        debug_assert!(element < n && element >= next_free);
        // every subset that picks a smaller element at position i comes first
        for skipped in next_free..element {
            rank += binom.choose(n - skipped - 1, k - i - 1);
        }
        next_free = element + 1;
    }
    rank
}

/// Inverse of [`k_subset_lex_rank`].
///
/// # Panics
/// If `rank >= C(n, k)`.
pub fn k_subset_lex_unrank(rank: usize, k: usize, n: usize, binom: &BinomialCoefficient) -> Vec<usize> {
    assert!(rank < binom.choose(n, k), "rank {rank} out of range for C({n}, {k})");
    let mut remaining = rank;
    let mut subset = Vec::with_capacity(k);
    let mut candidate = 0;
    for i in 0..k {
        loop {
            let block = binom.choose(n - candidate - 1, k - i - 1);
            if remaining < block {
                break;
            }
            remaining -= block;
            candidate += 1;
        }
        subset.push(candidate);
        candidate += 1;
    }
    subset
}

/// Lazy mixed-radix enumeration of every tuple `t` with `t[i] < sizes[i]`.
///
/// Odometer order: the last position increments fastest. Yields exactly
/// `∏ sizes` tuples, starting with all zeros.
#[derive(Debug, Clone)]
pub struct CartesianProduct {
    sizes: Vec<usize>,
    current: Vec<usize>,
    exhausted: bool,
}

impl CartesianProduct {
    pub fn new(sizes: &[usize]) -> Self {
        Self {
            sizes: sizes.to_vec(),
            current: vec![0; sizes.len()],
            exhausted: sizes.contains(&0),
        }
    }
}

impl Iterator for CartesianProduct {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        if self.exhausted {
            return None;
        }
        let tuple = self.current.clone();
        self.exhausted = true;
        for i in (0..self.current.len()).rev() {
            if self.current[i] + 1 < self.sizes[i] {
                self.current[i] += 1;
                self.exhausted = false;
                break;
            }
            self.current[i] = 0;
        }
        Some(tuple)
    }
}

impl FusedIterator for CartesianProduct {}
