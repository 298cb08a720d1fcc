//! Coverage map for the column currently being added.
//!
//! For every (t-1)-subset of the already placed parameters there is one
//! bucket. A bucket covers the subset plus the new (fixed) parameter and holds
//! one bit per value combination, addressed with mixed-radix multipliers.
//! Buckets live in a flat vector indexed by the subset's lexicographic rank,
//! so no hashing is involved.
//!
//! Parameter indices here are processing indices; `order` translates them into
//! row columns. The fixed parameter is always the last processing index of the
//! map (`sizes.len() - 1`).

use crate::bitset::BitSet;
use crate::combinatorics::{lex_rank, next_combination, BinomialCoefficient};
use crate::{Cell, IpogError, Result, Row};

/// Position in the map's canonical (bucket rank, tuple rank) order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cursor {
    pub bucket: usize,
    pub tuple: usize,
}

impl Cursor {
    /// The position right after this one in the same bucket.
    #[inline]
    pub fn successor(self) -> Self {
        Self {
            bucket: self.bucket,
            tuple: self.tuple + 1,
        }
    }
}

/// An uncovered t-way interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UncoveredTuple {
    /// Processing indices, increasing, fixed parameter last.
    pub parameters: Vec<usize>,
    /// Value for each entry of `parameters`.
    pub values: Vec<usize>,
    pub cursor: Cursor,
}

impl UncoveredTuple {
    /// Value the tuple requires in the new column.
    #[inline]
    pub fn fixed_value(&self) -> usize {
        self.values[self.values.len() - 1]
    }
}

/// Result of [`CoverageMap::compute_gains_of_fixed_parameter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gains {
    /// `gains[v]` = tuples newly covered by placing `v` in the new column.
    pub gains: Vec<usize>,
    /// Lowest value with the maximal gain.
    pub best_value: usize,
    pub best_gain: usize,
}

/// Coverage state of one parameter combination (bucket).
#[derive(Debug, Clone)]
struct TupleCoverage {
    /// t processing indices, fixed parameter last.
    columns: Vec<usize>,
    sizes: Vec<usize>,
    multipliers: Vec<usize>,
    covered: usize,
    bits: BitSet,
    occurrences: Option<Vec<u32>>,
}

impl TupleCoverage {
    /// Heap and inline bytes a bucket of `len` tuples over `arity` columns
    /// takes, or `None` on overflow.
    fn footprint(len: usize, arity: usize, count_occurrences: bool) -> Option<usize> {
        let word = std::mem::size_of::<u64>();
        let bits = len.div_ceil(8 * word).checked_mul(word)?;
        let counts = if count_occurrences {
            len.checked_mul(std::mem::size_of::<u32>())?
        } else {
            0
        };
        // columns, sizes and multipliers
        let shape = arity.checked_mul(3 * std::mem::size_of::<usize>())?;
        bits.checked_add(counts)?
            .checked_add(shape)?
            .checked_add(std::mem::size_of::<Self>())
    }

    fn new(columns: Vec<usize>, sizes: Vec<usize>, len: usize, count_occurrences: bool) -> Self {
        let mut multipliers = Vec::with_capacity(sizes.len());
        let mut multiplier = 1;
        for &size in &sizes {
            multipliers.push(multiplier);
            multiplier *= size;
        }
        Self {
            columns,
            sizes,
            multipliers,
            covered: 0,
            bits: BitSet::new(len),
            occurrences: count_occurrences.then(|| vec![0; len]),
        }
    }

    #[inline]
    fn has_uncovered(&self) -> bool {
        self.covered < self.bits.len()
    }

    /// Tuple index of the values `lookup` yields for this bucket's columns,
    /// or `None` if any of them is a don't-care.
    #[inline]
    fn index_with(&self, lookup: impl Fn(usize) -> Cell) -> Option<usize> {
        let mut index = 0;
        for (pos, &column) in self.columns.iter().enumerate() {
            let value = lookup(column)?;
            debug_assert!(value < self.sizes[pos]);
            index += value * self.multipliers[pos];
        }
        Some(index)
    }

    fn decode(&self, mut index: usize) -> Vec<usize> {
        let mut values = vec![0; self.columns.len()];
        for pos in (0..self.columns.len()).rev() {
            values[pos] = index / self.multipliers[pos];
            index %= self.multipliers[pos];
        }
        values
    }
}

/// Coverage bookkeeping for one new column.
pub struct CoverageMap<'a> {
    buckets: Vec<TupleCoverage>,
    fixed: usize,
    strength: usize,
    sizes: Vec<usize>,
    binom: &'a BinomialCoefficient,
    order: &'a [usize],
    count_occurrences: bool,
    covered: usize,
}

impl<'a> CoverageMap<'a> {
    /// Build an empty map for the parameters with processing-order alphabet
    /// `sizes`; the last entry is the new parameter.
    ///
    /// The memory the buckets need (bits, occurrence counters when
    /// `count_occurrences` is set, per-bucket bookkeeping) is estimated and
    /// checked against `max_bytes` before anything is allocated.
    pub fn new(
        sizes: &[usize],
        strength: usize,
        binom: &'a BinomialCoefficient,
        order: &'a [usize],
        count_occurrences: bool,
        max_bytes: usize,
    ) -> Result<Self> {
        if strength == 0 {
            return Err(IpogError::StrengthTooSmall);
        }
        if strength >= sizes.len() {
            return Err(IpogError::StrengthTooBig {
                strength,
                parameters: sizes.len().saturating_sub(1),
            });
        }
        let fixed = sizes.len() - 1;
        let too_large = IpogError::CoverageTooLarge {
            column: fixed,
            limit: max_bytes,
        };

        let mut layouts = Vec::with_capacity(binom.choose(fixed, strength - 1));
        let mut bytes: usize = 0;
        let mut subset: Vec<usize> = (0..strength - 1).collect();
        loop {
            let mut columns = subset.clone();
            columns.push(fixed);
            let bucket_sizes: Vec<usize> = columns.iter().map(|&c| sizes[c]).collect();
            let len = bucket_sizes
                .iter()
                .try_fold(1usize, |acc, &s| acc.checked_mul(s))
                .ok_or_else(|| too_large.clone())?;
            bytes = TupleCoverage::footprint(len, columns.len(), count_occurrences)
                .and_then(|b| bytes.checked_add(b))
                .filter(|&b| b <= max_bytes)
                .ok_or_else(|| too_large.clone())?;
            layouts.push((columns, bucket_sizes, len));
            if !next_combination(&mut subset, fixed) {
                break;
            }
        }

        let buckets = layouts
            .into_iter()
            .map(|(columns, bucket_sizes, len)| {
                TupleCoverage::new(columns, bucket_sizes, len, count_occurrences)
            })
            .collect();

        Ok(Self {
            buckets,
            fixed,
            strength,
            sizes: sizes.to_vec(),
            binom,
            order,
            count_occurrences,
            covered: 0,
        })
    }

    /// Processing index of the new parameter.
    #[inline]
    pub fn fixed(&self) -> usize {
        self.fixed
    }

    #[inline]
    pub fn strength(&self) -> usize {
        self.strength
    }

    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    pub fn counts_occurrences(&self) -> bool {
        self.count_occurrences
    }

    /// Number of covered tuples, maintained incrementally.
    #[inline]
    pub fn total_covered_value_combinations_count(&self) -> usize {
        self.covered
    }

    /// Number of tuples this map tracks in total.
    pub fn total_value_combinations_count(&self) -> usize {
        self.buckets.iter().map(|b| b.bits.len()).sum()
    }

    /// Covered tuples recounted from the bitsets, ignoring the running count.
    pub fn covered_count_by_scan(&self) -> usize {
        self.buckets.iter().map(|b| b.bits.count_ones()).sum()
    }

    /// `false` only when every bucket is fully covered. O(buckets).
    pub fn may_have_uncovered_combinations(&self) -> bool {
        self.buckets.iter().any(TupleCoverage::has_uncovered)
    }

    // ==================== Checked tuple access ====================

    /// Validate a (parameters, values, fixed value) triple and resolve it to
    /// its (bucket, tuple index).
    fn locate(&self, parameters: &[usize], values: &[usize], fixed_value: usize) -> Result<(usize, usize)> {
        let expected = self.strength - 1;
        for len in [parameters.len(), values.len()] {
            if len != expected {
                return Err(IpogError::WrongLength { expected, actual: len });
            }
        }
        let mut next_free = 0;
        for &parameter in parameters {
            if parameter >= self.fixed || parameter < next_free {
                return Err(IpogError::InvalidSubsetElement {
                    element: parameter,
                    k: expected,
                    n: self.fixed,
                });
            }
            next_free = parameter + 1;
        }
        for (&parameter, &value) in parameters.iter().zip(values) {
            let size = self.sizes[parameter];
            if value >= size {
                return Err(IpogError::ValueOutOfRange { value, size });
            }
        }
        let size = self.sizes[self.fixed];
        if fixed_value >= size {
            return Err(IpogError::ValueOutOfRange {
                value: fixed_value,
                size,
            });
        }

        let bucket = lex_rank(parameters, self.fixed, self.binom);
        let coverage = &self.buckets[bucket];
        let index = values
            .iter()
            .chain(std::iter::once(&fixed_value))
            .zip(&coverage.multipliers)
            .map(|(v, m)| v * m)
            .sum();
        Ok((bucket, index))
    }

    pub fn is_covered(&self, parameters: &[usize], values: &[usize], fixed_value: usize) -> Result<bool> {
        let (bucket, index) = self.locate(parameters, values, fixed_value)?;
        Ok(self.buckets[bucket].bits.contains(index))
    }

    /// How many marks the tuple currently holds. Requires occurrence counting.
    pub fn occurrence_count(&self, parameters: &[usize], values: &[usize], fixed_value: usize) -> Result<u32> {
        if !self.count_occurrences {
            return Err(IpogError::OccurrencesNotCounted);
        }
        let (bucket, index) = self.locate(parameters, values, fixed_value)?;
        Ok(self.buckets[bucket]
            .occurrences
            .as_ref()
            .map_or(0, |occ| occ[index]))
    }

    /// Set the tuple's bit and, when counting, bump its occurrence count.
    pub fn mark_as_covered(&mut self, parameters: &[usize], values: &[usize], fixed_value: usize) -> Result<()> {
        let (bucket, index) = self.locate(parameters, values, fixed_value)?;
        self.mark_index(bucket, index);
        Ok(())
    }

    /// Drop one mark from the tuple; the bit clears once no mark is left (or
    /// immediately when occurrences are not counted).
    pub fn mark_as_uncovered(&mut self, parameters: &[usize], values: &[usize], fixed_value: usize) -> Result<()> {
        let (bucket, index) = self.locate(parameters, values, fixed_value)?;
        self.unmark_index(bucket, index);
        Ok(())
    }

    fn mark_index(&mut self, bucket: usize, index: usize) {
        let coverage = &mut self.buckets[bucket];
        if let Some(occurrences) = coverage.occurrences.as_mut() {
            occurrences[index] += 1;
        }
        if coverage.bits.insert(index) {
            coverage.covered += 1;
            self.covered += 1;
        }
    }

    fn unmark_index(&mut self, bucket: usize, index: usize) {
        let coverage = &mut self.buckets[bucket];
        if !coverage.bits.contains(index) {
            return;
        }
        if let Some(occurrences) = coverage.occurrences.as_mut() {
            occurrences[index] -= 1;
            if occurrences[index] > 0 {
                return;
            }
        }
        coverage.bits.remove(index);
        coverage.covered -= 1;
        self.covered -= 1;
    }

    // ==================== Row-level updates ====================

    /// Mark every tuple the row realizes. Buckets touching a don't-care cell
    /// of the row are skipped.
    pub fn mark_row_as_covered(&mut self, row: &[Cell]) {
        let order = self.order;
        if row[order[self.fixed]].is_none() {
            return;
        }
        for bucket in 0..self.buckets.len() {
            if let Some(index) = self.buckets[bucket].index_with(|c| row[order[c]]) {
                self.mark_index(bucket, index);
            }
        }
    }

    /// Account for a single cell change: `rows[row_index]` already holds the
    /// new value at processing index `column`, `previous` is what it held
    /// before. Only buckets containing `column` are touched.
    pub fn update(&mut self, rows: &[Row], row_index: usize, column: usize, previous: Cell) {
        let order = self.order;
        let row = &rows[row_index];
        if row[order[column]] == previous {
            return;
        }
        for bucket in self.buckets_containing(column) {
            let coverage = &self.buckets[bucket];
            let before = coverage.index_with(|c| if c == column { previous } else { row[order[c]] });
            let after = coverage.index_with(|c| row[order[c]]);
            if let Some(index) = before {
                self.unmark_index(bucket, index);
            }
            if let Some(index) = after {
                self.mark_index(bucket, index);
            }
        }
    }

    /// Ranks of all buckets whose column set includes processing index `column`.
    fn buckets_containing(&self, column: usize) -> Vec<usize> {
        if column == self.fixed {
            return (0..self.buckets.len()).collect();
        }
        if column > self.fixed || self.strength < 2 {
            return Vec::new();
        }
        let others: Vec<usize> = (0..self.fixed).filter(|&c| c != column).collect();
        let mut picks: Vec<usize> = (0..self.strength - 2).collect();
        let mut ranks = Vec::with_capacity(self.binom.choose(others.len(), picks.len()));
        let mut subset = Vec::with_capacity(self.strength - 1);
        loop {
            subset.clear();
            subset.extend(picks.iter().map(|&p| others[p]));
            let at = subset.partition_point(|&c| c < column);
            subset.insert(at, column);
            ranks.push(lex_rank(&subset, self.fixed, self.binom));
            if !next_combination(&mut picks, others.len()) {
                break;
            }
        }
        ranks
    }

    // ==================== Queries for the extension strategies ====================

    /// Per-value count of tuples that placing each value of the new parameter
    /// into `row` would newly cover. Fully covered buckets are skipped.
    pub fn compute_gains_of_fixed_parameter(&self, row: &[Cell]) -> Gains {
        let order = self.order;
        let fixed = self.fixed;
        let step_pos = self.strength - 1;
        let mut gains = vec![0usize; self.sizes[fixed]];
        for coverage in self.buckets.iter().filter(|b| b.has_uncovered()) {
            let Some(base) = coverage.index_with(|c| if c == fixed { Some(0) } else { row[order[c]] }) else {
                continue;
            };
            let step = coverage.multipliers[step_pos];
            for (value, gain) in gains.iter_mut().enumerate() {
                if !coverage.bits.contains(base + value * step) {
                    *gain += 1;
                }
            }
        }
        let (best_value, best_gain) = gains
            .iter()
            .copied()
            .enumerate()
            .fold((0, 0), |best, (value, gain)| if gain > best.1 { (value, gain) } else { best });
        Gains {
            gains,
            best_value,
            best_gain,
        }
    }

    /// First uncovered tuple in canonical order.
    pub fn uncovered_combination(&self) -> Option<UncoveredTuple> {
        self.uncovered_combination_from(Cursor::default())
    }

    /// First uncovered tuple at or after `from`, with its cursor so the caller
    /// can resume right after it.
    pub fn uncovered_combination_from(&self, from: Cursor) -> Option<UncoveredTuple> {
        let mut start = from.tuple;
        for (rank, coverage) in self.buckets.iter().enumerate().skip(from.bucket) {
            if coverage.has_uncovered() {
                if let Some(index) = coverage.bits.next_clear(start) {
                    return Some(UncoveredTuple {
                        parameters: coverage.columns.clone(),
                        values: coverage.decode(index),
                        cursor: Cursor {
                            bucket: rank,
                            tuple: index,
                        },
                    });
                }
            }
            start = 0;
        }
        None
    }

    /// Unchecked form of [`CoverageMap::is_covered`] for callers that build
    /// their combinations from placed columns.
    pub(crate) fn covers(&self, parameters: &[usize], values: &[usize], fixed_value: usize) -> bool {
        debug_assert_eq!(parameters.len(), self.strength - 1);
        let coverage = &self.buckets[lex_rank(parameters, self.fixed, self.binom)];
        let index: usize = values
            .iter()
            .chain(std::iter::once(&fixed_value))
            .zip(&coverage.multipliers)
            .map(|(v, m)| v * m)
            .sum();
        coverage.bits.contains(index)
    }

    /// Whether the tuple at `cursor` is still uncovered.
    pub(crate) fn is_uncovered_at(&self, cursor: Cursor) -> bool {
        !self.buckets[cursor.bucket].bits.contains(cursor.tuple)
    }
}

impl std::fmt::Display for CoverageMap<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for coverage in &self.buckets {
            writeln!(f, "{:?}", coverage.columns)?;
            for index in 0..coverage.bits.len() {
                write!(f, "{}", u8::from(coverage.bits.contains(index)))?;
            }
            writeln!(f)?;
            if let Some(occurrences) = &coverage.occurrences {
                writeln!(f, "{occurrences:?}")?;
            }
        }
        Ok(())
    }
}
