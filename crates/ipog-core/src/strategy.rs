//! Horizontal extension strategies.
//!
//! A [`Strategy`] is picked once per run from the configured base algorithm.
//! Every variant fills the new column of the existing rows greedily and then
//! hands the rest to the plain vertical extension.

use std::collections::BTreeSet;

use crate::combinatorics::next_combination;
use crate::config::BaseAlgorithm;
use crate::coverage::CoverageMap;
use crate::table::{Layout, Table};
use crate::vertical::{self, Partitions};

/// Closed set of extension strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// IPOG: rows in array order, each gets its best value.
    Baseline,
    /// IPOG-F: the globally best (row, value) pair is assigned first.
    /// `shortcut` replaces the exact recount after each assignment with the
    /// `C(|shared columns|, t-1)` upper bound (IPOG-F2).
    Refined { shortcut: bool },
}

impl From<BaseAlgorithm> for Strategy {
    fn from(algorithm: BaseAlgorithm) -> Self {
        match algorithm {
            BaseAlgorithm::Ipog => Strategy::Baseline,
            BaseAlgorithm::IpogF => Strategy::Refined { shortcut: false },
            BaseAlgorithm::IpogF2 => Strategy::Refined { shortcut: true },
        }
    }
}

impl Strategy {
    /// Assign values of the parameter at processing index `column` to the
    /// existing rows. Returns `false` once `map` reports nothing uncovered.
    pub fn extend_horizontal(
        &self,
        layout: &Layout,
        table: &mut Table,
        map: &mut CoverageMap<'_>,
        column: usize,
    ) -> bool {
        match *self {
            Strategy::Baseline => extend_in_row_order(layout, table, map, column),
            Strategy::Refined { shortcut } => extend_best_first(layout, table, map, column, shortcut),
        }
    }

    /// Cover the remaining tuples. Returns the number of appended rows.
    pub fn extend_vertical(
        &self,
        layout: &Layout,
        table: &mut Table,
        map: &mut CoverageMap<'_>,
        partitions: &mut Partitions,
    ) -> usize {
        vertical::extend_vertical(layout, table, map, partitions)
    }
}

fn extend_in_row_order(layout: &Layout, table: &mut Table, map: &mut CoverageMap<'_>, column: usize) -> bool {
    for row in 0..table.len() {
        let gains = map.compute_gains_of_fixed_parameter(table.row(row));
        if gains.best_gain == 0 {
            continue;
        }
        table.set(row, layout.order[column], Some(gains.best_value));
        map.mark_row_as_covered(table.row(row));
        if !map.may_have_uncovered_combinations() {
            return false;
        }
    }
    true
}

fn extend_best_first(
    layout: &Layout,
    table: &mut Table,
    map: &mut CoverageMap<'_>,
    column: usize,
    shortcut: bool,
) -> bool {
    let t = layout.strength;
    let binom = &layout.binom;
    let size = layout.sizes[column];
    let ceiling = binom.choose(column, t - 1);

    let mut unassigned: BTreeSet<usize> = (0..table.len()).collect();
    // already_covered[row][value]: tuples of (row, value) some assigned row covers
    let mut already_covered = vec![vec![0usize; size]; table.len()];

    while !unassigned.is_empty() {
        let mut best: Option<(usize, usize, usize)> = None;
        'rows: for &row in &unassigned {
            let placed = column - table.open_cells_before(layout, row, column);
            let reachable = binom.choose(placed, t - 1);
            for value in 0..size {
                let gain = reachable.saturating_sub(already_covered[row][value]);
                if best.map_or(true, |(_, _, g)| gain > g) {
                    best = Some((row, value, gain));
                    if gain == ceiling {
                        break 'rows;
                    }
                }
            }
        }
        let Some((best_row, best_value, gain)) = best else {
            break;
        };
        if gain == 0 {
            break;
        }

        table.set(best_row, layout.order[column], Some(best_value));
        unassigned.remove(&best_row);

        for &row in &unassigned {
            let shared: Vec<usize> = (0..column)
                .filter(|&k| {
                    let cell = layout.cell(table.row(row), k);
                    cell.is_some() && cell == layout.cell(table.row(best_row), k)
                })
                .collect();
            if shared.len() < t - 1 {
                continue;
            }
            if shortcut {
                already_covered[row][best_value] += binom.choose(shared.len(), t - 1);
                continue;
            }
            // count the shared tuples the best row is about to cover
            let mut picks: Vec<usize> = (0..t - 1).collect();
            let mut parameters = vec![0; t - 1];
            let mut values = vec![0; t - 1];
            loop {
                for (slot, &pick) in picks.iter().enumerate() {
                    parameters[slot] = shared[pick];
                    values[slot] = layout.cell(table.row(row), shared[pick]).unwrap_or_default();
                }
                if !map.covers(&parameters, &values, best_value) {
                    already_covered[row][best_value] += 1;
                }
                if !next_combination(&mut picks, shared.len()) {
                    break;
                }
            }
        }

        map.mark_row_as_covered(table.row(best_row));
        if !map.may_have_uncovered_combinations() {
            return false;
        }
    }
    true
}
