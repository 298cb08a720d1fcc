//! Vertical extension: cover what horizontal extension left open by filling
//! don't-care cells of existing rows or by appending rows.

use std::collections::BTreeSet;

use crate::coverage::{CoverageMap, Cursor, UncoveredTuple};
use crate::table::{Layout, Table};
use crate::{Cell, Row};

/// Rows that can still absorb a tuple, keyed by their cell in the new column.
///
/// A row is a member while its new-column cell is a don't-care, or while it
/// has a don't-care in some earlier column. Membership is kept in step with
/// every cell the vertical step writes; it is never rebuilt by scanning.
#[derive(Debug, Clone)]
pub struct Partitions {
    column: usize,
    by_value: Vec<BTreeSet<usize>>,
    dont_care: BTreeSet<usize>,
}

impl Partitions {
    /// Partition all rows of `table` for the new parameter at processing
    /// index `column`.
    pub fn new(layout: &Layout, table: &Table, column: usize) -> Self {
        let mut partitions = Self {
            column,
            by_value: vec![BTreeSet::new(); layout.sizes[column]],
            dont_care: BTreeSet::new(),
        };
        for row in 0..table.len() {
            partitions.register(layout, table, row);
        }
        partitions
    }

    #[inline]
    pub fn column(&self) -> usize {
        self.column
    }

    /// Rows holding `value` in the new column.
    pub fn with_value(&self, value: usize) -> &BTreeSet<usize> {
        &self.by_value[value]
    }

    /// Rows whose new-column cell is a don't-care.
    pub fn dont_care(&self) -> &BTreeSet<usize> {
        &self.dont_care
    }

    pub fn contains(&self, row: usize) -> bool {
        self.dont_care.contains(&row) || self.by_value.iter().any(|set| set.contains(&row))
    }

    /// Total number of member rows.
    pub fn len(&self) -> usize {
        self.dont_care.len() + self.by_value.iter().map(BTreeSet::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// File `row` under its current new-column cell, or leave it out when it
    /// has nothing left to fill.
    fn register(&mut self, layout: &Layout, table: &Table, row: usize) {
        match layout.cell(table.row(row), self.column) {
            None => {
                self.dont_care.insert(row);
            }
            Some(value) => {
                if table.open_cells_before(layout, row, self.column) > 0 {
                    self.by_value[value].insert(row);
                }
            }
        }
    }

    fn unregister(&mut self, row: usize, cell: Cell) {
        match cell {
            None => self.dont_care.remove(&row),
            Some(value) => self.by_value[value].remove(&row),
        };
    }
}

/// How a tuple ended up covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Reused(usize),
    Appended(usize),
}

/// Whether `row` agrees with the first `len` cells of `tuple`, treating
/// don't-cares as wildcards.
fn accepts(layout: &Layout, row: &[Cell], tuple: &UncoveredTuple, len: usize) -> bool {
    tuple.parameters[..len]
        .iter()
        .zip(&tuple.values)
        .all(|(&k, &value)| layout.cell(row, k).map_or(true, |cell| cell == value))
}

/// Cover one uncovered tuple: reuse a row with the same new-column value,
/// else a row whose new-column cell is a don't-care, else append a row that
/// holds only the tuple.
pub fn cover_tuple(
    layout: &Layout,
    table: &mut Table,
    map: &mut CoverageMap<'_>,
    partitions: &mut Partitions,
    tuple: &UncoveredTuple,
) -> Placement {
    let t = layout.strength;
    let column = partitions.column;
    let reusable = partitions
        .with_value(tuple.fixed_value())
        .iter()
        .copied()
        .find(|&row| accepts(layout, table.row(row), tuple, t - 1))
        .or_else(|| {
            partitions
                .dont_care()
                .iter()
                .copied()
                .find(|&row| accepts(layout, table.row(row), tuple, t))
        });

    match reusable {
        Some(row) => {
            partitions.unregister(row, layout.cell(table.row(row), column));
            for (&k, &value) in tuple.parameters.iter().zip(&tuple.values) {
                table.set(row, layout.order[k], Some(value));
            }
            partitions.register(layout, table, row);
            map.mark_row_as_covered(table.row(row));
            Placement::Reused(row)
        }
        None => {
            let mut cells: Row = vec![None; layout.parameter_count()];
            for (&k, &value) in tuple.parameters.iter().zip(&tuple.values) {
                cells[layout.order[k]] = Some(value);
            }
            let row = table.push(cells);
            partitions.register(layout, table, row);
            map.mark_row_as_covered(table.row(row));
            Placement::Appended(row)
        }
    }
}

/// Walk the uncovered tuples once in cursor order and cover each of them.
/// Returns the number of appended rows.
pub fn extend_vertical(
    layout: &Layout,
    table: &mut Table,
    map: &mut CoverageMap<'_>,
    partitions: &mut Partitions,
) -> usize {
    let mut appended = 0;
    let mut cursor = Cursor::default();
    while let Some(tuple) = map.uncovered_combination_from(cursor) {
        if let Placement::Appended(_) = cover_tuple(layout, table, map, partitions, &tuple) {
            appended += 1;
        }
        cursor = tuple.cursor.successor();
    }
    appended
}
