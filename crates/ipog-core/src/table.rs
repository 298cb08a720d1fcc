//! Run layout and the in-progress row arena.
//!
//! The engine places parameters largest-domain first. [`Layout`] records that
//! processing order once per run; rows themselves always stay in the caller's
//! parameter order, so `order[k]` translates processing index `k` into a row
//! column.

use crate::combinatorics::BinomialCoefficient;
use crate::{Cell, IpogError, Parameter, Result, Row};

/// Immutable description of one generation run.
#[derive(Debug, Clone)]
pub struct Layout {
    pub strength: usize,
    /// `order[k]` = row column of the k-th processed parameter.
    pub order: Vec<usize>,
    /// Alphabet sizes in processing order.
    pub sizes: Vec<usize>,
    pub binom: BinomialCoefficient,
}

impl Layout {
    /// Validate the run shape and derive the processing order.
    pub fn new(parameters: &[Parameter], strength: usize) -> Result<Self> {
        if strength == 0 {
            return Err(IpogError::StrengthTooSmall);
        }
        let count = parameters.len();
        if strength > count {
            return Err(IpogError::StrengthTooBig {
                strength,
                parameters: count,
            });
        }
        if let Some(empty) = parameters.iter().find(|p| p.size() == 0) {
            return Err(IpogError::EmptyDomain(empty.name.clone()));
        }

        let binom = BinomialCoefficient::new(count - 1, strength - 1).map_err(|_| {
            IpogError::TooManyCombinations {
                strength,
                parameters: count,
            }
        })?;

        // stable: equal domain sizes keep their configured order
        let mut order: Vec<usize> = (0..count).collect();
        order.sort_by(|&a, &b| parameters[b].size().cmp(&parameters[a].size()));
        let sizes = order.iter().map(|&c| parameters[c].size()).collect();

        Ok(Self {
            strength,
            order,
            sizes,
            binom,
        })
    }

    #[inline]
    pub fn parameter_count(&self) -> usize {
        self.order.len()
    }

    /// Cell of `row` at processing index `k`.
    #[inline]
    pub fn cell(&self, row: &[Cell], k: usize) -> Cell {
        row[self.order[k]]
    }
}

/// Arena owning every row of the array under construction.
///
/// All cell writes go through [`Table::set`] so the per-row don't-care count
/// stays exact.
#[derive(Debug, Clone, Default)]
pub struct Table {
    rows: Vec<Row>,
    dont_cares: Vec<usize>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row and return its index.
    pub fn push(&mut self, row: Row) -> usize {
        self.dont_cares.push(row.iter().filter(|c| c.is_none()).count());
        self.rows.push(row);
        self.rows.len() - 1
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[inline]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[inline]
    pub fn row(&self, index: usize) -> &[Cell] {
        &self.rows[index]
    }

    /// Overwrite one cell (row column, not processing index) and return the
    /// previous content.
    pub fn set(&mut self, row: usize, column: usize, value: Cell) -> Cell {
        let previous = std::mem::replace(&mut self.rows[row][column], value);
        match (previous, value) {
            (None, Some(_)) => self.dont_cares[row] -= 1,
            (Some(_), None) => self.dont_cares[row] += 1,
            _ => {}
        }
        previous
    }

    /// Number of don't-care cells in the row, across all columns.
    #[inline]
    pub fn dont_care_count(&self, row: usize) -> usize {
        self.dont_cares[row]
    }

    /// Don't-care cells of `row` at processing indices before `column`, while
    /// `column` is the parameter being added. Every later column is still
    /// unassigned at that point.
    pub fn open_cells_before(&self, layout: &Layout, row: usize, column: usize) -> usize {
        let unplaced = layout.parameter_count() - column - 1;
        let new_cell = usize::from(layout.cell(&self.rows[row], column).is_none());
        self.dont_cares[row] - unplaced - new_cell
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(sizes: &[usize]) -> Vec<Parameter> {
        sizes
            .iter()
            .enumerate()
            .map(|(i, &s)| Parameter::new(format!("p{i}"), 0..s))
            .collect()
    }

    #[test]
    fn test_layout_order_is_stable_descending() {
        let layout = Layout::new(&params(&[2, 3, 2, 4, 3]), 2).unwrap();
        assert_eq!(layout.order, vec![3, 1, 4, 0, 2]);
        assert_eq!(layout.sizes, vec![4, 3, 3, 2, 2]);
        assert_eq!(layout.parameter_count(), 5);
    }

    #[test]
    fn test_layout_rejects_bad_strength() {
        assert_eq!(
            Layout::new(&params(&[2, 2]), 0).unwrap_err(),
            IpogError::StrengthTooSmall
        );
        assert_eq!(
            Layout::new(&params(&[2, 2]), 3).unwrap_err(),
            IpogError::StrengthTooBig { strength: 3, parameters: 2 }
        );
        assert_eq!(
            Layout::new(&params(&[2, 0]), 1).unwrap_err(),
            IpogError::EmptyDomain("p1".into())
        );
    }

    #[test]
    fn test_layout_feasibility_guard() {
        let err = Layout::new(&params(&[2; 200]), 100).unwrap_err();
        assert!(matches!(err, IpogError::TooManyCombinations { .. }));
    }

    #[test]
    fn test_table_tracks_dont_cares() {
        let mut table = Table::new();
        let r = table.push(vec![Some(0), None, None]);
        assert_eq!(table.dont_care_count(r), 2);
        assert_eq!(table.set(r, 1, Some(1)), None);
        assert_eq!(table.dont_care_count(r), 1);
        assert_eq!(table.set(r, 1, Some(0)), Some(1));
        assert_eq!(table.dont_care_count(r), 1);
        assert_eq!(table.set(r, 0, None), Some(0));
        assert_eq!(table.dont_care_count(r), 2);
        assert_eq!(table.row(r), &[None, Some(0), None]);
    }

    #[test]
    fn test_open_cells_before() {
        // processing order: column 1 (size 3) first, then 0, 2, 3
        let layout = Layout::new(&params(&[2, 3, 2, 2]), 2).unwrap();
        assert_eq!(layout.order, vec![1, 0, 2, 3]);
        let mut table = Table::new();
        let r = table.push(vec![None, Some(2), None, None]);
        // adding processing index 2 (row column 2): index 1 is still open
        assert_eq!(table.open_cells_before(&layout, r, 2), 1);
        table.set(r, 2, Some(0));
        assert_eq!(table.open_cells_before(&layout, r, 2), 1);
        table.set(r, 0, Some(1));
        assert_eq!(table.open_cells_before(&layout, r, 2), 0);
    }
}
